//! String-to-primitive coercions used by the typed getters.

/// Interpret a property value as a boolean.
///
/// Accepts `true/yes/on/y/t` and `false/no/off/n/f`, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "y" | "t" => Some(true),
        "false" | "no" | "off" | "n" | "f" => Some(false),
        _ => None,
    }
}

/// Parse a 32-bit integer: decimal with optional sign, `0x` hex, or `0b` binary.
pub fn parse_i32(value: &str) -> Option<i32> {
    parse_i64(value).and_then(|v| i32::try_from(v).ok())
}

/// Parse a 64-bit integer: decimal with optional sign, `0x` hex, or `0b` binary.
pub fn parse_i64(value: &str) -> Option<i64> {
    let value = value.trim();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let (radix, body) = match (strip_radix(digits, 'x'), strip_radix(digits, 'b')) {
        (Some(hex), _) => (16, hex),
        (None, Some(bin)) => (2, bin),
        (None, None) => return value.parse::<i64>().ok(),
    };

    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i128::from_str_radix(body, radix).ok()?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

/// Digits after a `0<marker>` prefix, either case.
fn strip_radix(digits: &str, marker: char) -> Option<&str> {
    let rest = digits.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_accepts_common_spellings() {
        for truthy in ["true", "TRUE", "yes", "On", "y", "t", " true "] {
            assert_eq!(parse_bool(truthy), Some(true), "{truthy}");
        }
        for falsy in ["false", "No", "OFF", "n", "F"] {
            assert_eq!(parse_bool(falsy), Some(false), "{falsy}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn int_parses_decimal_and_hex() {
        assert_eq!(parse_i32("123"), Some(123));
        assert_eq!(parse_i32(" -7 "), Some(-7));
        assert_eq!(parse_i32("+42"), Some(42));
        assert_eq!(parse_i32("0x1F"), Some(31));
        assert_eq!(parse_i32("-0X10"), Some(-16));
    }

    #[test]
    fn int_parses_binary() {
        assert_eq!(parse_i32("0b101"), Some(5));
        assert_eq!(parse_i32("-0B11"), Some(-3));
        assert_eq!(parse_i32("0b"), None);
        assert_eq!(parse_i32("0b102"), None);
        assert_eq!(parse_i64(&format!("0b1{}", "0".repeat(62))), Some(1 << 62));
        assert_eq!(parse_i64(&format!("0b1{}", "0".repeat(63))), None);
    }

    #[test]
    fn int_rejects_garbage_and_overflow() {
        assert_eq!(parse_i32("abc"), None);
        assert_eq!(parse_i32("1.5"), None);
        assert_eq!(parse_i32(""), None);
        assert_eq!(parse_i32("0x"), None);
        assert_eq!(parse_i32("2147483648"), None);
        assert_eq!(parse_i32("-2147483648"), Some(i32::MIN));
    }

    #[test]
    fn long_covers_full_range() {
        assert_eq!(parse_i64("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_i64("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_i64("-0x8000000000000000"), Some(i64::MIN));
        assert_eq!(parse_i64("0x8000000000000000"), None);
        assert_eq!(parse_i64("9223372036854775808"), None);
    }
}
