//! CLI command definitions and output formatting.
//!
//! Uses clap derive macros for argument definitions; rendering helpers
//! return strings so they can be tested without a terminal.

pub mod args;

use colored::Colorize;
use indexmap::IndexMap;
use serde::Serialize;

use strata::config::{LayerReport, LayerStatus};
use strata::{Layer, LayeredConfig, ProcessContext, ResourcePath};

use args::ContextArgs;

/// Effective value of one key, for `dump`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpEntry {
    pub layer: Layer,
    pub values: Vec<String>,
}

impl ContextArgs {
    /// Apply flag overrides on top of a context resolved from the environment.
    pub fn apply(&self, mut context: ProcessContext) -> ProcessContext {
        if let Some(env) = &self.env {
            context = context.with_env(env.clone());
        }
        if let Some(host) = &self.host_name {
            context = context.with_host_name(host.clone());
        }
        if let Some(path) = &self.config_path {
            context = context.with_config_path(path.clone());
        }
        context
    }

    /// Resource roots from flags, or the environment default.
    pub fn resource_path(&self) -> ResourcePath {
        if self.resource_paths.is_empty() {
            ResourcePath::default()
        } else {
            ResourcePath::new(self.resource_paths.iter().cloned())
        }
    }
}

/// Collect every effective key with its winning layer.
pub fn collect_dump(config: &LayeredConfig) -> IndexMap<String, DumpEntry> {
    config
        .keys()
        .into_iter()
        .filter_map(|key| {
            config
                .lookup(&key)
                .map(|(layer, values)| (key, DumpEntry { layer, values }))
        })
        .collect()
}

/// One line per candidate: rank, layer, name, outcome.
pub fn render_report(report: &[LayerReport]) -> String {
    let mut out = String::new();
    for (rank, entry) in report.iter().enumerate() {
        let status = match &entry.status {
            LayerStatus::Loaded { origin } => format!("{} {origin}", "loaded".green()),
            LayerStatus::NotFound => "not found".yellow().to_string(),
            LayerStatus::Failed { reason } => format!("{} {reason}", "failed".red()),
        };
        out.push_str(&format!(
            "{:>2}. {:<6} {}  {status}\n",
            rank + 1,
            entry.layer.to_string().bold(),
            entry.name,
        ));
    }
    out
}

/// `key = value  [layer]` lines for a text dump.
pub fn render_dump(entries: &IndexMap<String, DumpEntry>) -> String {
    let mut out = String::new();
    for (key, entry) in entries {
        out.push_str(&format!(
            "{key} = {}  {}\n",
            entry.values.join(", "),
            format!("[{}]", entry.layer).dimmed(),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn apply_overrides_only_given_fields() {
        let base = ProcessContext::new().with_env("prod").with_host_name("web01");
        let args = ContextArgs {
            env: Some("dev".to_string()),
            ..ContextArgs::default()
        };
        let ctx = args.apply(base);
        assert_eq!(ctx.env(), Some("dev"));
        assert_eq!(ctx.host_name(), Some("web01"));
        assert_eq!(ctx.config_path(), None);
    }

    #[test]
    fn resource_path_prefers_flags() {
        let args = ContextArgs {
            resource_paths: vec![PathBuf::from("/r1"), PathBuf::from("/r2")],
            ..ContextArgs::default()
        };
        assert_eq!(
            args.resource_path().roots(),
            [PathBuf::from("/r1"), PathBuf::from("/r2")]
        );
    }

    #[test]
    fn report_lists_each_candidate() {
        plain();
        let report = vec![
            LayerReport {
                layer: Layer::Env,
                name: "dev.app.properties".to_string(),
                status: LayerStatus::NotFound,
            },
            LayerReport {
                layer: Layer::Base,
                name: "app.properties".to_string(),
                status: LayerStatus::Loaded {
                    origin: "resource app.properties (/r/app.properties)".to_string(),
                },
            },
        ];
        let text = render_report(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("env"));
        assert!(lines[0].contains("not found"));
        assert!(lines[1].starts_with(" 2. base"));
        assert!(lines[1].contains("loaded resource app.properties"));
    }

    #[test]
    fn dump_uses_winning_layer() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.properties"), "a=1\nl=x, y").unwrap();
        std::fs::write(dir.path().join("dev.app.properties"), "a=2").unwrap();
        let config = LayeredConfig::builder("app.properties")
            .context(ProcessContext::new().with_env("dev"))
            .resource_path(ResourcePath::new([dir.path()]))
            .refresh_interval(Duration::ZERO)
            .build();

        let entries = collect_dump(&config);
        assert_eq!(entries["a"].layer, Layer::Env);
        assert_eq!(entries["a"].values, vec!["2"]);
        assert_eq!(entries["l"].layer, Layer::Base);

        let text = render_dump(&entries);
        assert!(text.contains("a = 2  [env]"));
        assert!(text.contains("l = x, y  [base]"));

        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json["a"]["layer"], "env");
        assert_eq!(json["l"]["values"][1], "y");
    }
}
