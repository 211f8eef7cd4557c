//! Background freshness checks for loaded sources.
//!
//! All sources share one scheduler: a tokio current-thread runtime on a
//! dedicated thread, started on first use. Each registered source gets a
//! task that calls [`ConfigSource::check_for_update`] roughly once per
//! refresh interval until its [`RefreshHandle`] is cancelled.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::source::ConfigSource;

const SCHEDULER_THREAD_NAME: &str = "strata-refresh";

/// Cancels one source's refresh task. Dropping the handle cancels it too.
#[derive(Debug)]
pub struct RefreshHandle {
    token: CancellationToken,
    origin: String,
}

impl RefreshHandle {
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            debug!(origin = %self.origin, "cancelling refresh task");
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start periodic freshness checks for `source`.
///
/// Returns `None` when the interval is zero or the scheduler is unavailable;
/// the source then keeps its initial contents.
pub fn register(source: Arc<ConfigSource>) -> Option<RefreshHandle> {
    let interval = source.refresh_interval();
    if interval.is_zero() {
        debug!(origin = %source.origin(), "refresh disabled for source");
        return None;
    }

    let scheduler = scheduler()?;
    let token = CancellationToken::new();
    let origin = source.origin().to_string();

    scheduler.spawn(refresh_loop(source, interval, token.clone()));

    Some(RefreshHandle { token, origin })
}

async fn refresh_loop(source: Arc<ConfigSource>, interval: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = source.check_for_update() {
                    warn!(layer = %source.layer(), "keeping stale config: {e}");
                }
            }
        }
    }

    debug!(origin = %source.origin(), "refresh task stopped");
}

fn scheduler() -> Option<&'static Handle> {
    static SCHEDULER: OnceLock<Option<Handle>> = OnceLock::new();
    SCHEDULER.get_or_init(start_scheduler).as_ref()
}

fn start_scheduler() -> Option<Handle> {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to build refresh scheduler, config reload disabled: {e}");
            return None;
        }
    };
    let handle = runtime.handle().clone();

    let spawned = std::thread::Builder::new()
        .name(SCHEDULER_THREAD_NAME.to_string())
        .spawn(move || runtime.block_on(std::future::pending::<()>()));

    match spawned {
        Ok(_) => Some(handle),
        Err(e) => {
            error!("failed to start refresh scheduler thread, config reload disabled: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Layer, SourceOrigin};
    use std::path::Path;

    fn source_with_interval(dir: &Path, interval: Duration) -> Arc<ConfigSource> {
        let path = dir.join("app.properties");
        std::fs::write(&path, "a=1").unwrap();
        Arc::new(ConfigSource::load(Layer::Base, SourceOrigin::File(path), interval).unwrap())
    }

    #[test]
    fn zero_interval_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_with_interval(dir.path(), Duration::ZERO);
        assert!(register(source).is_none());
    }

    #[test]
    fn cancel_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_with_interval(dir.path(), Duration::from_secs(60));
        let handle = register(source).expect("scheduler should start");
        assert!(!handle.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn cancelled_task_releases_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_with_interval(dir.path(), Duration::from_millis(20));
        let handle = register(Arc::clone(&source)).expect("scheduler should start");
        assert!(Arc::strong_count(&source) >= 2);

        drop(handle);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while Arc::strong_count(&source) > 1 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(Arc::strong_count(&source), 1);
    }
}
