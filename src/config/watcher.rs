//! Hot reload of the configuration file.
//!
//! Editors and deploy tooling tend to emit several filesystem events per
//! save, so reload attempts are debounced. A revision that fails to parse
//! or validate is dropped and the running configuration stays in force.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::VaultConfig;

/// Quiet period required between two reload attempts.
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Collapses bursts of filesystem events into single reload attempts.
struct Debouncer {
    quiet: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    fn new(quiet: Duration) -> Self {
        Self { quiet, last: None }
    }

    /// True when enough quiet time has passed; arms the window when it has.
    fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(armed) if now.duration_since(armed) < self.quiet => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Watches the configuration file and emits validated revisions.
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Start watching.
    ///
    /// Returns the receiving end of the revision stream and the notify
    /// handle, which must be kept alive for events to keep flowing. Only
    /// revisions that pass the loader's validation are emitted.
    pub fn start(
        self,
    ) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<VaultConfig>), notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();
        let path = self.path.clone();
        let debouncer = Mutex::new(Debouncer::new(DEBOUNCE));

        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<Event>| {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !event.kind.is_modify() && !event.kind.is_create() {
                    return;
                }
                if !debouncer
                    .lock()
                    .expect("debouncer mutex poisoned")
                    .ready(Instant::now())
                {
                    return;
                }

                match load_config(&path) {
                    Ok(config) => {
                        tracing::info!(
                            environment = %config.environment,
                            "Configuration file revision accepted"
                        );
                        let _ = tx.send(config);
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            "Configuration file revision rejected, keeping the running configuration"
                        );
                    }
                }
            })?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %self.path.display(), "Config watcher started");
        Ok((watcher, rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debouncer_collapses_event_bursts() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let start = Instant::now();

        assert!(debouncer.ready(start));
        // the burst a single save produces
        assert!(!debouncer.ready(start + Duration::from_millis(5)));
        assert!(!debouncer.ready(start + Duration::from_millis(400)));
        // a later save gets through again
        assert!(debouncer.ready(start + Duration::from_millis(600)));
        assert!(!debouncer.ready(start + Duration::from_millis(700)));
    }

    #[tokio::test]
    async fn emits_valid_revisions_and_swallows_broken_ones() {
        let path = std::env::temp_dir().join(format!(
            "idea-vault-watch-{}.toml",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, "environment = \"development\"\n").unwrap();

        let (_guard, mut revisions) = ConfigWatcher::new(&path).start().unwrap();

        // broken TOML first: must not come through
        std::fs::write(&path, "environment = ").unwrap();
        tokio::time::sleep(Duration::from_millis(700)).await;

        std::fs::write(
            &path,
            "environment = \"production\"\n\n[auth]\nadmin_password = \"s3cret\"\n",
        )
        .unwrap();

        let config = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let config = revisions.recv().await.expect("watcher channel closed");
                if config.is_production() {
                    return config;
                }
            }
        })
        .await
        .expect("revision should arrive");

        assert_eq!(config.auth.admin_password, "s3cret");
        std::fs::remove_file(&path).unwrap_or_default();
    }
}
