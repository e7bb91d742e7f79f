//! Configuration file watcher for hot reload of dispatch settings.
//!
//! Each change to the file is loaded and validated, then compared with the
//! configuration currently applied. Only the `[dispatch]` section takes effect
//! at runtime; the new [`DispatchSettings`] are sent to the server. Changes to
//! other sections are reported and ignored until restart.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;
use crate::routing::DispatchSettings;

/// Watches the configuration file and emits reloaded dispatch settings.
pub struct ConfigWatcher {
    path: PathBuf,
    applied: AppConfig,
    update_tx: mpsc::UnboundedSender<DispatchSettings>,
}

impl ConfigWatcher {
    /// Creates a watcher for `path`, starting from the configuration the
    /// server was built with.
    pub fn new(path: &Path, applied: &AppConfig) -> (Self, mpsc::UnboundedReceiver<DispatchSettings>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                applied: applied.clone(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut applied,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let next = match load_config(&path) {
                        Ok(next) => next,
                        Err(e) => {
                            tracing::error!(path = ?path, error = %e, "Rejected config change, keeping dispatch settings");
                            return;
                        }
                    };
                    if let Some(settings) = apply_reload(&mut applied, next) {
                        if update_tx.send(settings).is_err() {
                            tracing::debug!("Dispatch settings receiver dropped");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

/// Folds a reloaded configuration into `applied`, returning the settings to
/// swap in when the dispatch section changed.
pub(crate) fn apply_reload(applied: &mut AppConfig, next: AppConfig) -> Option<DispatchSettings> {
    let restart_only: Vec<&str> = [
        ("listener", applied.listener != next.listener),
        ("timeouts", applied.timeouts != next.timeouts),
        ("observability", applied.observability != next.observability),
    ]
    .into_iter()
    .filter_map(|(section, changed)| changed.then_some(section))
    .collect();
    if !restart_only.is_empty() {
        tracing::warn!(sections = ?restart_only, "Config sections changed; they apply after a restart");
    }

    if applied.dispatch == next.dispatch {
        tracing::debug!("Dispatch settings unchanged");
        return None;
    }

    tracing::info!(
        old_max_passes = ?applied.dispatch.max_passes,
        new_max_passes = ?next.dispatch.max_passes,
        old_source_order = ?applied.dispatch.source_order,
        new_source_order = ?next.dispatch.source_order,
        "Swapping dispatch settings"
    );
    applied.dispatch = next.dispatch;
    Some(applied.dispatch.settings())
}
