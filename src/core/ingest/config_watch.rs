//! Configuration hot reload.
//!
//! Watches the directory holding the config file (editors usually replace the
//! file rather than write in place) and reloads the store whenever an event
//! touches the file itself.

use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use crate::core::config_store::ConfigStore;

/// Whether a watcher event concerns the config file
fn touches(event: &Event, config_path: &Path) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    );
    relevant
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == config_path.file_name())
}

pub async fn watch_config(store: Arc<ConfigStore>, mut shutdown: broadcast::Receiver<()>) {
    let Some(config_path) = store.path().map(Path::to_path_buf) else {
        log::debug!("Config hot-reload disabled: configuration has no backing file");
        return;
    };
    let directory = match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = match RecommendedWatcher::new(
        move |result: notify::Result<Event>| {
            let _ = tx.send(result);
        },
        NotifyConfig::default(),
    ) {
        Ok(watcher) => watcher,
        Err(e) => {
            log::warn!("Config hot-reload disabled: watcher init failed: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&directory, RecursiveMode::NonRecursive) {
        log::warn!(
            "Config hot-reload disabled: failed to watch {}: {}",
            directory.display(),
            e
        );
        return;
    }

    log::info!("Watching {} for changes", config_path.display());

    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(result) = received else { break };
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("Config watcher error: {}", e);
                        continue;
                    }
                };

                if !touches(&event, &config_path) {
                    continue;
                }

                match store.reload() {
                    Ok(config) => log::info!(
                        "Configuration reloaded (interval={}s, cpu warning/critical={}/{})",
                        config.monitoring.interval,
                        config.thresholds.cpu_temp.warning,
                        config.thresholds.cpu_temp.critical
                    ),
                    Err(e) => log::warn!("Ignoring invalid configuration change: {}", e),
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Config watcher shutting down");
                break;
            }
        }
    }
}
