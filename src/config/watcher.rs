//! Hot reload of the route configuration.
//!
//! # Responsibilities
//! - Watch the config file with `notify`
//! - On a write or create, load and validate the file and rebuild routes
//! - Keep the current routes when the new file is rejected
//!
//! The reload runs on notify's event thread. Only the final
//! [`RouterHandle`] swap is visible to readers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_config;
use crate::routing::handle::RouterHandle;

/// Rebuilds a [`RouterHandle`] whenever its config file changes.
#[derive(Debug, Clone)]
pub struct ConfigWatcher {
    path: PathBuf,
    handle: Arc<RouterHandle>,
}

impl ConfigWatcher {
    pub fn new(path: &Path, handle: Arc<RouterHandle>) -> Self {
        Self {
            path: path.to_path_buf(),
            handle,
        }
    }

    /// Reload from disk and swap in the new routes.
    ///
    /// Returns `false` if the file could not be loaded or its services
    /// failed to register; the handle is left as it was.
    pub fn apply_change(&self) -> bool {
        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Rejected route config; keeping current routes");
                return false;
            }
        };

        match self.handle.reload(&config) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Route registration failed; keeping current routes");
                false
            }
        }
    }

    /// Begin watching. Reloads stop when the returned watcher is dropped.
    pub fn start(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) if is_relevant(&event.kind) => {
                tracing::info!(path = ?self.path, "Route config changed");
                self.apply_change();
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Config watch error"),
        })?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Watching route config");
        Ok(watcher)
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}
