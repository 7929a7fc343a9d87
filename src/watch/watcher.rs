//! Debounced file watcher.

use crate::error::{NotifierError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;
use tracing::{debug, trace};

/// Watches config files and emits a reload signal after they change.
///
/// Bursts of filesystem events (editors often write a file several times)
/// are collapsed into a single signal, sent once no event has arrived for
/// the debounce duration.
///
/// # Examples
///
/// ```rust,no_run
/// use nowplaying_notify::watch::ConfigWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> nowplaying_notify::error::Result<()> {
/// let (watcher, mut rx) = ConfigWatcher::new(Duration::from_millis(500))?;
/// watcher.watch("config/slack.yaml").await?;
///
/// while let Some(()) = rx.recv().await {
///     println!("credentials changed");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConfigWatcher {
    watcher: Arc<Mutex<RecommendedWatcher>>,
    debounce_duration: Duration,
    watched_paths: Arc<Mutex<Vec<PathBuf>>>,
}

impl ConfigWatcher {
    /// Create a watcher and the channel its reload signals arrive on.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform watcher cannot be created.
    pub fn new(debounce_duration: Duration) -> Result<(Self, mpsc::Receiver<()>)> {
        let (tx, rx) = mpsc::channel(16);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    let _ = event_tx.send(event);
                }
            }
        })
        .map_err(|e| NotifierError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        let debounce = debounce_duration;
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                trace!(paths = ?event.paths, "config file event");

                // Absorb the rest of the burst; the deadline moves with every event.
                let mut open = true;
                while open {
                    match timeout(debounce, event_rx.recv()).await {
                        Ok(Some(event)) => trace!(paths = ?event.paths, "config file event"),
                        Ok(None) => open = false,
                        Err(_) => break,
                    }
                }

                if tx.send(()).await.is_err() {
                    break;
                }
            }
            debug!("config watcher event loop finished");
        });

        Ok((
            Self {
                watcher: Arc::new(Mutex::new(watcher)),
                debounce_duration,
                watched_paths: Arc::new(Mutex::new(Vec::new())),
            },
            rx,
        ))
    }

    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be watched.
    pub async fn watch(&self, path: impl AsRef<Path>) -> Result<()> {
        let canonical_path = path.as_ref().canonicalize().map_err(|e| {
            NotifierError::WatchError(format!(
                "Failed to resolve {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.watcher
            .lock()
            .await
            .watch(&canonical_path, RecursiveMode::NonRecursive)
            .map_err(|e| NotifierError::WatchError(format!("Failed to watch path: {}", e)))?;
        debug!(path = %canonical_path.display(), "watching config file");

        let mut paths = self.watched_paths.lock().await;
        if !paths.contains(&canonical_path) {
            paths.push(canonical_path);
        }

        Ok(())
    }

    /// Stop watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or was not watched.
    pub async fn unwatch(&self, path: impl AsRef<Path>) -> Result<()> {
        let canonical_path = path.as_ref().canonicalize().map_err(|e| {
            NotifierError::WatchError(format!(
                "Failed to resolve {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.watcher
            .lock()
            .await
            .unwatch(&canonical_path)
            .map_err(|e| NotifierError::WatchError(format!("Failed to unwatch path: {}", e)))?;

        self.watched_paths
            .lock()
            .await
            .retain(|p| p != &canonical_path);

        Ok(())
    }

    /// Quiet period that ends a burst of file events.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    /// Currently watched paths, canonicalized.
    pub async fn watched_paths(&self) -> Vec<PathBuf> {
        self.watched_paths.lock().await.clone()
    }
}
