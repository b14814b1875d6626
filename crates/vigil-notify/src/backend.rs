//! Watcher backend lifecycle
//!
//! [`NotifyBackend`] owns the OS watcher and implements the monitor's
//! [`EventBackend`] port. Setup is two-phase because the monitor and
//! the backend reference each other: the backend is constructed first
//! (without an OS watcher), handed to [`Monitor::spawn`], and only then
//! started with the monitor's sink. The [`watch`] helper performs the
//! whole dance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use vigil_core::config::MonitorConfig;
use vigil_core::domain::{MonitorEvent, WatchedPath};
use vigil_core::ports::EventBackend;
use vigil_monitor::{EventSink, Monitor};

use crate::map::map_raw_event;

/// Errors raised while setting up the OS watcher
#[derive(Debug, Error)]
pub enum BackendError {
    /// The platform watcher could not be created at all
    #[error("failed to initialize filesystem watcher")]
    Init(#[source] notify::Error),

    /// The watcher exists but the root path could not be watched
    /// (missing path, permissions, inotify watch limit)
    #[error("failed to watch {path}")]
    Watch {
        path: WatchedPath,
        #[source]
        source: notify::Error,
    },
}

/// OS filesystem watcher implementing the monitor's backend port
///
/// `stop` is idempotent and safe to call before [`start`] has
/// established a watch; a cancellation racing the setup wins and the
/// freshly created watcher is torn down immediately.
///
/// [`start`]: NotifyBackend::start
pub struct NotifyBackend {
    root: WatchedPath,
    watcher: Mutex<Option<RecommendedWatcher>>,
    stopped: AtomicBool,
}

impl NotifyBackend {
    /// Creates a backend for the given root, without touching the OS yet
    pub fn new(root: WatchedPath) -> Self {
        Self {
            root,
            watcher: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    /// The root path this backend watches
    pub fn root(&self) -> &WatchedPath {
        &self.root
    }

    /// Creates the OS watcher and begins recursive watching of the root
    ///
    /// Every raw event is translated and pushed into `sink`; paths that
    /// fail validation are logged and skipped rather than aborting the
    /// watch.
    ///
    /// # Errors
    /// Returns [`BackendError`] if the watcher cannot be created or the
    /// root cannot be watched.
    pub fn start(&self, sink: EventSink) -> Result<(), BackendError> {
        info!(root = %self.root, "Starting filesystem watcher");

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for change in map_raw_event(&event) {
                        let path = match WatchedPath::new(change.path) {
                            Ok(p) => p,
                            Err(err) => {
                                warn!(error = %err, "Skipping event with invalid path");
                                continue;
                            }
                        };
                        let related = change.related.and_then(|p| WatchedPath::new(p).ok());
                        sink.emit(path, related, change.kind);
                    }
                }
                Err(err) => {
                    error!(error = %err, "Filesystem watcher error");
                }
            },
            notify::Config::default(),
        )
        .map_err(BackendError::Init)?;

        watcher
            .watch(self.root.as_ref(), RecursiveMode::Recursive)
            .map_err(|source| BackendError::Watch {
                path: self.root.clone(),
                source,
            })?;

        *lock_watcher(&self.watcher) = Some(watcher);

        // A cancel may have landed between spawn and start; it found no
        // watcher to drop, so honor it now.
        if self.stopped.load(Ordering::Acquire) {
            self.stop();
        }

        Ok(())
    }
}

impl EventBackend for NotifyBackend {
    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        if lock_watcher(&self.watcher).take().is_some() {
            // Dropping the watcher tears down all OS-level watches.
            info!(root = %self.root, "Stopped filesystem watcher");
        }
    }
}

/// Locks the watcher slot, recovering from a poisoned mutex
///
/// The slot only ever holds `Option<RecommendedWatcher>`, so a panic
/// mid-update cannot leave it in a torn state worth propagating.
fn lock_watcher(
    watcher: &Mutex<Option<RecommendedWatcher>>,
) -> MutexGuard<'_, Option<RecommendedWatcher>> {
    match watcher.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Watches a root path, returning the monitor and its delivery channel
///
/// Wires up the full stack: backend, monitor driver, and OS watcher.
/// Cancelling the monitor (or dropping it) stops the watcher.
///
/// # Errors
/// Returns [`BackendError`] if the OS watcher cannot be established;
/// the partially spawned monitor is cancelled before returning.
pub fn watch(
    root: WatchedPath,
    config: MonitorConfig,
) -> Result<(Monitor, mpsc::UnboundedReceiver<MonitorEvent>), BackendError> {
    let backend = Arc::new(NotifyBackend::new(root));
    let (monitor, event_rx) = Monitor::spawn(backend.clone(), config);

    if let Err(err) = backend.start(monitor.sink()) {
        monitor.cancel();
        return Err(err);
    }

    Ok((monitor, event_rx))
}
