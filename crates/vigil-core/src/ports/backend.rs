//! Event backend port (driven/secondary port)
//!
//! The monitor does not detect filesystem changes itself; a backend
//! adapter (inotify, kqueue, polling, a network-filesystem listener)
//! feeds raw events into the monitor and is told to stop when the
//! monitor is cancelled.
//!
//! ## Design Notes
//!
//! - A single capability trait replaces a per-backend inheritance
//!   hierarchy; backends that must be distinguished at runtime can
//!   carry their own tagged state.
//! - `stop` is invoked exactly once, by the `cancel()` call that
//!   performs the false-to-true transition. It may run on any thread.
//! - `stop` must be safe to call even if no watch was ever
//!   successfully established.

/// Port trait for the raw change-detection backend
pub trait EventBackend: Send + Sync {
    /// Stops the backend from producing further raw events
    ///
    /// Called exactly once by the monitor's cancellation transition.
    /// Implementations must tolerate being called before any watch was
    /// established and must not block on the monitor's own state.
    fn stop(&self);
}

/// A backend that watches nothing
///
/// Useful for consumers that inject events manually and for tests of
/// the monitor core.
#[derive(Debug, Default)]
pub struct NoopBackend;

impl EventBackend for NoopBackend {
    fn stop(&self) {}
}
