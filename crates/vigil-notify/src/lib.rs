//! OS filesystem watcher backend
//!
//! Bridges the `notify` crate's raw OS events (inotify on Linux, kqueue
//! on macOS) into the monitor's event model. The backend owns the OS
//! watcher, translates each raw event into one or more monitor events,
//! and pushes them through an [`EventSink`](vigil_monitor::EventSink);
//! all rate limiting happens downstream in the monitor core.
//!
//! ## Architecture
//!
//! ```text
//! inotify / kqueue
//!       │
//!       ▼
//!  NotifyBackend  ──→  EventSink  ──→  Monitor driver  ──→  consumer
//! ```

pub mod backend;
mod map;

pub use backend::{watch, BackendError, NotifyBackend};
