//! Vigil Monitor - Event rate-limiter and deferred-delivery scheduler
//!
//! Sits between a raw file-change backend (inotify, kqueue, polling)
//! and application consumers, turning a noisy stream of change
//! notifications into a rate-limited, deduplicated stream of discrete
//! `Changed` events plus a synthesized `ChangesDoneHint` once a burst
//! settles. Structural events (created, deleted, attribute-changed,
//! mount-related) pass through promptly.
//!
//! ## Architecture
//!
//! ```text
//! backend ──→ EventSink ──→ mpsc ──→ driver task ──→ mpsc ──→ consumer
//!                                       │
//!                            DebounceTable + WakeScheduler
//! ```
//!
//! All debounce state is owned by a single driver task; producers and
//! consumers only ever touch channels, so no operation here blocks and
//! consumer code never runs inside the monitor's own mutation path.
//!
//! ## Modules
//!
//! - [`monitor`] - The public [`Monitor`] façade and its driver task
//! - [`debounce`] - Per-path debounce entries and the swept table
//! - [`wake`] - The single shared wake deadline multiplexing all entries
//! - [`dispatch`] - Deferred delivery queue toward consumers
//! - [`clock`] - Monotonic millisecond clock

pub mod clock;
pub mod debounce;
pub mod dispatch;
pub mod monitor;
pub mod wake;

pub use monitor::{EventSink, Monitor, MonitorState};
