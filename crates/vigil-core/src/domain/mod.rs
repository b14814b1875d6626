//! Domain types for the Vigil file monitor
//!
//! Pure data types with no runtime dependencies: the event vocabulary
//! exchanged between backends, the monitor core, and consumers, plus
//! the validated path-identity newtype that keys all per-path state.

pub mod errors;
pub mod event;
pub mod path;

pub use errors::DomainError;
pub use event::{EventKind, MonitorEvent};
pub use path::WatchedPath;
