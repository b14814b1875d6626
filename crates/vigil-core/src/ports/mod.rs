//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces the monitor core depends on but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`EventBackend`] - The raw change-detection backend (inotify,
//!   kqueue, polling) the monitor stops on cancellation

pub mod backend;

pub use backend::{EventBackend, NoopBackend};
