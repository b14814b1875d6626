//! Vigil Core - Domain types and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `EventKind`, `MonitorEvent`, `WatchedPath`
//! - **Configuration** - `Config` / `MonitorConfig` with YAML loading
//! - **Port definitions** - The `EventBackend` trait that watcher
//!   adapter crates implement
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure types with no runtime dependencies.
//! Ports define trait interfaces that adapter crates (e.g. `vigil-notify`)
//! implement. The scheduling core itself lives in `vigil-monitor`.

pub mod config;
pub mod domain;
pub mod ports;
