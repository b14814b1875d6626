//! Domain error types
//!
//! This module defines error types for domain-level validation failures.
//! The monitor's scheduling operations themselves are total and never
//! return errors; the only failure modes at this layer are contract
//! violations caught at construction time.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
