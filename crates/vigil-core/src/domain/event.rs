//! Monitor event vocabulary
//!
//! Defines the closed set of event kinds a monitor can deliver and the
//! [`MonitorEvent`] message consumers receive. `Changed` is the only
//! kind subject to rate limiting; all other kinds are structural and
//! bypass debounce suppression.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::path::WatchedPath;

/// The kind of change a monitor event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// File content changed
    Changed,
    /// No further changes expected for a quiet period (may be
    /// synthesized by the monitor after a burst of `Changed` events)
    ChangesDoneHint,
    /// A file or directory was created
    Created,
    /// A file or directory was deleted
    Deleted,
    /// File metadata changed (permissions, timestamps, ownership)
    AttributeChanged,
    /// The filesystem containing the watched path is about to unmount
    PreUnmount,
    /// The filesystem containing the watched path was unmounted
    Unmounted,
}

impl EventKind {
    /// Returns true if this kind is subject to rate limiting
    ///
    /// Only `Changed` events are debounced; everything else passes
    /// through promptly (after flushing any pending debounce state for
    /// the path).
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, EventKind::Changed)
    }

    /// Returns true for structural events that bypass the debounce window
    #[must_use]
    pub fn is_structural(&self) -> bool {
        !self.is_rate_limited()
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Changed => "changed",
            EventKind::ChangesDoneHint => "changes-done-hint",
            EventKind::Created => "created",
            EventKind::Deleted => "deleted",
            EventKind::AttributeChanged => "attribute-changed",
            EventKind::PreUnmount => "pre-unmount",
            EventKind::Unmounted => "unmounted",
        };
        write!(f, "{}", s)
    }
}

/// A change notification delivered to consumers
///
/// `related` is present only for events that reference a second path
/// (e.g. the destination of a rename); it is `None` for everything
/// else, including all events the monitor synthesizes itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorEvent {
    /// The path the event is about
    pub path: WatchedPath,
    /// Secondary path for two-path events, otherwise absent
    pub related: Option<WatchedPath>,
    /// What happened
    pub kind: EventKind,
}

impl MonitorEvent {
    /// Creates an event with no related path
    pub fn new(path: WatchedPath, kind: EventKind) -> Self {
        Self {
            path,
            related: None,
            kind,
        }
    }

    /// Creates an event carrying a related path
    pub fn with_related(path: WatchedPath, related: WatchedPath, kind: EventKind) -> Self {
        Self {
            path,
            related: Some(related),
            kind,
        }
    }
}
