//! Raw OS event translation
//!
//! Converts `notify::Event` values into the monitor's event vocabulary.
//! A single raw event can expand into more than one monitor event: a
//! rename observed with both endpoints becomes a `Deleted` for the old
//! path and a `Created` for the new one, each carrying the other as its
//! related path.

use std::path::PathBuf;

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind as RawKind;
use tracing::debug;

use vigil_core::domain::EventKind;

/// One translated change, still in raw `PathBuf` form
///
/// Path validation happens at the backend boundary, after translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawChange {
    pub path: PathBuf,
    pub related: Option<PathBuf>,
    pub kind: EventKind,
}

impl RawChange {
    fn new(path: PathBuf, kind: EventKind) -> Self {
        Self {
            path,
            related: None,
            kind,
        }
    }
}

/// Translates a raw watcher event into zero or more monitor changes
///
/// Access events and events without paths are dropped.
pub(crate) fn map_raw_event(event: &notify::Event) -> Vec<RawChange> {
    let paths = &event.paths;
    let Some(first) = paths.first() else {
        debug!(kind = ?event.kind, "Ignoring raw event without paths");
        return Vec::new();
    };

    match &event.kind {
        RawKind::Create(_) => {
            vec![RawChange::new(first.clone(), EventKind::Created)]
        }

        RawKind::Remove(_) => {
            vec![RawChange::new(first.clone(), EventKind::Deleted)]
        }

        RawKind::Modify(ModifyKind::Data(_)) => {
            vec![RawChange::new(first.clone(), EventKind::Changed)]
        }

        RawKind::Modify(ModifyKind::Metadata(_)) => {
            vec![RawChange::new(first.clone(), EventKind::AttributeChanged)]
        }

        RawKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() >= 2 => {
            // A rename pair: the old path vanishes, the new one
            // appears, cross-linked through the related field.
            let old = paths[0].clone();
            let new = paths[1].clone();
            debug!(old = %old.display(), new = %new.display(), "Mapped rename pair");
            vec![
                RawChange {
                    path: old.clone(),
                    related: Some(new.clone()),
                    kind: EventKind::Deleted,
                },
                RawChange {
                    path: new,
                    related: Some(old),
                    kind: EventKind::Created,
                },
            ]
        }

        RawKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            vec![RawChange::new(first.clone(), EventKind::Deleted)]
        }

        RawKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            vec![RawChange::new(first.clone(), EventKind::Created)]
        }

        // Remaining modify kinds (rename with unknown direction, Any,
        // Other) are reported conservatively as content changes.
        RawKind::Modify(_) => {
            vec![RawChange::new(first.clone(), EventKind::Changed)]
        }

        _ => {
            debug!(kind = ?event.kind, "Ignoring raw event kind");
            Vec::new()
        }
    }
}
