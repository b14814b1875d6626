//! Per-path debounce state and the swept table
//!
//! Each watched path with recent activity owns a [`DebounceEntry`]
//! recording when a `Changed` event was last actually delivered and
//! which deferred deadlines (delayed change, synthesized
//! changes-done hint) are pending. The [`DebounceTable`] maps path
//! identities to entries and owns their lifecycle: entries are created
//! lazily on the first rate-limited event and garbage-collected once
//! idle, so the table only ever holds paths with recent or pending
//! activity.
//!
//! The table's single [`sweep`](DebounceTable::sweep) serves three
//! purposes in one pass: fire due deadlines, compute the earliest
//! still-pending deadline across all entries, and drop idle entries.
//! Fusing them bounds table growth without a separate GC pass.

use std::collections::HashMap;

use tracing::trace;
use vigil_core::domain::WatchedPath;

/// Debounce state for one watched path
///
/// An entry with all three fields absent is idle and will be removed
/// by the next sweep; the table never retains empty entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceEntry {
    /// When a `Changed` event was last actually delivered (ms)
    pub last_sent_at: Option<u64>,
    /// Deadline at which a suppressed `Changed` must be delivered if
    /// no further event arrives first (ms)
    pub delayed_change_at: Option<u64>,
    /// Deadline at which a synthesized `ChangesDoneHint` fires if no
    /// further `Changed` arrives first (ms)
    pub changes_done_at: Option<u64>,
}

/// What a due deadline resolves to when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueKind {
    /// A suppressed `Changed` whose rate-limit window elapsed
    DelayedChange,
    /// A synthesized `ChangesDoneHint` after a quiet period
    ChangesDone,
}

/// A deadline that came due during a firing sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueEvent {
    pub path: WatchedPath,
    pub kind: DueKind,
    /// The deadline that elapsed, not the instant the sweep ran
    pub deadline: u64,
}

/// Result of one table sweep
#[derive(Debug, Default)]
pub struct Sweep {
    /// Deadlines that fired, in deadline order (empty for
    /// recompute-only sweeps)
    pub due: Vec<DueEvent>,
    /// Earliest still-pending deadline across the whole table,
    /// including entry-expiry deadlines for garbage collection
    pub next_deadline: Option<u64>,
}

/// Mapping from path identity to debounce entry
#[derive(Debug, Default)]
pub struct DebounceTable {
    entries: HashMap<WatchedPath, DebounceEntry>,
}

impl DebounceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry for a path, if one exists
    pub fn get_mut(&mut self, path: &WatchedPath) -> Option<&mut DebounceEntry> {
        self.entries.get_mut(path)
    }

    /// Returns the existing entry for a path or inserts a fresh
    /// zero-valued one
    pub fn get_or_create(&mut self, path: &WatchedPath) -> &mut DebounceEntry {
        self.entries.entry(path.clone()).or_default()
    }

    /// Fires due deadlines, computes the minimum pending deadline, and
    /// garbage-collects idle entries, all in one pass
    ///
    /// With `fire` set, every entry whose `delayed_change_at` has
    /// elapsed (`now >= deadline`) yields a [`DueKind::DelayedChange`]
    /// and has `last_sent_at` stamped with the deadline; every elapsed
    /// `changes_done_at` yields a [`DueKind::ChangesDone`]. With `fire`
    /// unset the sweep only recomputes and collects.
    ///
    /// An entry survives the sweep if it has any pending deadline or if
    /// its `last_sent_at` is younger than `2 × rate_limit` (the expiry
    /// window also contributes to the minimum, so the wake timer fires
    /// to collect the entry even when nothing else is pending).
    pub fn sweep(&mut self, now: u64, rate_limit: u64, fire: bool) -> Sweep {
        let mut due = Vec::new();
        let mut next_deadline: Option<u64> = None;

        self.entries.retain(|path, entry| {
            if fire {
                if let Some(at) = entry.delayed_change_at {
                    if now >= at {
                        due.push(DueEvent {
                            path: path.clone(),
                            kind: DueKind::DelayedChange,
                            deadline: at,
                        });
                        entry.delayed_change_at = None;
                        // Stamp the deadline, not the fire instant: the
                        // timer wakes 1ms past the boundary and that
                        // slack must not widen the next window.
                        entry.last_sent_at = Some(at);
                    }
                }
                if let Some(at) = entry.changes_done_at {
                    if now >= at {
                        due.push(DueEvent {
                            path: path.clone(),
                            kind: DueKind::ChangesDone,
                            deadline: at,
                        });
                        entry.changes_done_at = None;
                    }
                }
            }

            let mut keep = false;

            if let Some(last) = entry.last_sent_at {
                // Entries linger for 2x the rate limit so the window
                // check still sees last_sent_at, then expire.
                let expire_at = last.saturating_add(2 * rate_limit);
                if now < expire_at {
                    keep = true;
                    next_deadline = min_deadline(next_deadline, expire_at);
                }
            }
            if let Some(at) = entry.delayed_change_at {
                keep = true;
                next_deadline = min_deadline(next_deadline, at);
            }
            if let Some(at) = entry.changes_done_at {
                keep = true;
                next_deadline = min_deadline(next_deadline, at);
            }

            if !keep {
                trace!(path = %path, "Collecting idle debounce entry");
            }
            keep
        });

        // Stable by deadline: ties keep per-entry order, so a delayed
        // change always precedes a changes-done hint firing at the
        // same instant for the same path.
        due.sort_by_key(|d| d.deadline);

        Sweep { due, next_deadline }
    }
}

fn min_deadline(current: Option<u64>, candidate: u64) -> Option<u64> {
    Some(match current {
        Some(existing) => existing.min(candidate),
        None => candidate,
    })
}
