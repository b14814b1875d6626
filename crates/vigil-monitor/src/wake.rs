//! Single shared wake deadline
//!
//! A monitor holds at most one outstanding timer, armed at the earliest
//! pending deadline across every debounce entry. This is a hard
//! invariant, not an optimization: a second live timer would make "the
//! next fire" ambiguous and risks double delivery. The
//! [`WakeScheduler`] owns that one deadline as plain data; the driver's
//! select loop turns it into an actual sleep, waking 1ms past the
//! deadline so finite clock resolution can never fire it early.

use tracing::trace;

use crate::debounce::DebounceTable;

/// Tracks the monitor's single armed wake deadline
#[derive(Debug, Default)]
pub struct WakeScheduler {
    /// Absolute deadline (ms) the timer is armed for, or none
    fires_at: Option<u64>,
}

impl WakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The deadline the timer is currently armed for
    pub fn fires_at(&self) -> Option<u64> {
        self.fires_at
    }

    /// Drops the armed deadline (called when the timer fires)
    pub fn disarm(&mut self) {
        self.fires_at = None;
    }

    /// Arms the timer for an explicit deadline, or disarms it
    pub fn arm(&mut self, deadline: Option<u64>) {
        trace!(?deadline, "Arming wake timer");
        self.fires_at = deadline;
    }

    /// Rescans the table for the minimal pending deadline and rearms
    ///
    /// `hint` is the deadline the caller just introduced. If a timer is
    /// already armed to fire no later than the hint, the existing timer
    /// will wake early enough and the scan is skipped entirely; this
    /// keeps back-to-back event bursts from churning the timer. A
    /// `None` hint forces a full rescan.
    ///
    /// The rescan also garbage-collects idle entries as a side effect
    /// of the shared sweep.
    pub fn recompute(
        &mut self,
        table: &mut DebounceTable,
        now: u64,
        rate_limit: u64,
        hint: Option<u64>,
    ) {
        if let (Some(armed), Some(hint)) = (self.fires_at, hint) {
            if armed <= hint {
                return; // Already waking no later than the hint.
            }
        }

        let sweep = table.sweep(now, rate_limit, false);
        self.arm(sweep.next_deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vigil_core::domain::WatchedPath;

    fn path(s: &str) -> WatchedPath {
        WatchedPath::new(PathBuf::from(s)).unwrap()
    }

    const RATE: u64 = 800;

    #[test]
    fn test_recompute_arms_minimum_deadline() {
        let mut table = DebounceTable::new();
        table.get_or_create(&path("/a")).delayed_change_at = Some(900);
        table.get_or_create(&path("/b")).changes_done_at = Some(600);

        let mut wake = WakeScheduler::new();
        wake.recompute(&mut table, 100, RATE, None);
        assert_eq!(wake.fires_at(), Some(600));
    }

    #[test]
    fn test_recompute_disarms_on_empty_table() {
        let mut table = DebounceTable::new();
        let mut wake = WakeScheduler::new();
        wake.arm(Some(500));

        wake.recompute(&mut table, 100, RATE, None);
        assert_eq!(wake.fires_at(), None);
    }

    #[test]
    fn test_earlier_armed_timer_skips_rearm() {
        let mut table = DebounceTable::new();
        table.get_or_create(&path("/a")).changes_done_at = Some(400);

        let mut wake = WakeScheduler::new();
        wake.arm(Some(400));

        // A later hint must not touch the armed timer, even though the
        // table would be rescanned otherwise.
        wake.recompute(&mut table, 100, RATE, Some(1000));
        assert_eq!(wake.fires_at(), Some(400));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_earlier_hint_forces_rearm() {
        let mut table = DebounceTable::new();
        table.get_or_create(&path("/a")).delayed_change_at = Some(300);

        let mut wake = WakeScheduler::new();
        wake.arm(Some(900));

        wake.recompute(&mut table, 100, RATE, Some(300));
        assert_eq!(wake.fires_at(), Some(300));
    }

    #[test]
    fn test_at_most_one_deadline_across_many_paths() {
        let mut table = DebounceTable::new();
        let mut wake = WakeScheduler::new();

        for (i, p) in ["/a", "/b", "/c", "/d"].iter().enumerate() {
            let deadline = 500 + i as u64 * 100;
            table.get_or_create(&path(p)).delayed_change_at = Some(deadline);
            wake.recompute(&mut table, 0, RATE, Some(deadline));
        }

        // One deadline, equal to the table-wide minimum.
        assert_eq!(wake.fires_at(), Some(500));
    }

    #[test]
    fn test_recompute_collects_idle_entries() {
        let mut table = DebounceTable::new();
        table.get_or_create(&path("/a")).last_sent_at = Some(0);

        let mut wake = WakeScheduler::new();
        wake.recompute(&mut table, 2 * RATE, RATE, None);
        assert!(table.is_empty());
        assert_eq!(wake.fires_at(), None);
    }
}
