//! Monitor façade and its driver task
//!
//! [`Monitor`] is the public face of the rate-limiting core. Backends
//! push raw events through an [`EventSink`]; a single driver task owns
//! every piece of debounce state and multiplexes the per-path deadlines
//! onto one wake timer; consumers drain a deferred delivery channel.
//! Because all mutation happens on the driver task, the table and
//! scheduler need no locks at all. The only cross-thread state is the
//! cancellation flag, which is a lone atomic so that `cancel()` from an
//! arbitrary owning thread can never contend with the scheduler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace};

use vigil_core::config::MonitorConfig;
use vigil_core::domain::{EventKind, MonitorEvent, WatchedPath};
use vigil_core::ports::EventBackend;

use crate::clock::MonitorClock;
use crate::debounce::{DebounceTable, DueKind};
use crate::dispatch::Dispatcher;
use crate::wake::WakeScheduler;

/// Observable monitor state published to subscribers
///
/// A new value is published whenever the rate limit or the cancellation
/// flag actually changes; setting the rate limit to its current value
/// notifies nobody.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorState {
    /// Current rate-limit window
    pub rate_limit: Duration,
    /// Whether the monitor has been cancelled
    pub cancelled: bool,
}

/// Commands sent from the façade to the driver task
enum Command {
    Emit {
        path: WatchedPath,
        related: Option<WatchedPath>,
        kind: EventKind,
    },
    SetRateLimit(u64),
}

/// Cloneable producer handle backends use to inject raw events
///
/// Sending never blocks and never runs consumer code. After the monitor
/// is cancelled the sink silently drops events; a well-behaved backend
/// stops calling once its `stop()` ran, but a straggler does no harm.
#[derive(Clone)]
pub struct EventSink {
    cmd_tx: mpsc::UnboundedSender<Command>,
    cancelled: Arc<AtomicBool>,
}

impl EventSink {
    /// Injects a raw event for classification and (possibly deferred)
    /// delivery
    ///
    /// `related` is present only for events referencing a second path
    /// (e.g. a rename pair). Events for the same path are processed in
    /// call order.
    pub fn emit(&self, path: WatchedPath, related: Option<WatchedPath>, kind: EventKind) {
        if self.cancelled.load(Ordering::Acquire) {
            debug!(path = %path, %kind, "Ignoring event on cancelled monitor");
            return;
        }
        // Send only fails once the driver is gone, which means the
        // monitor itself was dropped; nothing left to notify then.
        let _ = self.cmd_tx.send(Command::Emit {
            path,
            related,
            kind,
        });
    }
}

/// The public rate-limiting monitor façade
///
/// Created once per watch with [`Monitor::spawn`], cancelled exactly
/// once (explicitly or on drop). Cloning is deliberately not offered;
/// producers get an [`EventSink`], observers a watch receiver.
pub struct Monitor {
    cmd_tx: mpsc::UnboundedSender<Command>,
    cancelled: Arc<AtomicBool>,
    backend: Arc<dyn EventBackend>,
    state_tx: watch::Sender<MonitorState>,
}

impl Monitor {
    /// Spawns the driver task and returns the façade plus the
    /// consumer's delivery channel
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(
        backend: Arc<dyn EventBackend>,
        config: MonitorConfig,
    ) -> (Self, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (dispatcher, event_rx) = Dispatcher::channel();
        let (state_tx, _) = watch::channel(MonitorState {
            rate_limit: config.rate_limit(),
            cancelled: false,
        });

        info!(
            rate_limit_ms = config.rate_limit_ms,
            changes_done_delay_ms = config.changes_done_delay_ms,
            "Spawning monitor driver"
        );

        let driver = Driver {
            cmd_rx,
            dispatcher,
            clock: MonitorClock::start(),
            table: DebounceTable::new(),
            wake: WakeScheduler::new(),
            rate_limit_ms: config.rate_limit_ms,
            changes_done_delay_ms: config.changes_done_delay_ms,
        };
        tokio::spawn(driver.run());

        let monitor = Self {
            cmd_tx,
            cancelled: Arc::new(AtomicBool::new(false)),
            backend,
            state_tx,
        };
        (monitor, event_rx)
    }

    /// Returns a cloneable producer handle for the backend
    pub fn sink(&self) -> EventSink {
        EventSink {
            cmd_tx: self.cmd_tx.clone(),
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Injects a raw event (see [`EventSink::emit`])
    pub fn emit_event(&self, path: WatchedPath, related: Option<WatchedPath>, kind: EventKind) {
        self.sink().emit(path, related, kind);
    }

    /// Changes the rate-limit window for all future decisions
    ///
    /// Already-armed deadlines are not revisited. Subscribers are
    /// notified only when the value actually changes.
    pub fn set_rate_limit(&self, limit_ms: u64) {
        let modified = self.state_tx.send_if_modified(|state| {
            let limit = Duration::from_millis(limit_ms);
            if state.rate_limit == limit {
                false
            } else {
                state.rate_limit = limit;
                true
            }
        });

        if modified {
            debug!(limit_ms, "Rate limit updated");
            let _ = self.cmd_tx.send(Command::SetRateLimit(limit_ms));
        }
    }

    /// Cancels the monitor
    ///
    /// The transition from live to cancelled happens exactly once; only
    /// the call that performs it stops the backend and notifies
    /// subscribers, and only that call returns `true`. Safe to call
    /// from any thread, concurrently with event emission.
    pub fn cancel(&self) -> bool {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        info!("Monitor cancelled, stopping backend");
        self.backend.stop();
        self.state_tx.send_modify(|state| state.cancelled = true);
        true
    }

    /// Whether the monitor has been cancelled (thread-safe)
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Subscribes to rate-limit and cancellation changes
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state_tx.subscribe()
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        // Teardown cancels implicitly; the driver drains its channel
        // and exits once every sender handle is gone.
        self.cancel();
    }
}

// ============================================================================
// Driver task
// ============================================================================

/// Single-threaded owner of all debounce state
///
/// Runs as one tokio task selecting between the command channel and the
/// wake timer; exits when the last sender handle is dropped. Deliveries
/// already queued at that point still reach the consumer.
struct Driver {
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    dispatcher: Dispatcher,
    clock: MonitorClock,
    table: DebounceTable,
    wake: WakeScheduler,
    rate_limit_ms: u64,
    changes_done_delay_ms: u64,
}

impl Driver {
    async fn run(mut self) {
        debug!("Monitor driver starting");

        loop {
            // The sleep wakes 1ms past the deadline so that finite
            // clock resolution can never fire a deadline early.
            let deadline = self
                .wake
                .fires_at()
                .map(|at| self.clock.instant_at(at.saturating_add(1)));

            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(Command::Emit { path, related, kind }) => {
                            self.handle_event(path, related, kind);
                        }
                        Some(Command::SetRateLimit(limit_ms)) => {
                            debug!(limit_ms, "Driver applying new rate limit");
                            self.rate_limit_ms = limit_ms;
                        }
                        None => break,
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(|| self.clock.instant_at(0))),
                    if deadline.is_some() =>
                {
                    self.on_timer_fire();
                }
            }
        }

        debug!("Monitor driver stopped");
    }

    /// Classifies one raw event and applies the dispatch policy
    fn handle_event(&mut self, path: WatchedPath, related: Option<WatchedPath>, kind: EventKind) {
        let now = self.clock.now_ms();
        trace!(path = %path, %kind, now, "Handling raw event");

        if kind.is_structural() {
            self.handle_structural(path, related, kind, now);
        } else {
            self.handle_changed(path, related, now);
        }
    }

    /// Structural events flush pending debounce state for the path and
    /// are then delivered unconditionally
    fn handle_structural(
        &mut self,
        path: WatchedPath,
        related: Option<WatchedPath>,
        kind: EventKind,
        now: u64,
    ) {
        let mut flush_changed = false;
        let mut flush_done = false;
        let mut had_entry = false;

        if let Some(entry) = self.table.get_mut(&path) {
            had_entry = true;
            if entry.delayed_change_at.take().is_some() {
                entry.last_sent_at = Some(now);
                flush_changed = true;
            }
            if kind == EventKind::ChangesDoneHint {
                // The real hint supersedes the synthesized one;
                // delivering both would be redundant.
                entry.changes_done_at = None;
            } else if entry.changes_done_at.take().is_some() {
                flush_done = true;
            }
        }

        // The flushed delayed Changed is ordered before the incoming
        // structural event; a flushed hint follows the Changed.
        if flush_changed {
            self.dispatcher
                .queue(MonitorEvent::new(path.clone(), EventKind::Changed));
        }
        if flush_done {
            self.dispatcher
                .queue(MonitorEvent::new(path.clone(), EventKind::ChangesDoneHint));
        }
        if had_entry {
            self.recompute(now, None);
        }

        self.dispatcher.queue(MonitorEvent {
            path,
            related,
            kind,
        });
    }

    /// `Changed` events are rate limited per path
    fn handle_changed(&mut self, path: WatchedPath, related: Option<WatchedPath>, now: u64) {
        let rate = self.rate_limit_ms;
        let mut emit_now = true;
        let mut delayed_hint = None;

        if let Some(entry) = self.table.get_mut(&path) {
            if let Some(last) = entry.last_sent_at {
                if now.saturating_sub(last) < rate {
                    // Inside the window: suppress, and arm a delayed
                    // delivery at the end of the window unless one is
                    // already pending.
                    emit_now = false;
                    if entry.delayed_change_at.is_none() {
                        let deadline = last.saturating_add(rate);
                        entry.delayed_change_at = Some(deadline);
                        delayed_hint = Some(deadline);
                    }
                }
            }
        }
        if let Some(deadline) = delayed_hint {
            trace!(path = %path, deadline, "Suppressed change, delayed delivery armed");
            self.recompute(now, Some(deadline));
        }

        if emit_now {
            self.dispatcher.queue(MonitorEvent {
                path: path.clone(),
                related,
                kind: EventKind::Changed,
            });
            let entry = self.table.get_or_create(&path);
            entry.last_sent_at = Some(now);
            entry.delayed_change_at = None;
            // The expiry hint keeps the wake timer alive long enough to
            // garbage-collect the entry if nothing else happens.
            let expiry = now.saturating_add(2 * rate);
            self.recompute(now, Some(expiry));
        }

        // Every Changed postpones the settled hint relative to itself.
        let done_at = now.saturating_add(self.changes_done_delay_ms);
        self.table.get_or_create(&path).changes_done_at = Some(done_at);
        self.recompute(now, Some(done_at));
    }

    /// Services the wake timer: fire due deadlines, rearm for the next
    fn on_timer_fire(&mut self) {
        let now = self.clock.now_ms();
        self.wake.disarm();

        let sweep = self.table.sweep(now, self.rate_limit_ms, true);
        for due in &sweep.due {
            let kind = match due.kind {
                DueKind::DelayedChange => EventKind::Changed,
                DueKind::ChangesDone => EventKind::ChangesDoneHint,
            };
            trace!(path = %due.path, deadline = due.deadline, %kind, "Firing deferred deadline");
            self.dispatcher
                .queue(MonitorEvent::new(due.path.clone(), kind));
        }

        self.wake.arm(sweep.next_deadline);
    }

    fn recompute(&mut self, now: u64, hint: Option<u64>) {
        self.wake
            .recompute(&mut self.table, now, self.rate_limit_ms, hint);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;

    use vigil_core::ports::NoopBackend;

    struct CountingBackend {
        stops: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                stops: AtomicUsize::new(0),
            })
        }

        fn stop_count(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    impl EventBackend for CountingBackend {
        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn path(s: &str) -> WatchedPath {
        WatchedPath::new(PathBuf::from(s)).unwrap()
    }

    fn config() -> MonitorConfig {
        MonitorConfig::default() // 800ms rate limit, 2000ms hint delay
    }

    fn spawn_default() -> (Monitor, mpsc::UnboundedReceiver<MonitorEvent>) {
        Monitor::spawn(Arc::new(NoopBackend), config())
    }

    /// Lets the driver task process queued commands without advancing
    /// the paused clock.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    /// Advances paused time (auto-advance fires the driver's timer at
    /// its exact deadline along the way) and lets the driver settle.
    async fn advance_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        settle().await;
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<MonitorEvent>) -> Vec<MonitorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn kinds(events: &[MonitorEvent]) -> Vec<EventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    // ------------------------------------------------------------------
    // Basic delivery
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_first_changed_delivered_immediately() {
        let (monitor, mut rx) = spawn_default();

        monitor.emit_event(path("/a"), None, EventKind::Changed);
        settle().await;

        let events = drain(&mut rx);
        assert_eq!(kinds(&events), vec![EventKind::Changed]);
        assert_eq!(events[0].path, path("/a"));
        assert!(events[0].related.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_paths_have_independent_windows() {
        let (monitor, mut rx) = spawn_default();

        monitor.emit_event(path("/a"), None, EventKind::Changed);
        monitor.emit_event(path("/b"), None, EventKind::Changed);
        settle().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == EventKind::Changed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_related_path_passes_through() {
        let (monitor, mut rx) = spawn_default();

        monitor.emit_event(path("/old"), Some(path("/new")), EventKind::Deleted);
        settle().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].related, Some(path("/new")));
    }

    // ------------------------------------------------------------------
    // Debounce collapse and the settled hint
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapse() {
        let (monitor, mut rx) = spawn_default();
        let p = path("/a");

        // Burst at t = 0, 100, 200, 700.
        monitor.emit_event(p.clone(), None, EventKind::Changed);
        settle().await;
        assert_eq!(drain(&mut rx).len(), 1, "first change delivered at t=0");

        for _ in 0..2 {
            advance_ms(100).await;
            monitor.emit_event(p.clone(), None, EventKind::Changed);
            settle().await;
        }
        advance_ms(500).await; // t = 700
        monitor.emit_event(p.clone(), None, EventKind::Changed);
        settle().await;
        assert!(drain(&mut rx).is_empty(), "burst is suppressed");

        // The one delayed change fires at the end of the window (800).
        advance_ms(150).await; // t = 850
        let events = drain(&mut rx);
        assert_eq!(kinds(&events), vec![EventKind::Changed]);

        // Nothing further until the settled hint.
        advance_ms(1000).await; // t = 1850
        assert!(drain(&mut rx).is_empty());

        // Hint fires 2000ms after the last change in the burst (t=700).
        advance_ms(900).await; // t = 2750
        let events = drain(&mut rx);
        assert_eq!(kinds(&events), vec![EventKind::ChangesDoneHint]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_hint_not_early() {
        let (monitor, mut rx) = spawn_default();
        let p = path("/a");

        monitor.emit_event(p.clone(), None, EventKind::Changed);
        advance_ms(700).await;
        monitor.emit_event(p.clone(), None, EventKind::Changed);
        settle().await;
        drain(&mut rx);

        // The first change would have settled at 2000; the second
        // postponed the hint to 700 + 2000.
        advance_ms(1900).await; // t = 2600
        let events = drain(&mut rx);
        assert!(
            !events.iter().any(|e| e.kind == EventKind::ChangesDoneHint),
            "hint must not fire before t=2700, got {events:?}"
        );

        advance_ms(200).await; // t = 2800
        let events = drain(&mut rx);
        assert_eq!(kinds(&events), vec![EventKind::ChangesDoneHint]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_trip_scenario() {
        let (monitor, mut rx) = spawn_default();
        let p = path("/a");

        monitor.emit_event(p.clone(), None, EventKind::Changed); // t = 0
        settle().await;
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::Changed]);

        advance_ms(500).await;
        monitor.emit_event(p.clone(), None, EventKind::Changed); // t = 500, suppressed
        settle().await;
        assert!(drain(&mut rx).is_empty());

        // Delayed delivery at the end of the first window (t = 800).
        advance_ms(400).await; // t = 900
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::Changed]);

        // t = 1600 is a full window past the delayed delivery at 800,
        // so this change goes out immediately.
        advance_ms(700).await; // t = 1600
        monitor.emit_event(p.clone(), None, EventKind::Changed);
        settle().await;
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::Changed]);

        // One hint, 2000ms after the last change: t = 3600.
        advance_ms(1950).await; // t = 3550
        assert!(drain(&mut rx).is_empty());
        advance_ms(100).await; // t = 3650
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::ChangesDoneHint]);

        // And nothing else, ever.
        advance_ms(10_000).await;
        assert!(drain(&mut rx).is_empty());
    }

    // ------------------------------------------------------------------
    // Structural events
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_structural_bypass_flushes_pending_change() {
        let (monitor, mut rx) = spawn_default();
        let p = path("/a");

        monitor.emit_event(p.clone(), None, EventKind::Changed); // t = 0
        advance_ms(100).await;
        monitor.emit_event(p.clone(), None, EventKind::Changed); // suppressed, delayed at 800
        settle().await;
        drain(&mut rx);

        advance_ms(100).await; // t = 200
        monitor.emit_event(p.clone(), None, EventKind::Created);
        settle().await;

        // Pending Changed flushes first, then the pending hint, then
        // the structural event itself.
        let events = drain(&mut rx);
        assert_eq!(
            kinds(&events),
            vec![
                EventKind::Changed,
                EventKind::ChangesDoneHint,
                EventKind::Created
            ]
        );

        // The delayed deadline was cleared, so nothing fires at t=800.
        advance_ms(1000).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_real_hint_supersedes_synthesized_one() {
        let (monitor, mut rx) = spawn_default();
        let p = path("/a");

        monitor.emit_event(p.clone(), None, EventKind::Changed);
        advance_ms(100).await;
        drain(&mut rx);

        // A real hint from the backend clears the synthesized one
        // without delivering twice.
        monitor.emit_event(p.clone(), None, EventKind::ChangesDoneHint);
        settle().await;
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::ChangesDoneHint]);

        advance_ms(5000).await;
        assert!(
            drain(&mut rx).is_empty(),
            "synthesized hint must not fire after a real one"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_structural_event_without_entry_passes_straight_through() {
        let (monitor, mut rx) = spawn_default();

        monitor.emit_event(path("/a"), None, EventKind::Unmounted);
        settle().await;
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::Unmounted]);
    }

    // ------------------------------------------------------------------
    // Rate limit configuration
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_set_rate_limit_notifies_subscribers_once() {
        let (monitor, _rx) = spawn_default();
        let mut state_rx = monitor.subscribe();

        monitor.set_rate_limit(400);
        assert!(state_rx.has_changed().unwrap());
        assert_eq!(
            state_rx.borrow_and_update().rate_limit,
            Duration::from_millis(400)
        );

        // Same value again: no notification.
        monitor.set_rate_limit(400);
        assert!(!state_rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_rate_limit_applies_to_future_decisions() {
        let (monitor, mut rx) = spawn_default();
        let p = path("/a");

        monitor.emit_event(p.clone(), None, EventKind::Changed); // t = 0
        settle().await;
        drain(&mut rx);

        monitor.set_rate_limit(100);
        settle().await;

        // t = 50 is inside the new 100ms window: suppressed, with the
        // delayed delivery due at t = 100 rather than t = 800.
        advance_ms(50).await;
        monitor.emit_event(p.clone(), None, EventKind::Changed);
        settle().await;
        assert!(drain(&mut rx).is_empty());

        advance_ms(100).await; // t = 150
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::Changed]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_limit_disables_debounce() {
        let (monitor, mut rx) = Monitor::spawn(
            Arc::new(NoopBackend),
            MonitorConfig {
                rate_limit_ms: 0,
                ..MonitorConfig::default()
            },
        );
        let p = path("/a");

        monitor.emit_event(p.clone(), None, EventKind::Changed);
        monitor.emit_event(p.clone(), None, EventKind::Changed);
        settle().await;

        assert_eq!(
            kinds(&drain(&mut rx)),
            vec![EventKind::Changed, EventKind::Changed]
        );
    }

    // ------------------------------------------------------------------
    // Cancellation
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_backend_exactly_once() {
        let backend = CountingBackend::new();
        let (monitor, _rx) = Monitor::spawn(backend.clone(), config());

        assert!(!monitor.is_cancelled());
        assert!(monitor.cancel(), "first cancel performs the transition");
        assert!(!monitor.cancel(), "second cancel finds it done");
        assert!(monitor.is_cancelled());
        assert_eq!(backend.stop_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cancel_is_idempotent() {
        let backend = CountingBackend::new();
        let (monitor, _rx) = Monitor::spawn(backend.clone(), config());
        let monitor = Arc::new(monitor);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let monitor = Arc::clone(&monitor);
            handles.push(tokio::spawn(async move { monitor.cancel() }));
        }

        let mut transitions = 0;
        for handle in handles {
            if handle.await.unwrap() {
                transitions += 1;
            }
        }

        assert_eq!(transitions, 1, "exactly one call performs the transition");
        assert_eq!(backend.stop_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_notifies_subscribers() {
        let (monitor, _rx) = spawn_default();
        let mut state_rx = monitor.subscribe();

        monitor.cancel();
        assert!(state_rx.has_changed().unwrap());
        assert!(state_rx.borrow_and_update().cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_emit_after_cancel_is_dropped() {
        let (monitor, mut rx) = spawn_default();
        monitor.cancel();

        monitor.emit_event(path("/a"), None, EventKind::Changed);
        settle().await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_implicitly() {
        let backend = CountingBackend::new();
        let (monitor, _rx) = Monitor::spawn(backend.clone(), config());

        drop(monitor);
        assert_eq!(backend.stop_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_deliveries_survive_cancellation() {
        let (monitor, mut rx) = spawn_default();

        monitor.emit_event(path("/a"), None, EventKind::Changed);
        settle().await;
        monitor.cancel();

        // The decision predates cancellation; the delivery still runs.
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::Changed]);
    }
}
