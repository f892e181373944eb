//! The coordinator state machine.
//!
//! [`ContentState`] holds every piece of state that persists across diff
//! cycles. It is owned by the delivery task and only ever mutated there;
//! the worker receives immutable [`Snapshot`]s.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// An immutable snapshot shared with the worker.
pub type Snapshot<S> = Arc<[S]>;

/// Observable phase of the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentPhase {
    /// Nothing pending.
    Idle,
    /// A diff is in flight for the latest request.
    Running,
    /// A diff is in flight but a newer request already arrived.
    RunningStale,
    /// A result is waiting for the minimum delivery interval to pass.
    Throttled,
}

impl std::fmt::Display for ContentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::RunningStale => "running-stale",
            Self::Throttled => "throttled",
        };
        write!(f, "{s}")
    }
}

/// What to do with a finished diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The result is stale; discard it and diff again.
    Restart,
    /// A deferred run is already scheduled; discard the result.
    Drop,
    /// Schedule a re-run after the given delay.
    Defer(Duration),
    /// Deliver the result now.
    Deliver,
}

/// Pending snapshots, flags and delivery timestamp of one coordinator.
#[derive(Debug)]
pub struct ContentState<S> {
    pending_old: Option<Snapshot<S>>,
    pending_new: Option<Snapshot<S>>,
    busy: bool,
    stale: bool,
    throttle_active: bool,
    last_delivery: Option<Instant>,
}

impl<S> Default for ContentState<S> {
    fn default() -> Self {
        Self {
            pending_old: None,
            pending_new: None,
            busy: false,
            stale: false,
            throttle_active: false,
            last_delivery: None,
        }
    }
}

impl<S> ContentState<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request. Returns `true` if a run should start now.
    ///
    /// The old snapshot is only adopted when the cycle has no baseline yet;
    /// the new snapshot always replaces the pending one. While busy the
    /// in-flight result is marked stale instead of starting a second run.
    pub fn submit(&mut self, old: Vec<S>, new: Vec<S>) -> bool {
        if self.pending_old.is_none() {
            self.pending_old = Some(old.into());
        }
        self.pending_new = Some(new.into());

        if self.busy {
            self.stale = true;
            return false;
        }
        true
    }

    /// Mark a run as started and hand out the snapshots to diff.
    ///
    /// Returns `None` (and leaves the state idle) if no complete pair is
    /// pending.
    pub fn begin_run(&mut self) -> Option<(Snapshot<S>, Snapshot<S>)> {
        let (Some(old), Some(new)) = (self.pending_old.clone(), self.pending_new.clone()) else {
            self.busy = false;
            return None;
        };
        self.busy = true;
        self.stale = false;
        Some((old, new))
    }

    /// Decide what to do with a finished diff.
    pub fn decide(&mut self, now: Instant, min_interval: Duration) -> Decision {
        if self.stale {
            return Decision::Restart;
        }
        if self.throttle_active {
            return Decision::Drop;
        }

        let allowed_in = self
            .last_delivery
            .map(|last| (last + min_interval).saturating_duration_since(now))
            .unwrap_or(Duration::ZERO);
        if allowed_in > Duration::ZERO {
            self.throttle_active = true;
            return Decision::Defer(allowed_in);
        }
        Decision::Deliver
    }

    /// The deferral timer fired; the caller re-runs the diff.
    pub fn throttle_elapsed(&mut self) {
        self.throttle_active = false;
    }

    /// Reset after a delivery.
    pub fn finish(&mut self, now: Instant) {
        self.pending_old = None;
        self.pending_new = None;
        self.last_delivery = Some(now);
        self.busy = false;
    }

    pub fn phase(&self) -> ContentPhase {
        if self.throttle_active {
            ContentPhase::Throttled
        } else if self.busy && self.stale {
            ContentPhase::RunningStale
        } else if self.busy {
            ContentPhase::Running
        } else {
            ContentPhase::Idle
        }
    }

    pub fn last_delivery(&self) -> Option<Instant> {
        self.last_delivery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(200);

    #[test]
    fn first_submit_starts_a_run() {
        let mut state = ContentState::new();
        assert_eq!(state.phase(), ContentPhase::Idle);
        assert!(state.submit(vec![1], vec![2]));

        let (old, new) = state.begin_run().unwrap();
        assert_eq!(&*old, &[1]);
        assert_eq!(&*new, &[2]);
        assert_eq!(state.phase(), ContentPhase::Running);
    }

    #[test]
    fn submit_while_busy_marks_stale_and_keeps_baseline() {
        let mut state = ContentState::new();
        state.submit(vec![0], vec![1]);
        state.begin_run();

        assert!(!state.submit(vec![1], vec![2]));
        assert_eq!(state.phase(), ContentPhase::RunningStale);
        assert_eq!(state.decide(Instant::now(), INTERVAL), Decision::Restart);

        let (old, new) = state.begin_run().unwrap();
        assert_eq!(&*old, &[0]);
        assert_eq!(&*new, &[2]);
        assert_eq!(state.phase(), ContentPhase::Running);
    }

    #[test]
    fn first_delivery_is_immediate() {
        let mut state = ContentState::new();
        state.submit(vec![0], vec![1]);
        state.begin_run();
        assert_eq!(state.decide(Instant::now(), INTERVAL), Decision::Deliver);
    }

    #[test]
    fn delivery_within_interval_is_deferred_not_dropped() {
        let t0 = Instant::now();
        let mut state = ContentState::new();
        state.submit(vec![0], vec![1]);
        state.begin_run();
        state.finish(t0);
        assert_eq!(state.phase(), ContentPhase::Idle);
        assert_eq!(state.last_delivery(), Some(t0));

        state.submit(vec![1], vec![2]);
        state.begin_run();
        let decision = state.decide(t0 + Duration::from_millis(50), INTERVAL);
        assert_eq!(decision, Decision::Defer(Duration::from_millis(150)));
        assert_eq!(state.phase(), ContentPhase::Throttled);

        // A result arriving while a deferred run is scheduled is dropped.
        assert_eq!(state.decide(t0 + Duration::from_millis(60), INTERVAL), Decision::Drop);

        state.throttle_elapsed();
        let (old, new) = state.begin_run().unwrap();
        assert_eq!(&*old, &[1]);
        assert_eq!(&*new, &[2]);
        assert_eq!(state.decide(t0 + INTERVAL, INTERVAL), Decision::Deliver);
    }

    #[test]
    fn stale_takes_priority_over_throttle() {
        let t0 = Instant::now();
        let mut state = ContentState::new();
        state.submit(vec![0], vec![1]);
        state.begin_run();
        state.finish(t0);

        state.submit(vec![1], vec![2]);
        state.begin_run();
        state.submit(vec![2], vec![3]);
        assert_eq!(state.decide(t0, INTERVAL), Decision::Restart);
    }

    #[test]
    fn finish_clears_pending_snapshots() {
        let mut state = ContentState::new();
        state.submit(vec![0], vec![1]);
        state.begin_run();
        state.finish(Instant::now());
        assert!(state.begin_run().is_none());
        assert_eq!(state.phase(), ContentPhase::Idle);
    }

    #[test]
    fn zero_interval_never_defers() {
        let t0 = Instant::now();
        let mut state = ContentState::new();
        state.submit(vec![0], vec![1]);
        state.begin_run();
        state.finish(t0);
        state.submit(vec![1], vec![2]);
        state.begin_run();
        assert_eq!(state.decide(t0, Duration::ZERO), Decision::Deliver);
    }
}
