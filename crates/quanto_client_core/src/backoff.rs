use std::time::{Duration, Instant};
use flutter_rust_bridge::frb;

/// Delay schedule applied after consecutive failed rate refreshes.
const RATES_SCHEDULE_SECS: [u64; 6] = [2, 5, 10, 30, 60, 120];

#[frb(ignore)]
#[derive(Clone, Debug)]
pub(crate) struct Backoff {
    schedule: Vec<Duration>,
    failures: usize,
    next_allowed_at: Option<Instant>,
}

impl Backoff {
    pub(crate) fn new(schedule: Vec<Duration>) -> Self {
        Self {
            schedule,
            failures: 0,
            next_allowed_at: None,
        }
    }

    pub(crate) fn for_rates() -> Self {
        Self::new(RATES_SCHEDULE_SECS.iter().map(|s| Duration::from_secs(*s)).collect())
    }

    pub(crate) fn can_attempt_at(&self, now: Instant) -> bool {
        self.next_allowed_at.map_or(true, |at| now >= at)
    }

    pub(crate) fn can_attempt(&self) -> bool {
        self.can_attempt_at(Instant::now())
    }

    /// Records a failure and returns the delay before the next attempt.
    /// The last step of the schedule repeats.
    pub(crate) fn on_failure_at(&mut self, now: Instant) -> Duration {
        let step = self.failures.min(self.schedule.len().saturating_sub(1));
        let delay = self
            .schedule
            .get(step)
            .copied()
            .unwrap_or_else(|| Duration::from_secs(1));
        self.failures += 1;
        self.next_allowed_at = Some(now + delay);
        delay
    }

    pub(crate) fn on_failure(&mut self) -> Duration {
        self.on_failure_at(Instant::now())
    }

    pub(crate) fn reset(&mut self) {
        self.failures = 0;
        self.next_allowed_at = None;
    }

    pub(crate) fn failures(&self) -> usize {
        self.failures
    }

    pub(crate) fn remaining(&self) -> Option<Duration> {
        self.next_allowed_at
            .and_then(|at| at.checked_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_advances_and_saturates() {
        let mut b = Backoff::new(vec![Duration::from_secs(1), Duration::from_secs(3)]);
        let now = Instant::now();
        assert_eq!(b.on_failure_at(now), Duration::from_secs(1));
        assert_eq!(b.on_failure_at(now), Duration::from_secs(3));
        assert_eq!(b.on_failure_at(now), Duration::from_secs(3));
        assert_eq!(b.failures(), 3);
    }

    #[test]
    fn blocks_until_delay_elapses() {
        let mut b = Backoff::for_rates();
        let now = Instant::now();
        assert!(b.can_attempt_at(now));
        b.on_failure_at(now);
        assert!(!b.can_attempt_at(now + Duration::from_secs(1)));
        assert!(b.can_attempt_at(now + Duration::from_secs(2)));
    }

    #[test]
    fn reset_clears_window() {
        let mut b = Backoff::for_rates();
        b.on_failure();
        assert!(!b.can_attempt());
        assert!(b.remaining().is_some());
        b.reset();
        assert!(b.can_attempt());
        assert_eq!(b.failures(), 0);
    }

    #[test]
    fn empty_schedule_falls_back_to_one_second() {
        let mut b = Backoff::new(Vec::new());
        assert_eq!(b.on_failure_at(Instant::now()), Duration::from_secs(1));
    }
}
