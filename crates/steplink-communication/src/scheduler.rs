//! Cooperative timers
//!
//! The engine never sleeps or spawns. Callers pass the current instant and a
//! task reports whether it is due. Cancelling clears the deadline on the spot,
//! so a cancelled task can never fire afterwards.

use std::time::{Duration, Instant};

/// A repeating timer with a fixed interval
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTask {
    /// Create a disarmed task
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Current interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the task; the first firing is one interval after `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Change the interval, re-arming from `now` if the task is running
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.next_due.is_some() {
            self.start(now);
        }
    }

    /// Disarm the task
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Whether the task is armed
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Next deadline, if armed
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Returns true (once) if the deadline has passed, then schedules the next one
    ///
    /// Missed intervals are skipped rather than replayed in a burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let mut next = due + self.interval;
                if next <= now {
                    next = now + self.interval;
                }
                self.next_due = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// A single deferred action
#[derive(Debug, Clone, Default)]
pub struct OneShotTask {
    due: Option<Instant>,
}

impl OneShotTask {
    /// Create an unscheduled task
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule (or reschedule) the action `delay` after `now`
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    /// Drop the pending action
    pub fn cancel(&mut self) {
        self.due = None;
    }

    /// Whether an action is pending
    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Returns true (once) when the action is due
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_periodic_fires_each_interval() {
        let t0 = Instant::now();
        let mut task = PeriodicTask::new(10 * MS);
        assert!(!task.poll(t0 + 100 * MS));

        task.start(t0);
        assert!(!task.poll(t0 + 9 * MS));
        assert!(task.poll(t0 + 10 * MS));
        assert!(!task.poll(t0 + 15 * MS));
        assert!(task.poll(t0 + 20 * MS));
        assert_eq!(task.next_due(), Some(t0 + 30 * MS));
    }

    #[test]
    fn test_periodic_skips_missed_intervals() {
        let t0 = Instant::now();
        let mut task = PeriodicTask::new(10 * MS);
        task.start(t0);

        assert!(task.poll(t0 + 55 * MS));
        assert!(!task.poll(t0 + 56 * MS));
        assert_eq!(task.next_due(), Some(t0 + 65 * MS));
    }

    #[test]
    fn test_cancel_is_immediate() {
        let t0 = Instant::now();
        let mut task = PeriodicTask::new(10 * MS);
        task.start(t0);
        task.cancel();
        assert!(!task.is_armed());
        assert!(!task.poll(t0 + 1000 * MS));
    }

    #[test]
    fn test_set_interval_rearms_running_task() {
        let t0 = Instant::now();
        let mut task = PeriodicTask::new(10 * MS);
        task.set_interval(50 * MS, t0);
        assert!(!task.is_armed());

        task.start(t0);
        task.set_interval(30 * MS, t0 + 5 * MS);
        assert_eq!(task.next_due(), Some(t0 + 35 * MS));
    }

    #[test]
    fn test_one_shot() {
        let t0 = Instant::now();
        let mut task = OneShotTask::new();
        assert!(!task.poll(t0));

        task.schedule(t0, MS);
        assert!(task.is_pending());
        assert!(!task.poll(t0));
        assert!(task.poll(t0 + MS));
        assert!(!task.poll(t0 + 2 * MS));

        task.schedule(t0, MS);
        task.cancel();
        assert!(!task.poll(t0 + 10 * MS));
    }
}
