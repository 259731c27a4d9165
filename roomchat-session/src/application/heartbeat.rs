use instant::{Duration, Instant};

/// Schedules outgoing heartbeats for one room session
///
/// Poll-driven: the session asks `poll(now)` on every tick and publishes a
/// heartbeat when it returns `true`. Overdue beats are not replayed; at
/// most one fires per poll. Once stopped the driver never fires again.
#[derive(Debug)]
pub struct HeartbeatDriver {
    period: Duration,
    next_due: Option<Instant>,
    stopped: bool,
    beats: u64,
}

impl HeartbeatDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
            stopped: false,
            beats: 0,
        }
    }

    /// Arm the driver; the first beat is due one period after `now`
    pub fn start(&mut self, now: Instant) {
        if self.stopped {
            return;
        }
        self.next_due = Some(now + self.period);
    }

    /// Check whether a heartbeat is due at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let next = due + self.period;
        self.next_due = Some(if next > now { next } else { now + self.period });
        self.beats += 1;
        true
    }

    /// Cancel permanently
    pub fn stop(&mut self) {
        self.next_due = None;
        self.stopped = true;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn beats(&self) -> u64 {
        self.beats
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
