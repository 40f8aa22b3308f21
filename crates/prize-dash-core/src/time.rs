/// Milliseconds on the session clock. The host picks the epoch; the core only
/// ever compares and subtracts these values.
pub type Millis = u64;

/// A repeating task on the session clock.
///
/// Missed periods are skipped rather than replayed, so a host that wakes late
/// sees a single firing and the next deadline lands on the original grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatingTimer {
    period: Millis,
    next_due: Option<Millis>,
}

impl RepeatingTimer {
    pub fn new(period: Millis) -> Self {
        Self {
            period: period.max(1),
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Millis) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.next_due
    }

    /// Returns true if the task is due at `now`, advancing to the next slot.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let missed = (now - due) / self.period;
                self.next_due = Some(due + (missed + 1) * self.period);
                true
            },
            _ => false,
        }
    }
}

/// A single delayed task on the session clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShotTimer {
    due: Option<Millis>,
}

impl OneShotTimer {
    pub fn arm(&mut self, now: Millis, delay: Millis) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn due(&self) -> Option<Millis> {
        self.due
    }

    /// Returns true exactly once, when `now` reaches the deadline.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            },
            _ => false,
        }
    }
}
