//! Frame-clock timers.

/// Coalesces bursts of triggers into one trailing call.
///
/// Every trigger pushes the deadline back, so the call runs once after a
/// quiet period. The owner polls it against the grid clock every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debounce {
    delay: f32,
    deadline: Option<f32>,
}

impl Debounce {
    /// Create a debounce with `delay` in seconds. Negative delays act as zero.
    pub fn new(delay: f32) -> Self {
        Self {
            delay: delay.max(0.0),
            deadline: None,
        }
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Arm the timer, or push an armed one back.
    ///
    /// Returns `true` when the call should run right away, which only
    /// happens with a zero delay.
    pub fn trigger(&mut self, now: f32) -> bool {
        if self.delay <= 0.0 {
            return true;
        }
        self.deadline = Some(now + self.delay);
        false
    }

    /// Fire the timer if it is due.
    pub fn poll(&mut self, now: f32) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm the timer, returning whether it was armed. Callers that need
    /// the pending call to run now invoke it when this returns `true`.
    pub fn finish(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_fires_once() {
        let mut debounce = Debounce::new(0.1);
        assert!(!debounce.trigger(0.0));
        assert!(!debounce.trigger(0.05));
        assert!(!debounce.poll(0.1));
        assert!(debounce.poll(0.2));
        assert!(!debounce.poll(0.3));
    }

    #[test]
    fn test_zero_delay_runs_immediately() {
        let mut debounce = Debounce::new(0.0);
        assert!(debounce.trigger(1.0));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_finish_and_cancel() {
        let mut debounce = Debounce::new(0.1);
        debounce.trigger(0.0);
        assert!(debounce.finish());
        assert!(!debounce.finish());

        debounce.trigger(0.0);
        debounce.cancel();
        assert!(!debounce.poll(10.0));
    }
}
