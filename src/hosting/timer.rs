use std::time::Duration;
use tokio::time::Instant;

/// Default window for the current player to submit a proposal.
pub const PROPOSAL_TIMEOUT: Duration = Duration::from_secs(1200);

/// Deadline tracking for the proposal-submission window.
///
/// Armed when the scheduler moves a turn into the proposal phase, cleared
/// when the turn resolves or is abandoned. Expiry is judged purely on
/// wall-clock elapsed time since the phase was entered.
#[derive(Debug)]
pub struct Timer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }
    pub fn with_defaults() -> Self {
        Self::new(PROPOSAL_TIMEOUT)
    }
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }
    pub fn clear(&mut self) {
        self.deadline = None;
    }
    pub fn armed(&self) -> bool {
        self.deadline.is_some()
    }
    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_starts_cleared() {
        let timer = Timer::with_defaults();
        assert!(!timer.armed());
        assert!(!timer.expired());
        assert!(timer.remaining().is_none());
    }

    #[test]
    fn armed_timer_holds_until_deadline() {
        let mut timer = Timer::new(Duration::from_secs(60));
        timer.arm();
        assert!(timer.armed());
        assert!(!timer.expired());
        assert!(timer.remaining().unwrap() <= Duration::from_secs(60));
    }

    #[test]
    fn zero_window_expires_immediately() {
        let mut timer = Timer::new(Duration::ZERO);
        timer.arm();
        assert!(timer.expired());
        timer.clear();
        assert!(!timer.expired());
    }
}
