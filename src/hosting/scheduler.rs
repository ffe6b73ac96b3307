use super::Arbiter;
use super::Timer;
use crate::game::Phase;
use std::sync::Arc;
use std::time::Duration;

/// Polling interval of the background game loop.
pub const TICK: Duration = Duration::from_secs(5);

/// Background game loop.
///
/// On each tick: triggers the current player when the game is waiting, and
/// force-advances a turn whose proposal window has expired. A failed trigger
/// leaves the phase untouched so the next tick retries; the loop exits once
/// a winner is set.
pub struct Scheduler {
    arbiter: Arc<Arbiter>,
    timer: Timer,
    tick: Duration,
}

impl Scheduler {
    pub fn new(arbiter: Arc<Arbiter>, timer: Timer) -> Self {
        Self {
            arbiter,
            timer,
            tick: TICK,
        }
    }

    pub async fn run(mut self) {
        log::info!("game loop starting");
        loop {
            if let Some(winner) = self.arbiter.winner().await {
                log::info!("game over, winner: {}", winner);
                break;
            }
            self.step().await;
            tokio::time::sleep(self.tick).await;
        }
    }

    async fn step(&mut self) {
        match self.arbiter.summary().await.turn_phase {
            Phase::Waiting => {
                self.timer.clear();
                match self.arbiter.trigger_turn().await {
                    Ok(true) => self.timer.arm(),
                    Ok(false) => {}
                    Err(e) => log::error!("turn trigger failed: {}", e),
                }
            }
            Phase::Proposal if self.timer.expired() => {
                match self.arbiter.force_advance().await {
                    Ok(_) => self.timer.clear(),
                    Err(e) => log::error!("forced advance failed: {}", e),
                }
            }
            Phase::Proposal if !self.timer.armed() => {
                // restart recovery: we woke up mid-proposal with no
                // deadline on record, so grant a fresh window
                self.timer.arm();
            }
            _ => {}
        }
    }
}
