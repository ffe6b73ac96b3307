use super::Phase;
use super::Player;
use super::Proposal;
use serde::Serialize;

/// Read-only snapshot of the game for API responses, per-turn snapshots,
/// and outbound player payloads. Never hands out the live state.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub players: Vec<Player>,
    pub current_player: Option<Player>,
    pub turn_phase: Phase,
    pub next_proposal_number: u64,
    pub pending_pr: Option<Proposal>,
    pub game_started: bool,
    pub winner: Option<String>,
    pub history_length: usize,
    pub circuits_completed: u32,
    pub majority_voting: bool,
}
