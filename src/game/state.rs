use super::HistoryEntry;
use super::Phase;
use super::Player;
use super::Proposal;
use super::Summary;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

/// First proposal number allocated in a fresh game.
pub const FIRST_PROPOSAL_NUMBER: u64 = 301;
/// Baseline subtracted from a proposal's number when scoring a pass.
pub const POINT_BASELINE: u64 = 291;
/// Score at which a player wins the game.
pub const WINNING_SCORE: i64 = 100;
/// Flat award to each dissenter when a proposal passes non-unanimously.
pub const DISSENT_AWARD: i64 = 10;
/// Flat penalty to the proposer when a proposal is defeated.
pub const DEFEAT_PENALTY: i64 = 10;
/// After this many complete circuits, unanimity relaxes to simple majority.
pub const MAJORITY_AFTER_CIRCUITS: u32 = 2;

/// The root aggregate: players in fixed rotation order, the turn pointer,
/// the single pending proposal, and the archival history.
///
/// Pure data plus derived queries. All mutation beyond `advance_turn` lives
/// in the engine, which owns the only live instance; everything else sees
/// serialized snapshots. Field names are the on-disk schema and must stay
/// stable so saved games survive restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    #[serde(default)]
    pub current_turn_index: usize,
    #[serde(default = "first_proposal_number")]
    pub next_proposal_number: u64,
    #[serde(default)]
    pub pending_pr: Option<Proposal>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub game_started: bool,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub turn_phase: Phase,
    #[serde(default)]
    pub circuits_completed: u32,
}

fn first_proposal_number() -> u64 {
    FIRST_PROPOSAL_NUMBER
}

impl GameState {
    /// Fresh game from a roster; turn order is roster order, fixed for the
    /// whole game.
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            players,
            current_turn_index: 0,
            next_proposal_number: FIRST_PROPOSAL_NUMBER,
            pending_pr: None,
            history: Vec::new(),
            game_started: true,
            winner: None,
            turn_phase: Phase::Waiting,
            circuits_completed: 0,
        }
    }

    /// The player whose turn it is, if any players exist.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_turn_index)
    }

    pub fn get_player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn get_player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    /// Moves the turn pointer to the next player, counting a completed
    /// circuit exactly when the pointer wraps back to the first seat.
    /// Unconditionally clears pending state, so it doubles as the
    /// abandonment path for timed-out or forfeited turns.
    pub fn advance_turn(&mut self) {
        if self.players.is_empty() {
            return;
        }
        self.current_turn_index = (self.current_turn_index + 1) % self.players.len();
        if self.current_turn_index == 0 {
            self.circuits_completed += 1;
        }
        self.turn_phase = Phase::Waiting;
        self.pending_pr = None;
    }

    /// True once the quorum regime has relaxed from unanimity to majority.
    pub fn majority_voting(&self) -> bool {
        self.circuits_completed >= MAJORITY_AFTER_CIRCUITS
    }

    /// Uniform six-sided die. Part of the rules surface, unused by the
    /// transition logic itself.
    pub fn roll_die(&self) -> u8 {
        rand::rng().random_range(1..=6)
    }

    /// Points for a successful proposal:
    /// `round((proposal_number - 291) * favorable / total)`, 0 when no
    /// votes were cast. Rounding is `f64::round`, half away from zero.
    pub fn calculate_points(&self, proposal_number: u64, favorable: usize, total: usize) -> i64 {
        if total == 0 {
            return 0;
        }
        let base = proposal_number as f64 - POINT_BASELINE as f64;
        let fraction = favorable as f64 / total as f64;
        (base * fraction).round() as i64
    }

    /// First player in rotation order with a winning score, if any.
    /// Sets the terminal winner marker as a side effect; first-in-list
    /// tie-break is deliberate.
    pub fn check_winner(&mut self) -> Option<String> {
        for p in &self.players {
            if p.score >= WINNING_SCORE {
                self.winner = Some(p.name.clone());
                return self.winner.clone();
            }
        }
        None
    }

    pub fn summary(&self) -> Summary {
        Summary {
            players: self.players.clone(),
            current_player: self.current_player().cloned(),
            turn_phase: self.turn_phase,
            next_proposal_number: self.next_proposal_number,
            pending_pr: self.pending_pr.clone(),
            game_started: self.game_started,
            winner: self.winner.clone(),
            history_length: self.history.len(),
            circuits_completed: self.circuits_completed,
            majority_voting: self.majority_voting(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_players() -> GameState {
        GameState::new(vec![
            Player::new("alice", "http://ai-1:6001"),
            Player::new("bob", "http://ai-2:6002"),
            Player::new("carol", "http://ai-3:6003"),
        ])
    }

    #[test]
    fn points_for_proposal_301_three_of_four() {
        let state = three_players();
        assert_eq!(state.calculate_points(301, 3, 4), 8);
    }

    #[test]
    fn points_round_half_away_from_zero() {
        let state = three_players();
        // 10 * 0.25 = 2.5; banker's rounding would give 2
        assert_eq!(state.calculate_points(301, 1, 4), 3);
    }

    #[test]
    fn points_zero_when_no_votes() {
        let state = three_players();
        assert_eq!(state.calculate_points(301, 0, 0), 0);
    }

    #[test]
    fn points_scale_with_proposal_number() {
        let state = three_players();
        assert_eq!(state.calculate_points(311, 2, 2), 20);
        assert_eq!(state.calculate_points(292, 1, 3), 0); // round(0.333)
    }

    #[test]
    fn turn_wraps_and_counts_circuits_exactly_on_wrap() {
        let mut state = three_players();
        state.advance_turn();
        state.advance_turn();
        assert_eq!(state.current_turn_index, 2);
        assert_eq!(state.circuits_completed, 0);
        state.advance_turn();
        assert_eq!(state.current_turn_index, 0);
        assert_eq!(state.circuits_completed, 1);
        state.advance_turn();
        assert_eq!(state.circuits_completed, 1);
    }

    #[test]
    fn advance_turn_clears_pending_state() {
        let mut state = three_players();
        state.pending_pr = Some(Proposal::new(301, "alice", "rule", "", "nomic/301"));
        state.turn_phase = Phase::Voting;
        state.advance_turn();
        assert!(state.pending_pr.is_none());
        assert_eq!(state.turn_phase, Phase::Waiting);
    }

    #[test]
    fn winner_tie_breaks_to_first_in_rotation_order() {
        let mut state = three_players();
        state.players[1].score = 120;
        state.players[2].score = 150;
        assert_eq!(state.check_winner().as_deref(), Some("bob"));
        assert_eq!(state.winner.as_deref(), Some("bob"));
    }

    #[test]
    fn no_winner_below_threshold() {
        let mut state = three_players();
        state.players[0].score = 99;
        assert!(state.check_winner().is_none());
        assert!(state.winner.is_none());
    }

    #[test]
    fn die_rolls_stay_in_range() {
        let state = three_players();
        for _ in 0..100 {
            let roll = state.roll_die();
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn majority_voting_after_two_circuits() {
        let mut state = three_players();
        assert!(!state.majority_voting());
        state.circuits_completed = 2;
        assert!(state.majority_voting());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = three_players();
        state.pending_pr = Some(Proposal::new(301, "alice", "rule", "diff text", "nomic/301"));
        state.turn_phase = Phase::Voting;
        state.history.push(HistoryEntry {
            turn_number: 1,
            proposer: "alice".to_string(),
            proposal_id: 300,
            description: "earlier rule".to_string(),
            votes: [("alice".to_string(), true)].into(),
            passed: true,
            points_awarded: 9,
        });
        let encoded = serde_json::to_string_pretty(&state).unwrap();
        let decoded: GameState = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.players, state.players);
        assert_eq!(decoded.pending_pr, state.pending_pr);
        assert_eq!(decoded.history, state.history);
        assert_eq!(decoded.turn_phase, state.turn_phase);
        assert_eq!(decoded.next_proposal_number, state.next_proposal_number);
        assert_eq!(decoded.circuits_completed, state.circuits_completed);
    }
}
