use super::HistoryEntry;
use super::Phase;
use super::Proposal;
use super::Resolution;
use super::Summary;
use super::DEFEAT_PENALTY;
use super::DISSENT_AWARD;
use super::GameState;
use crate::save::Store;

/// The single authority over the game state machine.
///
/// Owns the only live `GameState` and the store it persists to. Every
/// successful transition is flushed to the state document before it is
/// visible in memory: mutations are staged on a copy, saved, and only then
/// committed, so a failed write can never leave memory ahead of disk.
///
/// Rejected transitions (wrong phase, wrong actor, unknown voter) come back
/// as `None`/`false`, never as errors; errors are reserved for persistence
/// failures.
pub struct Engine {
    state: GameState,
    store: Store,
}

impl Engine {
    pub fn new(state: GameState, store: Store) -> Self {
        Self { state, store }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn summary(&self) -> Summary {
        self.state.summary()
    }

    /// Writes a per-turn snapshot alongside the state document.
    pub fn snapshot(&self) -> anyhow::Result<std::path::PathBuf> {
        self.store.snapshot(&self.state.summary())
    }

    /// Saves the staged state, then commits it. The commit point.
    fn commit(&mut self, next: GameState) -> anyhow::Result<()> {
        self.store.save(&next)?;
        self.state = next;
        Ok(())
    }

    /// waiting → proposal, taken when the current player has been
    /// successfully triggered. Returns false (and stays put) in any other
    /// phase, which makes scheduler retries idempotent.
    pub fn begin_proposal(&mut self) -> anyhow::Result<bool> {
        if self.state.turn_phase != Phase::Waiting || self.state.winner.is_some() {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.turn_phase = Phase::Proposal;
        self.commit(next)?;
        Ok(true)
    }

    /// Accepts a proposal from the current player during the proposal phase.
    /// Allocates the next proposal number, seeds the proposer's yes vote,
    /// and opens voting. Returns the allocated id, or None on rejection.
    pub fn submit_proposal(
        &mut self,
        proposer: &str,
        description: &str,
        diff: &str,
        branch: &str,
    ) -> anyhow::Result<Option<u64>> {
        match self.state.current_player() {
            Some(current) if current.name == proposer => {}
            _ => return Ok(None),
        }
        if self.state.turn_phase != Phase::Proposal {
            return Ok(None);
        }
        let mut next = self.state.clone();
        let id = next.next_proposal_number;
        next.next_proposal_number += 1;
        next.pending_pr = Some(Proposal::new(id, proposer, description, diff, branch));
        next.turn_phase = Phase::Voting;
        self.commit(next)?;
        Ok(Some(id))
    }

    /// Records a vote on the pending proposal. Re-voting overwrites.
    /// Rejected when there is no pending proposal, voting is closed, or the
    /// voter is not on the roster.
    pub fn submit_vote(&mut self, voter: &str, vote: bool) -> anyhow::Result<bool> {
        if self.state.pending_pr.is_none() {
            return Ok(false);
        }
        if self.state.turn_phase != Phase::Voting {
            return Ok(false);
        }
        if self.state.get_player(voter).is_none() {
            return Ok(false);
        }
        let mut next = self.state.clone();
        if let Some(pr) = next.pending_pr.as_mut() {
            pr.cast(voter, vote);
        }
        self.commit(next)?;
        Ok(true)
    }

    /// True iff every player currently on the roster has a vote recorded.
    /// Checked against the live roster, not a snapshot taken at proposal
    /// time; a roster change mid-vote shifts the quorum requirement.
    pub fn all_votes_in(&self) -> bool {
        match &self.state.pending_pr {
            None => false,
            Some(pr) => self.state.players.iter().all(|p| pr.votes.contains_key(&p.name)),
        }
    }

    /// Tallies and settles the pending vote once every player has voted.
    ///
    /// Quorum is unanimity for the first two circuits, then strict majority.
    /// A pass awards the proposer `calculate_points`, plus a flat award to
    /// each dissenter when the pass was not unanimous. A defeat costs the
    /// proposer a flat penalty, recorded in history as -10 regardless of
    /// any future coupling between penalty and vote shape.
    pub fn resolve_vote(&mut self) -> anyhow::Result<Option<Resolution>> {
        if !self.all_votes_in() {
            return Ok(None);
        }
        let mut next = self.state.clone();
        let pr = match next.pending_pr.clone() {
            Some(pr) => pr,
            None => return Ok(None),
        };
        let favorable = pr.favorable();
        let total = pr.total();
        let passed = if next.majority_voting() {
            favorable * 2 > total
        } else {
            pr.unanimous()
        };
        if next.get_player(&pr.proposer).is_none() {
            return Ok(None);
        }
        let mut points = 0;
        if passed {
            points = next.calculate_points(pr.id, favorable, total);
            if let Some(proposer) = next.get_player_mut(&pr.proposer) {
                proposer.score += points;
            }
            if !pr.unanimous() {
                for name in pr.dissenters().map(str::to_string).collect::<Vec<_>>() {
                    if let Some(dissenter) = next.get_player_mut(&name) {
                        dissenter.score += DISSENT_AWARD;
                    }
                }
            }
        } else if let Some(proposer) = next.get_player_mut(&pr.proposer) {
            proposer.score -= DEFEAT_PENALTY;
        }
        let awarded = if passed { points } else { -DEFEAT_PENALTY };
        next.history.push(HistoryEntry {
            turn_number: next.history.len() + 1,
            proposer: pr.proposer.clone(),
            proposal_id: pr.id,
            description: pr.description.clone(),
            votes: pr.votes.clone(),
            passed,
            points_awarded: awarded,
        });
        let winner = next.check_winner();
        next.turn_phase = Phase::Completed;
        let resolution = Resolution {
            passed,
            points: awarded,
            votes: pr.votes.clone(),
            proposal_id: pr.id,
            branch: passed.then(|| pr.branch.clone()),
            winner,
            test_failure: None,
        };
        self.commit(next)?;
        Ok(Some(resolution))
    }

    /// Ends the turn: advances the rotation pointer, counts circuits on
    /// wrap, clears pending state, and reopens the waiting phase. Valid
    /// from any phase so timeouts and forfeits can short-circuit a turn
    /// that never produced a proposal or resolution.
    pub fn complete_turn(&mut self) -> anyhow::Result<()> {
        let mut next = self.state.clone();
        next.advance_turn();
        self.commit(next)
    }
}
