use super::Players;
use super::Workspace;
use crate::game::Engine;
use crate::game::Phase;
use crate::game::Player;
use crate::game::Resolution;
use crate::game::Summary;
use tokio::sync::Mutex;

/// How a vote submission landed.
pub enum VoteOutcome {
    /// Rejected with a reason the caller surfaces as a 400.
    Rejected(&'static str),
    /// Recorded; the tally is still open.
    Recorded,
    /// Recorded as the final vote; the proposal resolved synchronously.
    Resolved(Resolution),
}

/// The process-boundary authority over one game.
///
/// Owns the engine behind a single mutex and the collaborator handles
/// around it. All state transitions happen under the lock; outbound calls
/// (player fan-out, git operations) happen strictly after it is released,
/// so a slow player endpoint can never wedge the game.
pub struct Arbiter {
    engine: Mutex<Engine>,
    players: Players,
    workspace: Workspace,
}

impl Arbiter {
    pub fn new(engine: Engine, players: Players, workspace: Workspace) -> Self {
        Self {
            engine: Mutex::new(engine),
            players,
            workspace,
        }
    }

    pub async fn summary(&self) -> Summary {
        self.engine.lock().await.summary()
    }

    pub async fn winner(&self) -> Option<String> {
        self.engine.lock().await.state().winner.clone()
    }

    /// Receives a proposal: pulls the branch diff from the workspace, runs
    /// the engine transition, and on acceptance fans vote requests out to
    /// the other players off-lock.
    pub async fn submit_proposal(
        &self,
        proposer: &str,
        description: &str,
        branch: &str,
    ) -> anyhow::Result<Option<u64>> {
        let diff = match self.workspace.diff(branch).await {
            Ok(diff) => diff,
            Err(e) => {
                log::warn!("could not read diff for {}: {}", branch, e);
                String::new()
            }
        };
        let fanout = {
            let mut engine = self.engine.lock().await;
            match engine.submit_proposal(proposer, description, &diff, branch)? {
                None => return Ok(None),
                Some(id) => {
                    let state = engine.state();
                    let pr = state.pending_pr.clone();
                    (id, state.players.clone(), pr, engine.summary())
                }
            }
        };
        let (id, roster, pr, summary) = fanout;
        if let Some(pr) = pr {
            let players = self.players.clone();
            tokio::spawn(async move {
                players.trigger_votes(&roster, &pr, &summary).await;
            });
        }
        Ok(Some(id))
    }

    /// Receives a vote. When the tally completes, resolves synchronously:
    /// a passed proposal is verified and merged (off-lock), then the turn
    /// advances. A verification failure is reported as a failed outcome and
    /// the merge is skipped; scores already settled stand.
    pub async fn submit_vote(
        &self,
        proposal_id: u64,
        voter: &str,
        vote: bool,
    ) -> anyhow::Result<VoteOutcome> {
        let resolution = {
            let mut engine = self.engine.lock().await;
            match &engine.state().pending_pr {
                Some(pr) if pr.id == proposal_id => {}
                _ => return Ok(VoteOutcome::Rejected("no matching pending proposal")),
            }
            if !engine.submit_vote(voter, vote)? {
                return Ok(VoteOutcome::Rejected("invalid vote"));
            }
            log::info!(
                "vote received: {} voted {} on proposal {}",
                voter,
                if vote { "YES" } else { "NO" },
                proposal_id
            );
            if !engine.all_votes_in() {
                return Ok(VoteOutcome::Recorded);
            }
            engine.resolve_vote()?
        };
        let mut resolution = match resolution {
            Some(resolution) => resolution,
            None => return Ok(VoteOutcome::Recorded),
        };
        log::info!(
            "vote resolved: proposal {} {}",
            resolution.proposal_id,
            if resolution.passed { "PASSED" } else { "FAILED" }
        );
        // phase is completed here, so no transition can interleave while
        // the lock is released for collaborator side effects
        if let Some(branch) = resolution.branch.clone() {
            self.land(&mut resolution, &branch).await;
        }
        self.finish_turn().await?;
        Ok(VoteOutcome::Resolved(resolution))
    }

    /// Advances the turn after a resolution. Guarded on the completed
    /// phase: a forfeit arriving while the lock was released for side
    /// effects has already advanced the turn, and advancing again would
    /// skip a player.
    async fn finish_turn(&self) -> anyhow::Result<()> {
        let mut engine = self.engine.lock().await;
        if engine.state().turn_phase == Phase::Completed {
            engine.complete_turn()?;
        }
        Ok(())
    }

    /// Verification and merge side effects for a passed proposal.
    async fn land(&self, resolution: &mut Resolution, branch: &str) {
        match self.workspace.verify(branch).await {
            Ok(None) => {}
            Ok(Some(failure)) => {
                log::warn!(
                    "tests failed for proposal {}: {}",
                    resolution.proposal_id,
                    failure
                );
                resolution.passed = false;
                resolution.branch = None;
                resolution.test_failure = Some(failure);
                return;
            }
            Err(e) => {
                log::error!("could not verify {}: {}", branch, e);
                return;
            }
        }
        match self.workspace.merge(branch, resolution.proposal_id).await {
            Ok(()) => {
                let roster = self.engine.lock().await.state().players.clone();
                let players = self.players.clone();
                tokio::spawn(async move {
                    players.notify_pull(&roster).await;
                });
            }
            Err(e) => log::error!("failed to merge branch {}: {}", branch, e),
        }
    }

    /// Explicit forfeiture: unconditionally advances the turn and reports
    /// the next player.
    pub async fn turn_failed(&self, player: &str, reason: &str) -> anyhow::Result<Option<Player>> {
        log::warn!("turn failed for {}: {}", player, reason);
        let mut engine = self.engine.lock().await;
        engine.complete_turn()?;
        Ok(engine.state().current_player().cloned())
    }

    /// Scheduler entry: snapshots and triggers the current player, and only
    /// on a successful trigger moves the turn into the proposal phase.
    /// Returns true when the phase advanced; false leaves the waiting phase
    /// intact for a retry on the next tick.
    pub async fn trigger_turn(&self) -> anyhow::Result<bool> {
        let (player, summary) = {
            let engine = self.engine.lock().await;
            if engine.state().turn_phase != Phase::Waiting {
                return Ok(false);
            }
            let player = match engine.state().current_player() {
                Some(player) => player.clone(),
                None => return Ok(false),
            };
            if let Err(e) = engine.snapshot() {
                log::warn!("could not write turn snapshot: {}", e);
            }
            (player, engine.summary())
        };
        log::info!("triggering turn for {}", player.name);
        match self.players.trigger_turn(&player, &summary).await {
            Ok(()) => self.engine.lock().await.begin_proposal(),
            Err(e) => {
                log::warn!("failed to trigger turn for {}: {}", player.name, e);
                Ok(false)
            }
        }
    }

    /// Timeout path: abandons a turn stuck in the proposal phase. Guarded
    /// by the phase check so a late firing against an already-advanced turn
    /// is a no-op.
    pub async fn force_advance(&self) -> anyhow::Result<bool> {
        let mut engine = self.engine.lock().await;
        if engine.state().turn_phase != Phase::Proposal {
            return Ok(false);
        }
        if let Some(player) = engine.state().current_player() {
            log::warn!("proposal timeout for {}, skipping turn", player.name);
        }
        engine.complete_turn()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use crate::save::Store;

    fn scratch(test: &str) -> Store {
        let dir =
            std::env::temp_dir().join(format!("nomic-arbiter-{}-{}", test, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::remove_file(dir.join("state.json")).ok();
        Store::new(dir.join("state.json"), dir.join("config.json"))
    }

    fn arbiter(test: &str) -> Arbiter {
        let state = GameState::new(vec![
            Player::new("alice", "http://ai-1:6001"),
            Player::new("bob", "http://ai-2:6002"),
        ]);
        Arbiter::new(
            Engine::new(state, scratch(test)),
            Players::default(),
            Workspace::new(std::env::temp_dir(), None),
        )
    }

    #[tokio::test]
    async fn finish_turn_is_a_noop_when_turn_already_advanced() {
        let arbiter = arbiter("finish");
        // an unconditional forfeit lands while resolution side effects are
        // running off-lock; the post-resolution advance must not compound
        let next = arbiter.turn_failed("alice", "no changes").await.unwrap();
        assert_eq!(next.unwrap().name, "bob");
        arbiter.finish_turn().await.unwrap();
        let summary = arbiter.summary().await;
        assert_eq!(summary.current_player.unwrap().name, "bob");
        assert_eq!(summary.turn_phase, Phase::Waiting);
    }

    #[tokio::test]
    async fn force_advance_only_applies_to_proposal_phase() {
        let arbiter = arbiter("timeout");
        assert!(!arbiter.force_advance().await.unwrap());
        assert_eq!(
            arbiter.summary().await.current_player.unwrap().name,
            "alice"
        );
    }
}
