use crate::game::Player;
use crate::game::Proposal;
use crate::game::Summary;
use std::time::Duration;

/// Outbound fan-out to player endpoints.
///
/// Every call is best-effort with a short timeout: the state machine never
/// depends on a player actually answering. Failures are logged and either
/// retried by the scheduler (turn triggers) or dropped (notifications).
#[derive(Clone)]
pub struct Players {
    http: reqwest::Client,
}

impl Default for Players {
    fn default() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("build http client"),
        }
    }
}

impl Players {
    /// Asks the current player to take their turn. The caller only moves
    /// the phase forward when this returns Ok.
    pub async fn trigger_turn(&self, player: &Player, summary: &Summary) -> anyhow::Result<()> {
        let response = self
            .http
            .post(format!("{}/turn", player.endpoint_url))
            .json(&serde_json::json!({
                "player_name": player.name,
                "proposal_number": summary.next_proposal_number,
                "game_state": summary,
            }))
            .send()
            .await?;
        log::info!("triggered turn for {}: {}", player.name, response.status());
        Ok(())
    }

    /// Asks every non-proposing player to vote on the pending proposal.
    /// Purely best-effort; a player who never answers is handled by the
    /// proposal timeout, not here.
    pub async fn trigger_votes(&self, players: &[Player], pr: &Proposal, summary: &Summary) {
        for player in players.iter().filter(|p| p.name != pr.proposer) {
            let request = self
                .http
                .post(format!("{}/vote", player.endpoint_url))
                .json(&serde_json::json!({
                    "player_name": player.name,
                    "proposal_id": pr.id,
                    "proposer": pr.proposer,
                    "description": pr.description,
                    "branch": pr.branch,
                    "game_state": summary,
                }))
                .send();
            match request.await {
                Ok(response) => {
                    log::info!("triggered vote for {}: {}", player.name, response.status())
                }
                Err(e) => log::warn!("failed to trigger vote for {}: {}", player.name, e),
            }
        }
    }

    /// Tells every player to refresh their working copy after a merge.
    pub async fn notify_pull(&self, players: &[Player]) {
        for player in players {
            match self
                .http
                .post(format!("{}/pull", player.endpoint_url))
                .timeout(Duration::from_secs(5))
                .send()
                .await
            {
                Ok(_) => log::debug!("notified {} to pull", player.name),
                Err(e) => log::warn!("failed to notify {} to pull: {}", player.name, e),
            }
        }
    }
}
