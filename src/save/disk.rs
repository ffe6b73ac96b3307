use crate::game::GameState;
use crate::game::Player;
use crate::game::Summary;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;

/// Static bootstrap configuration: the initial roster. Consulted only when
/// no state document exists yet.
#[derive(Debug, Deserialize)]
pub struct Roster {
    pub players: Vec<Player>,
}

/// Durable storage for the state document.
///
/// The document is the only source of truth across restarts, so every write
/// goes through a temp file in the same directory followed by a rename;
/// a crash mid-write leaves the previous document intact. The encoding is
/// pretty-printed JSON so saved games stay human-inspectable and diffable.
#[derive(Debug, Clone)]
pub struct Store {
    state_path: PathBuf,
    config_path: PathBuf,
}

impl Store {
    pub fn new(state_path: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            config_path: config_path.into(),
        }
    }

    /// Loads the state document verbatim if it exists, otherwise bootstraps
    /// a fresh game from the roster. A missing roster at first boot is fatal.
    pub fn load(&self) -> anyhow::Result<GameState> {
        if self.state_path.exists() {
            let raw = std::fs::read_to_string(&self.state_path)
                .with_context(|| format!("read state document {}", self.state_path.display()))?;
            let state = serde_json::from_str(&raw)
                .with_context(|| format!("decode state document {}", self.state_path.display()))?;
            return Ok(state);
        }
        let roster = self.roster()?;
        Ok(GameState::new(roster.players))
    }

    fn roster(&self) -> anyhow::Result<Roster> {
        let raw = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("roster required at {}", self.config_path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("decode roster {}", self.config_path.display()))
    }

    /// Overwrites the state document wholesale, atomically.
    pub fn save(&self, state: &GameState) -> anyhow::Result<()> {
        let encoded = serde_json::to_string_pretty(state).context("encode state document")?;
        write_atomic(&self.state_path, &encoded)
            .with_context(|| format!("write state document {}", self.state_path.display()))
    }

    /// Writes a per-turn snapshot of the summary next to the state document,
    /// named by the upcoming proposal number.
    pub fn snapshot(&self, summary: &Summary) -> anyhow::Result<PathBuf> {
        let dir = self
            .state_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("snapshots");
        std::fs::create_dir_all(&dir).context("create snapshots directory")?;
        let path = dir.join(format!("turn_{:04}.json", summary.next_proposal_number));
        let encoded = serde_json::to_string_pretty(summary).context("encode snapshot")?;
        write_atomic(&path, &encoded)?;
        Ok(path)
    }
}

fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Phase;
    use crate::game::Proposal;

    fn scratch(test: &str) -> (Store, PathBuf) {
        let dir = std::env::temp_dir().join(format!("nomic-store-{}-{}", test, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = Store::new(dir.join("state.json"), dir.join("config.json"));
        (store, dir)
    }

    fn roster_json() -> &'static str {
        r#"{"players": [
            {"name": "alice", "endpoint_url": "http://ai-1:6001"},
            {"name": "bob", "endpoint_url": "http://ai-2:6002"}
        ]}"#
    }

    #[test]
    fn bootstrap_from_roster_when_no_state_document() {
        let (store, dir) = scratch("bootstrap");
        std::fs::write(dir.join("config.json"), roster_json()).unwrap();
        let state = store.load().unwrap();
        assert!(state.game_started);
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[0].score, 0);
        assert_eq!(state.next_proposal_number, 301);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_roster_is_an_error_at_first_boot() {
        let (store, dir) = scratch("noroster");
        assert!(store.load().is_err());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn save_then_load_round_trips_every_field() {
        let (store, dir) = scratch("roundtrip");
        std::fs::write(dir.join("config.json"), roster_json()).unwrap();
        let mut state = store.load().unwrap();
        state.current_turn_index = 1;
        state.next_proposal_number = 305;
        state.circuits_completed = 3;
        state.turn_phase = Phase::Voting;
        let mut pr = Proposal::new(304, "bob", "a rule", "diff body", "nomic/304");
        pr.cast("alice", false);
        state.pending_pr = Some(pr);
        store.save(&state).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.players, state.players);
        assert_eq!(loaded.current_turn_index, 1);
        assert_eq!(loaded.next_proposal_number, 305);
        assert_eq!(loaded.circuits_completed, 3);
        assert_eq!(loaded.turn_phase, Phase::Voting);
        assert_eq!(loaded.pending_pr, state.pending_pr);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn saved_state_is_preferred_over_roster() {
        let (store, dir) = scratch("precedence");
        std::fs::write(dir.join("config.json"), roster_json()).unwrap();
        let mut state = store.load().unwrap();
        state.players[0].score = 42;
        store.save(&state).unwrap();
        // roster now disagrees with the document; the document wins
        let loaded = store.load().unwrap();
        assert_eq!(loaded.players[0].score, 42);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn atomic_write_leaves_no_temp_file_behind() {
        let (store, dir) = scratch("atomic");
        std::fs::write(dir.join("config.json"), roster_json()).unwrap();
        let state = store.load().unwrap();
        store.save(&state).unwrap();
        assert!(dir.join("state.json").exists());
        assert!(!dir.join("state.tmp").exists());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn snapshot_names_by_proposal_number() {
        let (store, dir) = scratch("snapshot");
        std::fs::write(dir.join("config.json"), roster_json()).unwrap();
        let mut state = store.load().unwrap();
        state.next_proposal_number = 307;
        let path = store.snapshot(&state.summary()).unwrap();
        assert!(path.ends_with("snapshots/turn_0307.json"));
        assert!(path.exists());
        std::fs::remove_dir_all(dir).ok();
    }
}
