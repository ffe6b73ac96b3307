use serde::Deserialize;
use serde::Serialize;

/// A participant in the game. Created once at initialization from the
/// roster document and never removed; only `score` mutates, and only
/// through the engine's award/penalty logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub endpoint_url: String,
    #[serde(default)]
    pub score: i64,
}

impl Player {
    pub fn new(name: &str, endpoint_url: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoint_url: endpoint_url.to_string(),
            score: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_defaults_to_zero_on_roster_load() {
        let player: Player =
            serde_json::from_str(r#"{"name": "alice", "endpoint_url": "http://ai-1:6001"}"#)
                .unwrap();
        assert_eq!(player.score, 0);
    }
}
