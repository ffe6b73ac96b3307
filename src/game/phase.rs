use serde::Deserialize;
use serde::Serialize;

/// Where the current turn sits in its lifecycle.
///
/// waiting → proposal (current player triggered)
/// proposal → voting (proposal accepted)
/// voting → completed (vote resolved)
/// completed → waiting (turn advanced)
///
/// completed → waiting is also reachable directly from proposal or voting
/// when a turn is abandoned (timeout or explicit forfeit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Proposal,
    Voting,
    Completed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Phase::Waiting => write!(f, "waiting"),
            Phase::Proposal => write!(f, "proposal"),
            Phase::Voting => write!(f, "voting"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(serde_json::to_string(&Phase::Voting).unwrap(), "\"voting\"");
        let phase: Phase = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(phase, Phase::Completed);
    }
}
