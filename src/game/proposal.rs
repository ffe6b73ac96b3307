use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// The single in-flight rule-change candidate awaiting votes.
///
/// At most one exists at a time; it is created when a proposal is accepted
/// and cleared when the turn advances. The proposer's own yes vote is seeded
/// at construction. Serialized under the state document key `pending_pr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub proposer: String,
    pub description: String,
    pub diff: String,
    pub branch: String,
    pub votes: BTreeMap<String, bool>,
}

impl Proposal {
    pub fn new(id: u64, proposer: &str, description: &str, diff: &str, branch: &str) -> Self {
        let mut votes = BTreeMap::new();
        votes.insert(proposer.to_string(), true);
        Self {
            id,
            proposer: proposer.to_string(),
            description: description.to_string(),
            diff: diff.to_string(),
            branch: branch.to_string(),
            votes,
        }
    }

    /// Records a vote. A repeat vote by the same identity overwrites the
    /// previous one rather than adding a key.
    pub fn cast(&mut self, voter: &str, vote: bool) {
        self.votes.insert(voter.to_string(), vote);
    }

    pub fn favorable(&self) -> usize {
        self.votes.values().filter(|v| **v).count()
    }

    pub fn total(&self) -> usize {
        self.votes.len()
    }

    pub fn unanimous(&self) -> bool {
        self.votes.values().all(|v| *v)
    }

    /// Voters who voted against, in name order.
    pub fn dissenters(&self) -> impl Iterator<Item = &str> {
        self.votes
            .iter()
            .filter(|(_, v)| !**v)
            .map(|(name, _)| name.as_str())
    }
}
