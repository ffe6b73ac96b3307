use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of a resolved vote, handed back to the arbiter for side effects
/// and returned inline to the last voter.
///
/// `branch` is populated only on a pass, signalling the downstream merge.
/// `points` is the proposer's net delta (-10 on defeat).
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub passed: bool,
    pub points: i64,
    pub votes: BTreeMap<String, bool>,
    pub proposal_id: u64,
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    /// Set by the arbiter when pre-merge verification rejects a passed
    /// proposal; the merge is skipped and the outcome reported as failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_failure: Option<String>,
}
