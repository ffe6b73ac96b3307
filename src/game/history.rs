use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Archival record of a resolved proposal. Append-only and immutable once
/// written; the vote map is a snapshot taken at resolution, not a live view.
///
/// Failed proposals record `points_awarded = -10` uniformly, matching the
/// flat defeat penalty. The field is the net award to the proposer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub turn_number: usize,
    pub proposer: String,
    pub proposal_id: u64,
    pub description: String,
    pub votes: BTreeMap<String, bool>,
    pub passed: bool,
    pub points_awarded: i64,
}
