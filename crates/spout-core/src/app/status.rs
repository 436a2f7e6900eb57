//! Status - dispatcher のカウンタとスナップショット

use serde::{Deserialize, Serialize};

use crate::domain::{ActivationState, StopReason};

/// What the dispatcher has done so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCounts {
    /// Command messages handled (any name).
    pub commands: u64,
    pub task_id_notices: u64,
    /// `next` calls that reached the spout.
    pub nexts: u64,
    pub emitted: u64,
    /// Emissions dropped by the validator.
    pub rejected: u64,
    pub acked: u64,
    /// Tuples re-sent because of `fail`.
    pub replayed: u64,
    pub unknown_acks: u64,
    pub unknown_fails: u64,
    /// Unrecognized command names.
    pub ignored: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoutStatus {
    pub component: String,
    pub state: ActivationState,
    /// Live pending tuples.
    pub pending: usize,
    pub counts: DispatchCounts,
}

/// Returned by `Dispatcher::run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub reason: StopReason,
    pub status: SpoutStatus,
}
