//! Events - spout で発生したイベント
//!
//! ログ出力はすべてこのイベント経由で `EventSink` に渡す。
//! 本番では `TracingEventSink` が tracing に流し、テストでは
//! `RecordingEventSink` が溜めたイベントを検査する。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::DeliveryId;
use super::state::ActivationState;

/// Severity an event is logged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// Why the dispatch loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `receive()` returned nothing: the host side is gone.
    TransportClosed,
    ShutdownRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpoutEvent {
    Started { component: String },
    Stopped { component: String, reason: StopReason },

    /// activate / deactivate の hook が成功した
    StateChanged { from: ActivationState, to: ActivationState },

    /// `ack` for an id the pending cache does not hold.
    AckUnknown { id: DeliveryId },
    /// `fail` for an id the pending cache does not hold.
    FailUnknown { id: DeliveryId },
    /// `ack` / `fail` arrived without an id.
    MissingDeliveryId { command: String },

    /// The validator rejected an emission; it was dropped.
    EmissionRejected { stream: String, description: String },
    /// A freshly generated id replaced a pending entry that was still live.
    DeliveryIdReused { id: DeliveryId },

    ActivateFailed { cause: String },
    DeactivateFailed { cause: String },
    NextFailed { cause: String },
    SyncFailed { cause: String },
}

impl SpoutEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            SpoutEvent::Started { .. }
            | SpoutEvent::Stopped { .. }
            | SpoutEvent::StateChanged { .. } => EventLevel::Info,
            SpoutEvent::AckUnknown { .. }
            | SpoutEvent::FailUnknown { .. }
            | SpoutEvent::MissingDeliveryId { .. }
            | SpoutEvent::DeliveryIdReused { .. } => EventLevel::Warn,
            SpoutEvent::EmissionRejected { .. }
            | SpoutEvent::ActivateFailed { .. }
            | SpoutEvent::DeactivateFailed { .. }
            | SpoutEvent::NextFailed { .. }
            | SpoutEvent::SyncFailed { .. } => EventLevel::Error,
        }
    }

    /// Short machine-friendly name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SpoutEvent::Started { .. } => "started",
            SpoutEvent::Stopped { .. } => "stopped",
            SpoutEvent::StateChanged { .. } => "state_changed",
            SpoutEvent::AckUnknown { .. } => "ack_unknown",
            SpoutEvent::FailUnknown { .. } => "fail_unknown",
            SpoutEvent::MissingDeliveryId { .. } => "missing_delivery_id",
            SpoutEvent::EmissionRejected { .. } => "emission_rejected",
            SpoutEvent::DeliveryIdReused { .. } => "delivery_id_reused",
            SpoutEvent::ActivateFailed { .. } => "activate_failed",
            SpoutEvent::DeactivateFailed { .. } => "deactivate_failed",
            SpoutEvent::NextFailed { .. } => "next_failed",
            SpoutEvent::SyncFailed { .. } => "sync_failed",
        }
    }

    /// Delivery id the event refers to, if any.
    pub fn delivery_id(&self) -> Option<&DeliveryId> {
        match self {
            SpoutEvent::AckUnknown { id }
            | SpoutEvent::FailUnknown { id }
            | SpoutEvent::DeliveryIdReused { id } => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for SpoutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpoutEvent::Started { component } => write!(f, "Starting spout: {component}."),
            SpoutEvent::Stopped { component, reason } => {
                write!(f, "Spout {component} stopped ({reason:?}).")
            }
            SpoutEvent::StateChanged { from, to } => {
                write!(f, "Activation state {from:?} -> {to:?}.")
            }
            SpoutEvent::AckUnknown { id } => write!(
                f,
                "Fail to ack message. Pending queue doesn't contain message: {id}."
            ),
            SpoutEvent::FailUnknown { id } => write!(
                f,
                "Fail to resend message. Pending queue doesn't contain message: {id}."
            ),
            SpoutEvent::MissingDeliveryId { command } => {
                write!(f, "Received {command} without a message id.")
            }
            SpoutEvent::EmissionRejected {
                stream,
                description,
            } => write!(f, "{description} for next tuple on stream {stream}."),
            SpoutEvent::DeliveryIdReused { id } => write!(
                f,
                "Generated id {id} replaced a tuple that was still pending."
            ),
            SpoutEvent::ActivateFailed { cause } => {
                write!(f, "Failed to activate component: {cause}")
            }
            SpoutEvent::DeactivateFailed { cause } => {
                write!(f, "Failed to deactivate component: {cause}")
            }
            SpoutEvent::NextFailed { cause } => write!(f, "Next failed: {cause}"),
            SpoutEvent::SyncFailed { cause } => write!(f, "Sync failed: {cause}"),
        }
    }
}
