//! Inbound protocol messages.
//!
//! host から届くメッセージは task-id 通知か command のどちらか一方だけ。
//! 実行時の型判定ではなく sum type で表現し、dispatcher は exhaustive match で振り分けます。

use serde::{Deserialize, Serialize};

use super::ids::DeliveryId;

/// Host task ids delivered to the spout.
pub type TaskId = i64;

/// One message received from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Downstream task ids for the previous emission.
    TaskIds { ids: Vec<TaskId> },

    /// A control command (`next`, `ack`, `fail`, `activate`, `deactivate`, ...).
    Command(CommandMessage),
}

impl InboundMessage {
    pub fn task_ids(ids: Vec<TaskId>) -> Self {
        Self::TaskIds { ids }
    }

    pub fn command(name: impl Into<String>) -> Self {
        Self::Command(CommandMessage::new(name))
    }

    pub fn ack(id: impl Into<DeliveryId>) -> Self {
        Self::Command(CommandMessage::with_id("ack", id))
    }

    pub fn fail(id: impl Into<DeliveryId>) -> Self {
        Self::Command(CommandMessage::with_id("fail", id))
    }
}

/// Raw command as it arrives: a name plus, for `ack`/`fail`, a delivery id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DeliveryId>,
}

impl CommandMessage {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            id: None,
        }
    }

    pub fn with_id(command: impl Into<String>, id: impl Into<DeliveryId>) -> Self {
        Self {
            command: command.into(),
            id: Some(id.into()),
        }
    }
}

/// Classified command.
///
/// `Ack` / `Fail` keep the id optional: a message without one is still an
/// ack/fail, and the dispatcher reports it instead of dropping it silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Ack(Option<DeliveryId>),
    Fail(Option<DeliveryId>),
    Activate,
    Deactivate,
    /// 未知のコマンド名（無視される）
    Unknown(String),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::Next => "next",
            Command::Ack(_) => "ack",
            Command::Fail(_) => "fail",
            Command::Activate => "activate",
            Command::Deactivate => "deactivate",
            Command::Unknown(name) => name,
        }
    }
}

impl From<CommandMessage> for Command {
    fn from(message: CommandMessage) -> Self {
        match message.command.as_str() {
            "next" => Command::Next,
            "ack" => Command::Ack(message.id),
            "fail" => Command::Fail(message.id),
            "activate" => Command::Activate,
            "deactivate" => Command::Deactivate,
            _ => Command::Unknown(message.command),
        }
    }
}
