//! Outbound tuples and emission requests.

use serde::{Deserialize, Serialize};

use super::ids::DeliveryId;
use super::message::TaskId;

/// Stream used when an emission does not name one.
pub const DEFAULT_STREAM: &str = "default";

/// A tuple handed to the transport.
///
/// `id` is present iff guaranteed delivery was enabled for the emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundTuple {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DeliveryId>,

    #[serde(default)]
    pub task: TaskId,

    #[serde(default = "default_stream")]
    pub stream: String,

    #[serde(rename = "tuple")]
    pub payload: Vec<serde_json::Value>,

    #[serde(default)]
    pub need_task_ids: bool,
}

fn default_stream() -> String {
    DEFAULT_STREAM.to_string()
}

/// What a spout asks the emitter to send.
///
/// # 使用例
/// ```ignore
/// let emission = Emission::new(vec![json!("word"), json!(1)])
///     .stream("words")
///     .task(7)
///     .need_task_ids(true);
/// emitter.emit_with(emission);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub payload: Vec<serde_json::Value>,
    pub stream: String,
    pub task: TaskId,
    pub need_task_ids: bool,
}

impl Emission {
    pub fn new(payload: Vec<serde_json::Value>) -> Self {
        Self {
            payload,
            stream: default_stream(),
            task: 0,
            need_task_ids: false,
        }
    }

    pub fn stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = stream.into();
        self
    }

    /// Direct the tuple to a specific downstream task.
    pub fn task(mut self, task: TaskId) -> Self {
        self.task = task;
        self
    }

    pub fn need_task_ids(mut self, need: bool) -> Self {
        self.need_task_ids = need;
        self
    }

    pub(crate) fn into_tuple(self, id: Option<DeliveryId>) -> OutboundTuple {
        OutboundTuple {
            id,
            task: self.task,
            stream: self.stream,
            payload: self.payload,
            need_task_ids: self.need_task_ids,
        }
    }
}

impl From<Vec<serde_json::Value>> for Emission {
    fn from(payload: Vec<serde_json::Value>) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emission_defaults() {
        let emission = Emission::new(vec![json!("a"), json!(1)]);
        assert_eq!(emission.stream, "default");
        assert_eq!(emission.task, 0);
        assert!(!emission.need_task_ids);
    }

    #[test]
    fn into_tuple_keeps_every_field() {
        let tuple = Emission::new(vec![json!("x")])
            .stream("words")
            .task(3)
            .need_task_ids(true)
            .into_tuple(Some(DeliveryId::from("idabcdef")));

        assert_eq!(tuple.id, Some(DeliveryId::from("idabcdef")));
        assert_eq!(tuple.stream, "words");
        assert_eq!(tuple.task, 3);
        assert_eq!(tuple.payload, vec![json!("x")]);
        assert!(tuple.need_task_ids);
    }

    #[test]
    fn untracked_tuple_omits_id_on_the_wire() {
        let tuple = Emission::new(vec![json!("x")]).into_tuple(None);
        let value = serde_json::to_value(&tuple).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["tuple"], json!(["x"]));
    }
}
