//! Output validators.
//!
//! - `AcceptAll`: 検証なし
//! - `DeclaredStreams`: stream ごとに宣言したフィールド数と照合する

use std::collections::HashMap;

use crate::ports::{OutputValidator, Verification};

/// Accepts every emission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl OutputValidator for AcceptAll {
    fn verify(&self, _stream: &str, _payload: &[serde_json::Value]) -> Verification {
        Verification::ok()
    }
}

/// DeclaredStreams は宣言済みの output fields で emit を検証
///
/// # 検証内容
/// - 未宣言の stream への emit はエラー
/// - payload の長さが宣言したフィールド数と違えばエラー
///
/// # 使用例
/// ```ignore
/// let schema = DeclaredStreams::new()
///     .declare("default", ["word", "count"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeclaredStreams {
    streams: HashMap<String, Vec<String>>,
}

impl DeclaredStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare<I, S>(mut self, stream: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        self.streams.insert(stream.into(), fields);
        self
    }

    pub fn fields(&self, stream: &str) -> Option<&[String]> {
        self.streams.get(stream).map(Vec::as_slice)
    }
}

impl OutputValidator for DeclaredStreams {
    fn verify(&self, stream: &str, payload: &[serde_json::Value]) -> Verification {
        let Some(fields) = self.fields(stream) else {
            return Verification::error(format!("Stream '{stream}' is not declared"));
        };
        if fields.len() != payload.len() {
            return Verification::error(format!(
                "Stream '{stream}' declares {} fields ({}) but the tuple has {} values",
                fields.len(),
                fields.join(", "),
                payload.len()
            ));
        }
        Verification::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn schema() -> DeclaredStreams {
        DeclaredStreams::new()
            .declare("default", ["word", "count"])
            .declare("errors", ["message"])
    }

    #[rstest]
    #[case::matching_default("default", vec![json!("a"), json!(1)], false)]
    #[case::matching_other("errors", vec![json!("oops")], false)]
    #[case::too_few("default", vec![json!("a")], true)]
    #[case::too_many("errors", vec![json!("a"), json!("b")], true)]
    #[case::undeclared("metrics", vec![json!(1)], true)]
    fn declared_streams_check_arity(
        #[case] stream: &str,
        #[case] payload: Vec<Value>,
        #[case] is_error: bool,
    ) {
        assert_eq!(schema().verify(stream, &payload).is_error, is_error);
    }

    #[test]
    fn error_description_names_the_stream() {
        let verification = schema().verify("metrics", &[]);
        assert!(verification.description.contains("metrics"));
    }

    #[test]
    fn accept_all_accepts_anything() {
        assert!(!AcceptAll.verify("whatever", &[json!(null)]).is_error);
    }
}
