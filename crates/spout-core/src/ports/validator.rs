//! OutputValidator port - emit 前の出力スキーマ検証

use serde::{Deserialize, Serialize};

/// Result of checking one emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub is_error: bool,
    pub description: String,
}

impl Verification {
    pub fn ok() -> Self {
        Self {
            is_error: false,
            description: String::new(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            is_error: true,
            description: description.into(),
        }
    }
}

/// OutputValidator は `(stream, payload)` を宣言済みスキーマと照合する
pub trait OutputValidator: Send + Sync {
    fn verify(&self, stream: &str, payload: &[serde_json::Value]) -> Verification;
}
