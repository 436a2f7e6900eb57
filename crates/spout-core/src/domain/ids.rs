//! Delivery identifiers.
//!
//! guaranteed delivery が有効なとき、各 emit に `DeliveryId` が割り当てられ、
//! host からの ack / fail はこの ID で pending tuple を引き当てます。
//!
//! # ID 形式
//! - 生成される ID は `"id"` + 英小文字/数字 6 文字（例: `id3k9x0a`）
//! - wire から届く ID は形式を問わず、そのまま文字列として扱う

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one tracked emission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(String);

impl DeliveryId {
    /// 生成 ID の固定プレフィックス
    pub const PREFIX: &'static str = "id";

    /// 生成 ID のランダム部分の長さ
    pub const SUFFIX_LEN: usize = 6;

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// ランダム部分から ID を組み立てる（`IdGenerator` 用）
    pub fn from_suffix(suffix: &str) -> Self {
        Self(format!("{}{}", Self::PREFIX, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the random part if this id has the generated shape.
    pub fn suffix(&self) -> Option<&str> {
        self.0
            .strip_prefix(Self::PREFIX)
            .filter(|rest| rest.len() == Self::SUFFIX_LEN)
    }
}

impl From<&str> for DeliveryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeliveryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
