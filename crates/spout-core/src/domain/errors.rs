//! Errors - spout のエラー型
//!
//! この crate のエラーはどれもプロセスを落とさない。
//! dispatcher は hook の失敗を `SpoutEvent` として記録してループを続ける。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpoutError {
    /// A user hook (`next`, `sync`, `on_activate`, `on_deactivate`) failed.
    #[error("hook failed: {0}")]
    Hook(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The dispatcher or sweeper task could not be joined.
    #[error("task join failed: {0}")]
    Join(String),
}

impl SpoutError {
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }
}
