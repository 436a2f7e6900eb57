//! State - spout の activation 状態
//!
//! # 状態遷移
//! - Disabled（初期状態）--activate--> Enabled
//! - Enabled --deactivate--> Disabled または Enabled（`DeactivateMode` 次第）
//!
//! `next` / `ack` / `fail` と sync hook は Enabled のときだけ効く。

use serde::{Deserialize, Serialize};

/// Whether processing commands take effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    #[default]
    Disabled,
    Enabled,
}

impl ActivationState {
    pub fn is_enabled(self) -> bool {
        matches!(self, ActivationState::Enabled)
    }
}

/// State reached after a successful `deactivate`.
///
/// The host adapter this protocol comes from leaves the spout enabled after a
/// successful deactivate hook. `KeepEnabled` reproduces that; `Disable` is the
/// transition the command name implies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivateMode {
    #[default]
    KeepEnabled,
    Disable,
}

impl DeactivateMode {
    pub fn target_state(self) -> ActivationState {
        match self {
            DeactivateMode::KeepEnabled => ActivationState::Enabled,
            DeactivateMode::Disable => ActivationState::Disabled,
        }
    }
}
