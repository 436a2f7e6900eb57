//! Activation - enabled / disabled の 2 状態ゲート
//!
//! hook（`on_activate` / `on_deactivate`）はクロージャで受け取る。
//! hook が失敗した場合は状態を変えずにエラーを返し、記録は呼び出し側に任せる。

use crate::domain::{ActivationState, DeactivateMode, SpoutError};

/// Outcome of an `activate` / `deactivate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Already in the requested state; the hook was not called.
    Ignored,
    /// The hook ran and succeeded.
    Applied {
        from: ActivationState,
        to: ActivationState,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Activation {
    state: ActivationState,
    mode: DeactivateMode,
}

impl Activation {
    pub fn new(mode: DeactivateMode) -> Self {
        Self {
            state: ActivationState::Disabled,
            mode,
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Disabled -> Enabled, once `hook` succeeds. No-op when already enabled.
    pub fn activate<F>(&mut self, hook: F) -> Result<Transition, SpoutError>
    where
        F: FnOnce() -> Result<(), SpoutError>,
    {
        if self.is_enabled() {
            return Ok(Transition::Ignored);
        }
        hook()?;
        Ok(self.move_to(ActivationState::Enabled))
    }

    /// Runs `hook` when enabled; the resulting state depends on `DeactivateMode`.
    ///
    /// With `KeepEnabled` a successful deactivate leaves the spout enabled,
    /// so `next` keeps being served; use `Disable` to actually stop.
    pub fn deactivate<F>(&mut self, hook: F) -> Result<Transition, SpoutError>
    where
        F: FnOnce() -> Result<(), SpoutError>,
    {
        if !self.is_enabled() {
            return Ok(Transition::Ignored);
        }
        hook()?;
        Ok(self.move_to(self.mode.target_state()))
    }

    fn move_to(&mut self, to: ActivationState) -> Transition {
        let from = self.state;
        self.state = to;
        Transition::Applied { from, to }
    }
}
