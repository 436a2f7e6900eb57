//! Spout trait - ユーザーが実装する拡張ポイント
//!
//! dispatcher はこの trait だけを通してユーザーコードを呼ぶ。
//! 必須なのは `next` のみで、他の hook はデフォルトで何もしない。

use super::emitter::Emitter;
use crate::domain::{SpoutError, TaskId};

/// A source component.
///
/// # 使用例
/// ```ignore
/// struct Numbers { n: i64 }
///
/// impl Spout for Numbers {
///     fn next(&mut self, emitter: &mut Emitter<'_>) -> Result<(), SpoutError> {
///         self.n += 1;
///         emitter.emit(vec![json!(self.n)]);
///         Ok(())
///     }
/// }
/// ```
///
/// # 呼ばれ方
/// - `next` / `sync` は Enabled のときだけ呼ばれる
/// - hook が `Err` を返しても dispatcher は止まらない（error イベントになる）
/// - すべて dispatcher ループ上で同期的に呼ばれる
pub trait Spout: Send {
    /// Produce zero or more tuples.
    fn next(&mut self, emitter: &mut Emitter<'_>) -> Result<(), SpoutError>;

    /// Runs before the spout becomes enabled. An error keeps it disabled.
    fn on_activate(&mut self) -> Result<(), SpoutError> {
        Ok(())
    }

    fn on_deactivate(&mut self) -> Result<(), SpoutError> {
        Ok(())
    }

    /// Called after every command message while enabled.
    fn sync(&mut self) -> Result<(), SpoutError> {
        Ok(())
    }

    /// Downstream task ids the host reported for an emission.
    fn task_ids(&mut self, _ids: &[TaskId]) {}
}
