//! EventSink port - イベント記録（ログ）の抽象化
//!
//! # 実装
//! - `TracingEventSink`: tracing に流す（本番用）
//! - `RecordingEventSink`: メモリに溜める（テスト用）

use crate::domain::SpoutEvent;

/// EventSink は `SpoutEvent` を記録
///
/// 記録は同期・失敗なし。sink 側の障害で dispatcher を止めない。
pub trait EventSink: Send + Sync {
    fn record(&self, event: &SpoutEvent);
}
