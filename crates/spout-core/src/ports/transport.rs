//! Transport port - host とのメッセージ交換
//!
//! framing / encoding は transport 実装の責務。ここでは decode 済みの
//! `InboundMessage` と encode 前の `OutboundTuple` だけを扱う。

use async_trait::async_trait;

use crate::domain::{InboundMessage, OutboundTuple};

/// Transport は host との双方向チャネル
///
/// # 設計原則
/// - `receive` は次のメッセージまで待つ。`None` は host 側が閉じたことを意味する
/// - `send` は enqueue のみで待たない。送信失敗は transport の責務でありここでは扱わない
#[async_trait]
pub trait Transport: Send {
    async fn receive(&mut self) -> Option<InboundMessage>;

    fn send(&mut self, tuple: OutboundTuple);
}
