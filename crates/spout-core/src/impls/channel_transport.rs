//! ChannelTransport - プロセス内の transport（開発・テスト用）
//!
//! tokio の unbounded mpsc を 2 本使い、片側を spout、もう片側を
//! host 役の `TransportPeer` が持つ。

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{DeliveryId, InboundMessage, OutboundTuple, TaskId};
use crate::ports::Transport;

/// Spout side of an in-process transport.
///
/// # 使用例
/// ```ignore
/// let (transport, mut peer) = ChannelTransport::pair();
/// peer.command("activate");
/// peer.command("next");
/// let tuple = peer.recv().await;
/// ```
pub struct ChannelTransport {
    inbound: mpsc::UnboundedReceiver<InboundMessage>,
    outbound: mpsc::UnboundedSender<OutboundTuple>,
}

/// Host side of an in-process transport.
///
/// Dropping the peer (or calling `close`) makes the spout's `receive` return
/// `None` once the queued messages are drained.
pub struct TransportPeer {
    inbound: Option<mpsc::UnboundedSender<InboundMessage>>,
    outbound: mpsc::UnboundedReceiver<OutboundTuple>,
}

impl ChannelTransport {
    pub fn pair() -> (ChannelTransport, TransportPeer) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let transport = ChannelTransport {
            inbound: in_rx,
            outbound: out_tx,
        };
        let peer = TransportPeer {
            inbound: Some(in_tx),
            outbound: out_rx,
        };
        (transport, peer)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn receive(&mut self) -> Option<InboundMessage> {
        self.inbound.recv().await
    }

    fn send(&mut self, tuple: OutboundTuple) {
        // peer が drop 済みなら捨てる
        let _ = self.outbound.send(tuple);
    }
}

impl TransportPeer {
    /// Queue a message for the spout. Returns false once the peer is closed
    /// or the spout side is gone.
    pub fn send(&self, message: InboundMessage) -> bool {
        self.inbound
            .as_ref()
            .is_some_and(|tx| tx.send(message).is_ok())
    }

    pub fn command(&self, name: &str) -> bool {
        self.send(InboundMessage::command(name))
    }

    pub fn ack(&self, id: impl Into<DeliveryId>) -> bool {
        self.send(InboundMessage::ack(id))
    }

    pub fn fail(&self, id: impl Into<DeliveryId>) -> bool {
        self.send(InboundMessage::fail(id))
    }

    pub fn task_ids(&self, ids: Vec<TaskId>) -> bool {
        self.send(InboundMessage::task_ids(ids))
    }

    /// Stop sending; the spout sees a closed transport after draining.
    pub fn close(&mut self) {
        self.inbound = None;
    }

    /// Wait for the next tuple the spout sent.
    pub async fn recv(&mut self) -> Option<OutboundTuple> {
        self.outbound.recv().await
    }

    /// Tuples already sent, without waiting.
    pub fn drain(&mut self) -> Vec<OutboundTuple> {
        let mut tuples = Vec::new();
        while let Ok(tuple) = self.outbound.try_recv() {
            tuples.push(tuple);
        }
        tuples
    }
}
