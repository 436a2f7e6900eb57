//! Emitter - `next` の中から tuple を送り出す窓口
//!
//! # フロー
//! 1. guaranteed delivery なら新しい `DeliveryId` を生成
//! 2. `OutputValidator` で `(stream, payload)` を検証。エラーなら記録して破棄
//! 3. `OutboundTuple` を組み立てて transport に送る
//! 4. ID があれば `PendingCache` に登録
//!
//! Emitter は dispatcher が `next` 呼び出しの間だけ組み立てる短命な借用の束。

use std::time::Duration;

use super::status::DispatchCounts;
use crate::cache::PendingCache;
use crate::domain::{DeliveryId, Emission, SpoutEvent};
use crate::ports::{EventSink, IdGenerator, OutputValidator, Transport};

/// Result of one `emit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    /// Sent to the transport; `id` is set when the tuple is being tracked.
    Sent { id: Option<DeliveryId> },
    /// Dropped by the validator. Nothing was sent or cached.
    Rejected { description: String },
}

impl Emitted {
    pub fn id(&self) -> Option<&DeliveryId> {
        match self {
            Emitted::Sent { id } => id.as_ref(),
            Emitted::Rejected { .. } => None,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Emitted::Sent { .. })
    }
}

/// Emission settings fixed at build time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EmitPolicy {
    pub guaranteed: bool,
    pub timeout: Duration,
}

pub struct Emitter<'a> {
    pub(crate) policy: EmitPolicy,
    pub(crate) ids: &'a mut dyn IdGenerator,
    pub(crate) validator: &'a dyn OutputValidator,
    pub(crate) transport: &'a mut dyn Transport,
    pub(crate) pending: &'a mut PendingCache,
    pub(crate) events: &'a dyn EventSink,
    pub(crate) counts: &'a mut DispatchCounts,
}

impl Emitter<'_> {
    /// Emit `payload` on the default stream.
    pub fn emit(&mut self, payload: Vec<serde_json::Value>) -> Emitted {
        self.emit_with(Emission::new(payload))
    }

    pub fn emit_with(&mut self, emission: Emission) -> Emitted {
        let id = self.policy.guaranteed.then(|| self.ids.next_id());

        let verification = self.validator.verify(&emission.stream, &emission.payload);
        if verification.is_error {
            self.counts.rejected += 1;
            self.events.record(&SpoutEvent::EmissionRejected {
                stream: emission.stream,
                description: verification.description.clone(),
            });
            return Emitted::Rejected {
                description: verification.description,
            };
        }

        let tuple = emission.into_tuple(id.clone());
        match &id {
            Some(id) => {
                self.transport.send(tuple.clone());
                let replaced = self
                    .pending
                    .register(id.clone(), tuple, self.policy.timeout);
                if replaced.is_some() {
                    self.events
                        .record(&SpoutEvent::DeliveryIdReused { id: id.clone() });
                }
            }
            None => self.transport.send(tuple),
        }
        self.counts.emitted += 1;

        Emitted::Sent { id }
    }

    /// Whether emissions are tracked until ack / fail.
    pub fn is_guaranteed(&self) -> bool {
        self.policy.guaranteed
    }
}
