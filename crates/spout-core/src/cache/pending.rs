//! In-memory pending tuple cache with sliding expiration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;

use super::PendingEntry;
use crate::domain::{DeliveryId, OutboundTuple};
use crate::ports::Clock;

/// PendingCache は ack / fail 待ちの tuple を保持する
///
/// # 期限切れの扱い
/// - 期限切れは passive: 通知はしない
/// - `register` のたびに全体を sweep する
/// - `contains` / `get` / `remove` は対象 entry だけを見て、期限切れなら捨てる
/// - `contains` と `get` は読み取りアクセスなので sliding window を更新する
/// - 定期 sweep が欲しい場合は `app::sweeper` を使う（同じ Mutex の下で `sweep` を呼ぶ）
pub struct PendingCache {
    entries: HashMap<DeliveryId, PendingEntry>,
    clock: Arc<dyn Clock>,
}

impl PendingCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    /// Store `tuple` under `id`, replacing any previous entry.
    ///
    /// Returns the tuple that was still live under the same id, if any.
    pub fn register(
        &mut self,
        id: DeliveryId,
        tuple: OutboundTuple,
        ttl: Duration,
    ) -> Option<OutboundTuple> {
        self.sweep();
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let entry = PendingEntry::new(tuple, ttl, self.clock.now());
        self.entries.insert(id, entry).map(|previous| previous.tuple)
    }

    /// Presence check. A hit counts as an access and refreshes the sliding window.
    pub fn contains(&mut self, id: &DeliveryId) -> bool {
        let now = self.clock.now();
        match self.live_entry(id) {
            Some(entry) => {
                entry.touch(now);
                true
            }
            None => false,
        }
    }

    /// Look up a tuple and refresh its sliding window.
    pub fn get(&mut self, id: &DeliveryId) -> Option<&OutboundTuple> {
        let now = self.clock.now();
        let entry = self.live_entry(id)?;
        entry.touch(now);
        Some(&entry.tuple)
    }

    /// Remove the entry. Returns the tuple if it was still live.
    pub fn remove(&mut self, id: &DeliveryId) -> Option<OutboundTuple> {
        let now = self.clock.now();
        let entry = self.entries.remove(id)?;
        (!entry.is_expired(now)).then_some(entry.tuple)
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live_entry(&mut self, id: &DeliveryId) -> Option<&mut PendingEntry> {
        let now = self.clock.now();
        if self.entries.get(id)?.is_expired(now) {
            self.entries.remove(id);
            return None;
        }
        self.entries.get_mut(id)
    }
}
