//! Pending entry: the tuple last sent under an id, plus its sliding deadline.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::OutboundTuple;

/// One tuple waiting for ack / fail.
///
/// Design:
/// - `ttl` is fixed at registration; every access moves `expires_at` to `now + ttl`.
/// - An entry is expired once `now >= expires_at`, swept or not.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub tuple: OutboundTuple,
    pub ttl: TimeDelta,
    pub expires_at: DateTime<Utc>,
}

impl PendingEntry {
    pub fn new(tuple: OutboundTuple, ttl: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            tuple,
            ttl,
            expires_at: deadline(now, ttl),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Sliding expiration: push the deadline out by a full `ttl`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.expires_at = deadline(now, self.ttl);
    }
}

fn deadline(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
