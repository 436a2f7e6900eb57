//! Sweeper - 期限切れ pending tuple の定期回収
//!
//! # フロー
//! 1. `interval` ごとに起きる
//! 2. dispatcher と同じ Mutex を取り、`PendingCache::sweep` を呼ぶ
//! 3. shutdown が来たら抜ける
//!
//! 回収しなくても期限切れ entry はアクセス時に不在として扱われる。
//! sweeper はメモリを早めに返すためのもの。

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::builder::BuildError;
use crate::cache::SharedPendingCache;

pub struct Sweeper {
    pending: SharedPendingCache,
    interval: Duration,
}

impl Sweeper {
    /// `interval` must be non-zero.
    pub fn new(pending: SharedPendingCache, interval: Duration) -> Result<Self, BuildError> {
        if interval.is_zero() {
            return Err(BuildError::ZeroSweepInterval);
        }
        Ok(Self { pending, interval })
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 最初の tick は即時に返るので読み捨てる
        ticker.tick().await;

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let swept = self.pending.lock().await.sweep();
            if swept > 0 {
                tracing::debug!(swept, "evicted expired pending tuples");
            }
        }
    }
}
