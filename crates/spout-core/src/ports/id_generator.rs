//! IdGenerator port - delivery ID 生成の抽象化
//!
//! 乱数源を注入できるようにして、テストでは seed 固定で決定的な ID を得る。
//!
//! # 衝突について
//! `"id"` + 36 種の文字 6 桁 = 約 21 億通り。pending が数万件規模になると
//! birthday collision が現実的な確率で起こる。ここでは形式を変えずに残し、
//! 衝突は `PendingCache::register` の戻り値から Emitter が検出し、warn イベントにする。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::DeliveryId;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// IdGenerator は guaranteed emit ごとに新しい ID を返す
///
/// dispatcher ループからしか呼ばれないので `&mut self` で十分。
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> DeliveryId;
}

/// RandomIdGenerator は `rand::Rng` から ID を生成
pub struct RandomIdGenerator<R> {
    rng: R,
}

impl<R: Rng> RandomIdGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomIdGenerator<StdRng> {
    /// OS の乱数で初期化（本番用）
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// seed 固定（テスト用）
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> IdGenerator for RandomIdGenerator<R> {
    fn next_id(&mut self) -> DeliveryId {
        let suffix: String = (0..DeliveryId::SUFFIX_LEN)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        DeliveryId::from_suffix(&suffix)
    }
}
