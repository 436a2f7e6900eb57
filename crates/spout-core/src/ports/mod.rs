//! Ports - 抽象化レイヤー
//!
//! spout の外側にある協調者（host との transport、出力スキーマ検証、ログ、
//! 時刻、乱数）への境界を trait として定義する。
//! 実装は `impls` に置き、dispatcher はこれらの trait だけに依存する。

pub mod clock;
pub mod event_sink;
pub mod id_generator;
pub mod transport;
pub mod validator;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::id_generator::{IdGenerator, RandomIdGenerator};
pub use self::transport::Transport;
pub use self::validator::{OutputValidator, Verification};
