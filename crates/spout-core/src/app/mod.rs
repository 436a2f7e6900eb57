//! App - アプリケーション層
//!
//! ports と cache を組み合わせて spout のプロトコルを実装します。
//!
//! # 主要コンポーネント
//! - **SpoutBuilder**: 部品のワイヤリングと設定検証
//! - **Dispatcher**: 受信ループとコマンド振り分け
//! - **Activation**: enabled / disabled の状態機械
//! - **Emitter**: 検証・送信・pending 登録
//! - **Sweeper**: 期限切れ pending tuple の定期回収
//! - **SpoutHandle**: dispatcher（と sweeper）の起動と停止

pub mod activation;
pub mod builder;
pub mod dispatcher;
pub mod emitter;
pub mod handle;
pub mod spout;
pub mod status;
pub mod sweeper;

// 主要な型を再エクスポート
pub use self::activation::{Activation, Transition};
pub use self::builder::{BuildError, SpoutBuilder};
pub use self::dispatcher::Dispatcher;
pub use self::emitter::{Emitted, Emitter};
pub use self::handle::SpoutHandle;
pub use self::spout::Spout;
pub use self::status::{DispatchCounts, RunReport, SpoutStatus};
pub use self::sweeper::Sweeper;
