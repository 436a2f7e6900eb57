//! Impls - ports のプロセス内実装
//!
//! # 含まれる実装
//! - **ChannelTransport / TransportPeer**: tokio mpsc による transport（開発・テスト用）
//! - **AcceptAll / DeclaredStreams**: OutputValidator
//! - **TracingEventSink**: tracing へのログ出力（本番用）
//! - **RecordingEventSink**: イベントの記録（テスト用）
//!
//! wire encoding 付きの transport（stdin/stdout の JSON など）は別クレートに置く想定。

pub mod channel_transport;
pub mod recording_sink;
pub mod schema;
pub mod tracing_sink;

// 主要な型を再エクスポート
pub use self::channel_transport::{ChannelTransport, TransportPeer};
pub use self::recording_sink::RecordingEventSink;
pub use self::schema::{AcceptAll, DeclaredStreams};
pub use self::tracing_sink::TracingEventSink;
