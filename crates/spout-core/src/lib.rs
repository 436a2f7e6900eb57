//! spout-core
//!
//! Reliability and control-command core of a stream-processing spout.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（DeliveryId, InboundMessage, OutboundTuple, ActivationState, SpoutEvent, SpoutError）
//! - **ports**: 抽象化レイヤー（Transport, OutputValidator, EventSink, Clock, IdGenerator）
//! - **impls**: ports の実装（ChannelTransport, DeclaredStreams, TracingEventSink など）
//! - **cache**: ack 待ち tuple の sliding expiration 付きキャッシュ
//! - **app**: アプリケーションロジック（Dispatcher, Activation, Emitter, SpoutBuilder, Sweeper）
//! - **config**: SpoutConfig の読み込み

pub mod app;
pub mod cache;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Dispatcher, Emitted, Emitter, Spout, SpoutBuilder, SpoutHandle};
pub use config::SpoutConfig;
pub use domain::{DeliveryId, Emission, InboundMessage, OutboundTuple, SpoutError};
