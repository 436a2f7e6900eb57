//! SpoutBuilder - dispatcher の構築とワイヤリング
//!
//! 起動時に設定を検証する（Fail-fast）。足りない部品は本番向けのデフォルトで埋める:
//! - Clock: `SystemClock`
//! - IdGenerator: `RandomIdGenerator::from_entropy()`
//! - OutputValidator: `AcceptAll`
//! - EventSink: `TracingEventSink`（component id 付き）

use std::sync::Arc;

use tokio::sync::Mutex;

use super::activation::Activation;
use super::dispatcher::Dispatcher;
use super::emitter::EmitPolicy;
use super::spout::Spout;
use super::status::DispatchCounts;
use crate::cache::PendingCache;
use crate::config::SpoutConfig;
use crate::impls::{AcceptAll, TracingEventSink};
use crate::ports::{
    Clock, EventSink, IdGenerator, OutputValidator, RandomIdGenerator, SystemClock, Transport,
};

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("component_id must not be empty")]
    EmptyComponentId,

    #[error("timeout_seconds must be positive when guaranteed delivery is enabled")]
    ZeroTimeout,

    #[error("sweep_interval_seconds must be positive when set")]
    ZeroSweepInterval,
}

/// # 使用例
/// ```ignore
/// let dispatcher = SpoutBuilder::new(MySpout::default(), transport)
///     .config(SpoutConfig::load(None)?)
///     .validator(DeclaredStreams::new().declare("default", ["word"]))
///     .build()?;
/// let report = dispatcher.run_until_closed().await;
/// ```
pub struct SpoutBuilder<S, T> {
    spout: S,
    transport: T,
    config: SpoutConfig,
    clock: Arc<dyn Clock>,
    ids: Option<Box<dyn IdGenerator>>,
    validator: Arc<dyn OutputValidator>,
    events: Option<Arc<dyn EventSink>>,
}

impl<S: Spout, T: Transport> SpoutBuilder<S, T> {
    pub fn new(spout: S, transport: T) -> Self {
        Self {
            spout,
            transport,
            config: SpoutConfig::default(),
            clock: Arc::new(SystemClock),
            ids: None,
            validator: Arc::new(AcceptAll),
            events: None,
        }
    }

    pub fn config(mut self, config: SpoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn validator(mut self, validator: impl OutputValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn event_sink(mut self, events: impl EventSink + 'static) -> Self {
        self.events = Some(Arc::new(events));
        self
    }

    pub fn build(self) -> Result<Dispatcher<S, T>, BuildError> {
        let config = self.config;
        if config.component_id.is_empty() {
            return Err(BuildError::EmptyComponentId);
        }
        if config.guaranteed_delivery && config.timeout_seconds == 0 {
            return Err(BuildError::ZeroTimeout);
        }
        if config.sweep_interval_seconds == Some(0) {
            return Err(BuildError::ZeroSweepInterval);
        }

        let events = self
            .events
            .unwrap_or_else(|| Arc::new(TracingEventSink::new(config.component_id.clone())));
        let ids = self
            .ids
            .unwrap_or_else(|| Box::new(RandomIdGenerator::from_entropy()));

        Ok(Dispatcher {
            component: config.component_id.clone(),
            spout: self.spout,
            transport: self.transport,
            activation: Activation::new(config.deactivate_mode),
            pending: Arc::new(Mutex::new(PendingCache::new(self.clock))),
            policy: EmitPolicy {
                guaranteed: config.guaranteed_delivery,
                timeout: config.timeout(),
            },
            sweep_interval: config.sweep_interval(),
            ids,
            validator: self.validator,
            events,
            counts: DispatchCounts::default(),
        })
    }
}
