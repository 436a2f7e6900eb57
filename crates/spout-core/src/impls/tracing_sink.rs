//! TracingEventSink - `SpoutEvent` を tracing に流す

use crate::domain::{EventLevel, SpoutEvent};
use crate::ports::EventSink;

/// Logs every event through `tracing`, tagged with the component id.
#[derive(Debug, Clone)]
pub struct TracingEventSink {
    component: String,
}

impl TracingEventSink {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }
}

impl EventSink for TracingEventSink {
    fn record(&self, event: &SpoutEvent) {
        let component = self.component.as_str();
        let kind = event.kind();
        let id = event.delivery_id().map(|id| id.as_str());
        match event.level() {
            EventLevel::Info => tracing::info!(component, kind, id, "{event}"),
            EventLevel::Warn => tracing::warn!(component, kind, id, "{event}"),
            EventLevel::Error => tracing::error!(component, kind, id, "{event}"),
        }
    }
}
