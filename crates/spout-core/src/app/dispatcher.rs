//! Dispatcher - spout のメイン制御ループ
//!
//! # フロー（1 メッセージごと）
//! 1. `Transport::receive()` で次のメッセージを待つ（`None` ならループ終了）
//! 2. task-id 通知なら `Spout::task_ids` に渡す（sync はしない）
//! 3. command なら名前で振り分け
//!    - `next`: Enabled なら `Spout::next`
//!    - `ack`: Enabled なら pending から削除（なければ warn）
//!    - `fail`: Enabled なら pending の tuple をそのまま再送（なければ warn）
//!    - `activate` / `deactivate`: `Activation` を駆動
//!    - それ以外: 無視
//! 4. command の後、Enabled なら `Spout::sync`
//!
//! メッセージは到着順に 1 件ずつ処理し、fail の再送は次のメッセージより先に送る。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::activation::{Activation, Transition};
use super::emitter::{EmitPolicy, Emitter};
use super::spout::Spout;
use super::status::{DispatchCounts, RunReport, SpoutStatus};
use crate::cache::SharedPendingCache;
use crate::domain::{
    ActivationState, Command, DeliveryId, InboundMessage, SpoutEvent, StopReason, TaskId,
};
use crate::ports::{EventSink, IdGenerator, OutputValidator, Transport};

/// Drives one spout from inbound messages. Built by `SpoutBuilder`.
pub struct Dispatcher<S, T> {
    pub(super) component: String,
    pub(super) spout: S,
    pub(super) transport: T,
    pub(super) activation: Activation,
    pub(super) pending: SharedPendingCache,
    pub(super) policy: EmitPolicy,
    pub(super) sweep_interval: Option<Duration>,
    pub(super) ids: Box<dyn IdGenerator>,
    pub(super) validator: Arc<dyn OutputValidator>,
    pub(super) events: Arc<dyn EventSink>,
    pub(super) counts: DispatchCounts,
}

impl<S: Spout, T: Transport> Dispatcher<S, T> {
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn state(&self) -> ActivationState {
        self.activation.state()
    }

    pub fn counts(&self) -> &DispatchCounts {
        &self.counts
    }

    pub fn spout(&self) -> &S {
        &self.spout
    }

    /// Handle to the pending cache (shared with the sweeper).
    pub fn pending(&self) -> SharedPendingCache {
        Arc::clone(&self.pending)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval
    }

    // &mut self: `Box<dyn IdGenerator>` は Sync ではないので、&self を await 越しに
    // 持つと run() の future が Send でなくなる
    pub async fn status(&mut self) -> SpoutStatus {
        let pending = {
            let mut pending = self.pending.lock().await;
            pending.sweep();
            pending.len()
        };
        SpoutStatus {
            component: self.component.clone(),
            state: self.activation.state(),
            pending,
            counts: self.counts.clone(),
        }
    }

    /// Process messages until the transport closes or shutdown is requested.
    ///
    /// Dropping the shutdown sender counts as a shutdown request.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> RunReport {
        self.events.record(&SpoutEvent::Started {
            component: self.component.clone(),
        });

        let reason = loop {
            if *shutdown.borrow() {
                break StopReason::ShutdownRequested;
            }

            let message = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break StopReason::ShutdownRequested;
                    }
                    // 次のループで判定
                    continue;
                }
                message = self.transport.receive() => message,
            };

            let Some(message) = message else {
                break StopReason::TransportClosed;
            };
            self.handle(message).await;
        };

        self.events.record(&SpoutEvent::Stopped {
            component: self.component.clone(),
            reason,
        });
        RunReport {
            reason,
            status: self.status().await,
        }
    }

    /// Run with no shutdown signal; only a closed transport ends the loop.
    pub async fn run_until_closed(self) -> RunReport {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.run(shutdown_rx).await
    }

    /// Handle one inbound message.
    pub async fn handle(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::TaskIds { ids } => self.task_ids(&ids),
            InboundMessage::Command(message) => {
                self.counts.commands += 1;
                let command = Command::from(message);
                tracing::trace!(
                    component = %self.component,
                    command = command.name(),
                    enabled = self.activation.is_enabled(),
                    "dispatching command"
                );
                match command {
                    Command::Next => self.next().await,
                    Command::Ack(id) => self.ack(id).await,
                    Command::Fail(id) => self.fail(id).await,
                    Command::Activate => self.activate(),
                    Command::Deactivate => self.deactivate(),
                    Command::Unknown(_) => self.counts.ignored += 1,
                }
                self.sync();
            }
        }
    }

    fn task_ids(&mut self, ids: &[TaskId]) {
        self.counts.task_id_notices += 1;
        self.spout.task_ids(ids);
    }

    async fn next(&mut self) {
        if !self.activation.is_enabled() {
            return;
        }
        self.counts.nexts += 1;

        // next の間は lock を持ち続ける（sweeper と交互にならない）
        let mut pending = self.pending.lock().await;
        let mut emitter = Emitter {
            policy: self.policy,
            ids: self.ids.as_mut(),
            validator: self.validator.as_ref(),
            transport: &mut self.transport,
            pending: &mut *pending,
            events: self.events.as_ref(),
            counts: &mut self.counts,
        };
        let result = self.spout.next(&mut emitter);
        drop(pending);

        if let Err(e) = result {
            self.events.record(&SpoutEvent::NextFailed {
                cause: e.to_string(),
            });
        }
    }

    async fn ack(&mut self, id: Option<DeliveryId>) {
        if !self.activation.is_enabled() {
            return;
        }
        let Some(id) = self.require_id("ack", id) else {
            return;
        };

        let removed = self.pending.lock().await.remove(&id);
        match removed {
            Some(_) => self.counts.acked += 1,
            None => {
                self.counts.unknown_acks += 1;
                self.events.record(&SpoutEvent::AckUnknown { id });
            }
        }
    }

    async fn fail(&mut self, id: Option<DeliveryId>) {
        if !self.activation.is_enabled() {
            return;
        }
        let Some(id) = self.require_id("fail", id) else {
            return;
        };

        // get() が sliding window を更新する。entry は残したまま
        let replay = self.pending.lock().await.get(&id).cloned();
        match replay {
            Some(tuple) => {
                self.transport.send(tuple);
                self.counts.replayed += 1;
            }
            None => {
                self.counts.unknown_fails += 1;
                self.events.record(&SpoutEvent::FailUnknown { id });
            }
        }
    }

    fn activate(&mut self) {
        let spout = &mut self.spout;
        match self.activation.activate(|| spout.on_activate()) {
            Ok(transition) => self.record_transition(transition),
            Err(e) => self.events.record(&SpoutEvent::ActivateFailed {
                cause: e.to_string(),
            }),
        }
    }

    fn deactivate(&mut self) {
        let spout = &mut self.spout;
        match self.activation.deactivate(|| spout.on_deactivate()) {
            Ok(transition) => self.record_transition(transition),
            Err(e) => self.events.record(&SpoutEvent::DeactivateFailed {
                cause: e.to_string(),
            }),
        }
    }

    fn sync(&mut self) {
        if !self.activation.is_enabled() {
            return;
        }
        if let Err(e) = self.spout.sync() {
            self.events.record(&SpoutEvent::SyncFailed {
                cause: e.to_string(),
            });
        }
    }

    fn record_transition(&self, transition: Transition) {
        if let Transition::Applied { from, to } = transition {
            self.events.record(&SpoutEvent::StateChanged { from, to });
        }
    }

    fn require_id(&self, command: &str, id: Option<DeliveryId>) -> Option<DeliveryId> {
        if id.is_none() {
            self.events.record(&SpoutEvent::MissingDeliveryId {
                command: command.to_string(),
            });
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SpoutBuilder;
    use crate::app::emitter::Emitter;
    use crate::config::SpoutConfig;
    use crate::domain::{DeactivateMode, EventLevel, OutboundTuple, SpoutError};
    use crate::impls::{ChannelTransport, DeclaredStreams, RecordingEventSink, TransportPeer};
    use crate::ports::{ManualClock, RandomIdGenerator};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls {
        next: AtomicUsize,
        activate: AtomicUsize,
        deactivate: AtomicUsize,
        sync: AtomicUsize,
        task_ids: Mutex<Vec<Vec<TaskId>>>,
    }

    impl Calls {
        fn get(counter: &AtomicUsize) -> usize {
            counter.load(Ordering::SeqCst)
        }
    }

    /// 呼び出し回数を記録するテスト用 spout
    struct Probe {
        calls: Arc<Calls>,
        payloads: Vec<Vec<Value>>,
        fail_activate: bool,
        fail_deactivate: bool,
        fail_next: bool,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                calls: Arc::default(),
                payloads: vec![vec![json!("a"), json!(1)]],
                fail_activate: false,
                fail_deactivate: false,
                fail_next: false,
            }
        }
    }

    impl Spout for Probe {
        fn next(&mut self, emitter: &mut Emitter<'_>) -> Result<(), SpoutError> {
            self.calls.next.fetch_add(1, Ordering::SeqCst);
            if self.fail_next {
                return Err(SpoutError::hook("source unavailable"));
            }
            for payload in &self.payloads {
                emitter.emit(payload.clone());
            }
            Ok(())
        }

        fn on_activate(&mut self) -> Result<(), SpoutError> {
            self.calls.activate.fetch_add(1, Ordering::SeqCst);
            if self.fail_activate {
                return Err(SpoutError::hook("cannot open source"));
            }
            Ok(())
        }

        fn on_deactivate(&mut self) -> Result<(), SpoutError> {
            self.calls.deactivate.fetch_add(1, Ordering::SeqCst);
            if self.fail_deactivate {
                return Err(SpoutError::hook("cannot close source"));
            }
            Ok(())
        }

        fn sync(&mut self) -> Result<(), SpoutError> {
            self.calls.sync.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn task_ids(&mut self, ids: &[TaskId]) {
            self.calls.task_ids.lock().unwrap().push(ids.to_vec());
        }
    }

    struct Harness {
        dispatcher: Dispatcher<Probe, ChannelTransport>,
        peer: TransportPeer,
        calls: Arc<Calls>,
        events: RecordingEventSink,
        clock: ManualClock,
    }

    impl Harness {
        fn new(config: SpoutConfig, probe: Probe) -> Self {
            Self::with_validator(config, probe, None)
        }

        fn with_validator(
            config: SpoutConfig,
            probe: Probe,
            schema: Option<DeclaredStreams>,
        ) -> Self {
            let (transport, peer) = ChannelTransport::pair();
            let calls = Arc::clone(&probe.calls);
            let events = RecordingEventSink::new();
            let clock = ManualClock::default();
            let mut builder = SpoutBuilder::new(probe, transport)
                .config(config)
                .clock(clock.clone())
                .id_generator(RandomIdGenerator::seeded(11))
                .event_sink(events.clone());
            if let Some(schema) = schema {
                builder = builder.validator(schema);
            }
            Self {
                dispatcher: builder.build().unwrap(),
                peer,
                calls,
                events,
                clock,
            }
        }

        async fn command(&mut self, name: &str) {
            self.dispatcher.handle(InboundMessage::command(name)).await;
        }

        async fn ack(&mut self, id: &DeliveryId) {
            self.dispatcher.handle(InboundMessage::ack(id.clone())).await;
        }

        async fn fail(&mut self, id: &DeliveryId) {
            self.dispatcher.handle(InboundMessage::fail(id.clone())).await;
        }

        async fn contains(&self, id: &DeliveryId) -> bool {
            self.dispatcher.pending.lock().await.contains(id)
        }

        async fn pending_len(&self) -> usize {
            self.dispatcher.pending.lock().await.len()
        }

        fn sent(&mut self) -> Vec<OutboundTuple> {
            self.peer.drain()
        }
    }

    fn guaranteed() -> SpoutConfig {
        SpoutConfig {
            guaranteed_delivery: true,
            timeout_seconds: 30,
            ..SpoutConfig::default()
        }
    }

    fn sent_id(tuple: &OutboundTuple) -> DeliveryId {
        tuple.id.clone().expect("guaranteed tuples carry an id")
    }

    #[tokio::test]
    async fn emit_then_ack_removes_pending_entry() {
        let mut h = Harness::new(guaranteed(), Probe::new());
        h.command("activate").await;
        h.command("next").await;

        let sent = h.sent();
        assert_eq!(sent.len(), 1);
        let id = sent_id(&sent[0]);
        assert_eq!(id.suffix().map(str::len), Some(6));
        assert_eq!(sent[0].payload, vec![json!("a"), json!(1)]);
        assert!(h.contains(&id).await);

        h.ack(&id).await;
        assert!(!h.contains(&id).await);
        assert_eq!(h.dispatcher.counts().acked, 1);
        assert!(h.events.events().iter().all(|e| e.level() == EventLevel::Info));
    }

    #[tokio::test]
    async fn unguaranteed_emissions_are_never_cached() {
        let mut h = Harness::new(SpoutConfig::default(), Probe::new());
        h.command("activate").await;
        h.command("next").await;
        h.command("next").await;

        let sent = h.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|t| t.id.is_none()));
        assert_eq!(h.pending_len().await, 0);
    }

    #[tokio::test]
    async fn fail_resends_the_same_tuple_and_keeps_it_pending() {
        let mut h = Harness::new(guaranteed(), Probe::new());
        h.command("activate").await;
        h.command("next").await;
        let original = h.sent().remove(0);
        let id = sent_id(&original);

        h.fail(&id).await;

        assert_eq!(h.sent(), vec![original]);
        assert!(h.contains(&id).await);
        assert_eq!(h.dispatcher.counts().replayed, 1);
    }

    #[tokio::test]
    async fn fail_for_unknown_id_warns_without_sending() {
        let mut h = Harness::new(guaranteed(), Probe::new());
        h.command("activate").await;
        h.events.clear();

        h.fail(&DeliveryId::from("idZZZZZZ")).await;

        assert!(h.sent().is_empty());
        assert_eq!(
            h.events.events(),
            vec![SpoutEvent::FailUnknown {
                id: "idZZZZZZ".into()
            }]
        );
    }

    #[tokio::test]
    async fn ack_for_unknown_id_warns() {
        let mut h = Harness::new(guaranteed(), Probe::new());
        h.command("activate").await;
        h.events.clear();

        h.ack(&DeliveryId::from("idnever0")).await;

        assert_eq!(h.events.count(EventLevel::Warn), 1);
        assert_eq!(h.dispatcher.counts().unknown_acks, 1);
        assert!(h.sent().is_empty());
    }

    #[rstest]
    #[case::ack("ack")]
    #[case::fail("fail")]
    #[tokio::test]
    async fn ack_or_fail_without_id_warns(#[case] command: &str) {
        let mut h = Harness::new(guaranteed(), Probe::new());
        h.command("activate").await;
        h.events.clear();

        h.command(command).await;

        assert_eq!(
            h.events.events(),
            vec![SpoutEvent::MissingDeliveryId {
                command: command.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn second_activate_is_a_noop() {
        let mut h = Harness::new(SpoutConfig::default(), Probe::new());
        h.command("activate").await;
        h.command("activate").await;

        assert_eq!(Calls::get(&h.calls.activate), 1);
        assert_eq!(h.dispatcher.state(), ActivationState::Enabled);
    }

    #[tokio::test]
    async fn rejected_emission_is_not_sent_or_cached() {
        let schema = DeclaredStreams::new().declare("default", ["word"]);
        let mut h = Harness::with_validator(guaranteed(), Probe::new(), Some(schema));
        h.command("activate").await;
        h.events.clear();

        h.command("next").await;

        assert!(h.sent().is_empty());
        assert_eq!(h.pending_len().await, 0);
        assert_eq!(h.events.count(EventLevel::Error), 1);
    }

    #[tokio::test]
    async fn disabled_spout_ignores_processing_commands() {
        let mut h = Harness::new(guaranteed(), Probe::new());

        h.command("next").await;
        h.ack(&DeliveryId::from("idaaaaaa")).await;
        h.fail(&DeliveryId::from("idaaaaaa")).await;
        h.command("ack").await;

        assert_eq!(Calls::get(&h.calls.next), 0);
        assert_eq!(Calls::get(&h.calls.sync), 0);
        assert!(h.sent().is_empty());
        assert!(h.events.events().is_empty(), "no warnings while disabled");
        assert_eq!(h.dispatcher.counts().commands, 4);
    }

    #[tokio::test]
    async fn sync_follows_every_command_while_enabled() {
        let mut h = Harness::new(SpoutConfig::default(), Probe::new());
        h.command("activate").await;
        h.command("next").await;
        h.command("bogus").await;

        assert_eq!(Calls::get(&h.calls.sync), 3);
        assert_eq!(h.dispatcher.counts().ignored, 1);
    }

    #[tokio::test]
    async fn task_ids_are_forwarded_without_sync() {
        let mut h = Harness::new(SpoutConfig::default(), Probe::new());
        h.dispatcher
            .handle(InboundMessage::task_ids(vec![1, 2]))
            .await;
        h.command("activate").await;
        let syncs = Calls::get(&h.calls.sync);
        h.dispatcher
            .handle(InboundMessage::task_ids(vec![3]))
            .await;

        assert_eq!(Calls::get(&h.calls.sync), syncs);
        assert_eq!(*h.calls.task_ids.lock().unwrap(), vec![vec![1, 2], vec![3]]);
        assert_eq!(h.dispatcher.counts().commands, 1);
    }

    #[tokio::test]
    async fn failing_activate_hook_is_logged_and_loop_continues() {
        let probe = Probe {
            fail_activate: true,
            ..Probe::new()
        };
        let mut h = Harness::new(SpoutConfig::default(), probe);

        h.command("activate").await;
        h.command("next").await;

        assert_eq!(h.dispatcher.state(), ActivationState::Disabled);
        assert_eq!(Calls::get(&h.calls.next), 0);
        assert!(matches!(
            h.events.events().as_slice(),
            [SpoutEvent::ActivateFailed { cause }] if cause.contains("cannot open source")
        ));
    }

    // KeepEnabled: deactivate が成功しても Enabled のまま next が通る
    #[rstest]
    #[case::keep_enabled(DeactivateMode::KeepEnabled, 2)]
    #[case::disable(DeactivateMode::Disable, 1)]
    #[tokio::test]
    async fn next_after_deactivate_depends_on_mode(
        #[case] mode: DeactivateMode,
        #[case] expected_nexts: usize,
    ) {
        let config = SpoutConfig {
            deactivate_mode: mode,
            ..SpoutConfig::default()
        };
        let mut h = Harness::new(config, Probe::new());
        h.command("activate").await;
        h.command("next").await;
        h.command("deactivate").await;
        h.command("next").await;

        assert_eq!(Calls::get(&h.calls.deactivate), 1);
        assert_eq!(Calls::get(&h.calls.next), expected_nexts);
        assert_eq!(h.dispatcher.state(), mode.target_state());
    }

    #[tokio::test]
    async fn failing_deactivate_hook_keeps_spout_enabled() {
        let probe = Probe {
            fail_deactivate: true,
            ..Probe::new()
        };
        let config = SpoutConfig {
            deactivate_mode: DeactivateMode::Disable,
            ..SpoutConfig::default()
        };
        let mut h = Harness::new(config, probe);
        h.command("activate").await;
        h.command("deactivate").await;

        assert_eq!(h.dispatcher.state(), ActivationState::Enabled);
        assert_eq!(h.events.count(EventLevel::Error), 1);
    }

    #[tokio::test]
    async fn failing_next_is_logged_and_loop_continues() {
        let probe = Probe {
            fail_next: true,
            ..Probe::new()
        };
        let mut h = Harness::new(SpoutConfig::default(), probe);
        h.command("activate").await;
        h.command("next").await;
        h.command("next").await;

        assert_eq!(Calls::get(&h.calls.next), 2);
        assert_eq!(h.events.count(EventLevel::Error), 2);
        assert!(h.sent().is_empty());
    }

    #[tokio::test]
    async fn pending_entry_expires_without_ack() {
        let mut h = Harness::new(guaranteed(), Probe::new());
        h.command("activate").await;
        h.command("next").await;
        let id = sent_id(&h.sent()[0]);

        h.clock.advance(Duration::from_secs(30));
        h.ack(&id).await;

        assert_eq!(h.dispatcher.counts().unknown_acks, 1);
        assert!(!h.contains(&id).await);
    }

    #[tokio::test]
    async fn fail_refreshes_the_retry_window() {
        let mut h = Harness::new(guaranteed(), Probe::new());
        h.command("activate").await;
        h.command("next").await;
        let id = sent_id(&h.sent()[0]);

        h.clock.advance(Duration::from_secs(20));
        h.fail(&id).await;
        h.clock.advance(Duration::from_secs(20));
        h.ack(&id).await;

        assert_eq!(h.dispatcher.counts().acked, 1);
    }

    #[tokio::test]
    async fn run_processes_in_order_until_transport_closes() {
        let (transport, mut peer) = ChannelTransport::pair();
        let events = RecordingEventSink::new();
        let dispatcher = SpoutBuilder::new(Probe::new(), transport)
            .config(guaranteed())
            .clock(ManualClock::default())
            .event_sink(events.clone())
            .build()
            .unwrap();

        peer.command("activate");
        peer.command("next");
        let handle = tokio::spawn(dispatcher.run_until_closed());

        let first = peer.recv().await.unwrap();
        let id = sent_id(&first);
        peer.fail(id.clone());
        peer.command("next");
        peer.ack(id);
        peer.close();

        let report = handle.await.unwrap();
        let rest = peer.drain();

        // fail の再送は後続の next より先
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0], first);
        assert_ne!(rest[1].id, first.id);

        assert_eq!(report.reason, StopReason::TransportClosed);
        assert_eq!(report.status.counts.commands, 5);
        assert_eq!(report.status.counts.acked, 1);
        assert_eq!(report.status.pending, 1);
        assert!(matches!(
            events.events().last(),
            Some(SpoutEvent::Stopped { reason: StopReason::TransportClosed, .. })
        ));
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_request() {
        let (transport, _peer) = ChannelTransport::pair();
        let dispatcher = SpoutBuilder::new(Probe::new(), transport)
            .build()
            .unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(dispatcher.run(shutdown_rx));
        shutdown_tx.send(true).unwrap();

        let report = handle.await.unwrap();
        assert_eq!(report.reason, StopReason::ShutdownRequested);
        assert_eq!(report.status.state, ActivationState::Disabled);
    }
}
