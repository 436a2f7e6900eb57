//! spout-cli - WordSpout を in-process transport で動かすデモ
//!
//! `spout-cli [config-file]`
//! ack / fail の流れを見るには `SPOUT_GUARANTEED_DELIVERY=true` を付ける。

mod logging;

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use spout_core::domain::{DEFAULT_STREAM, TaskId};
use spout_core::impls::{ChannelTransport, DeclaredStreams, TransportPeer};
use spout_core::{
    Emission, Emitter, OutboundTuple, Spout, SpoutBuilder, SpoutConfig, SpoutError, SpoutHandle,
};

const WORDS: &[&str] = &["storm", "spout", "tuple", "ack", "fail"];

/// spout からの tuple を待つ上限。pending が先に期限切れになると再送は来ない
const RECV_WAIT: Duration = Duration::from_secs(2);

/// 単語を順番に流すデモ用 spout
struct WordSpout {
    seq: u64,
}

impl Spout for WordSpout {
    fn next(&mut self, emitter: &mut Emitter<'_>) -> Result<(), SpoutError> {
        let word = WORDS[(self.seq as usize) % WORDS.len()];
        self.seq += 1;
        emitter.emit_with(Emission::new(vec![json!(word), json!(self.seq)]).need_task_ids(true));
        Ok(())
    }

    fn on_activate(&mut self) -> Result<(), SpoutError> {
        tracing::info!("word source opened");
        Ok(())
    }

    fn on_deactivate(&mut self) -> Result<(), SpoutError> {
        tracing::info!(emitted = self.seq, "word source paused");
        Ok(())
    }

    fn task_ids(&mut self, ids: &[TaskId]) {
        tracing::debug!(?ids, "downstream tasks");
    }
}

/// 次の tuple を `wait` まで待つ。時間切れか transport が閉じたら `None`
async fn recv_within(peer: &mut TransportPeer, wait: Duration) -> Option<OutboundTuple> {
    tokio::time::timeout(wait, peer.recv()).await.ok().flatten()
}

/// host 役のスクリプト:
/// activate → next ×3 → 1 件目を ack、2 件目を fail → deactivate → close
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = SpoutConfig::load(path.as_deref())?;
    tracing::info!(?config, "loaded configuration");

    let (transport, mut peer) = ChannelTransport::pair();
    let dispatcher = SpoutBuilder::new(WordSpout { seq: 0 }, transport)
        .config(config)
        .validator(DeclaredStreams::new().declare(DEFAULT_STREAM, ["word", "seq"]))
        .build()?;
    let handle = SpoutHandle::spawn(dispatcher);

    peer.command("activate");
    for _ in 0..3 {
        peer.command("next");
    }

    let mut emitted = Vec::new();
    for _ in 0..3 {
        let Some(tuple) = recv_within(&mut peer, RECV_WAIT).await else {
            tracing::warn!(received = emitted.len(), "spout stopped emitting");
            break;
        };
        println!("emitted:  {}", serde_json::to_string(&tuple)?);
        emitted.push(tuple);
    }

    if let Some(id) = emitted.first().and_then(|tuple| tuple.id.clone()) {
        peer.ack(id);
    }
    if let Some(id) = emitted.get(1).and_then(|tuple| tuple.id.clone()) {
        peer.fail(id);
        match recv_within(&mut peer, RECV_WAIT).await {
            Some(tuple) => println!("replayed: {}", serde_json::to_string(&tuple)?),
            None => tracing::warn!("no replay; the pending tuple may have expired"),
        }
    }

    peer.command("deactivate");
    peer.close();

    let report = handle.join().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
