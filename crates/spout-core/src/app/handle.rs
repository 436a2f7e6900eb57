use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::dispatcher::Dispatcher;
use super::spout::Spout;
use super::status::RunReport;
use super::sweeper::Sweeper;
use crate::domain::SpoutError;
use crate::ports::Transport;

/// Running spout handle.
/// - `shutdown_tx` を drop すると dispatcher も sweeper も止まる
/// - `join()` で dispatcher の終了（transport close）を待てる
pub struct SpoutHandle {
    shutdown_tx: watch::Sender<bool>,
    dispatcher: JoinHandle<RunReport>,
    sweeper: Option<JoinHandle<()>>,
}

impl SpoutHandle {
    /// Spawn the dispatch loop, plus a sweeper if the dispatcher has a sweep interval.
    pub fn spawn<S, T>(dispatcher: Dispatcher<S, T>) -> Self
    where
        S: Spout + 'static,
        T: Transport + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // 間隔は SpoutBuilder で検証済み
        let sweeper = dispatcher
            .sweep_interval()
            .and_then(|interval| Sweeper::new(dispatcher.pending(), interval).ok())
            .map(|sweeper| tokio::spawn(sweeper.run(shutdown_rx.clone())));
        let dispatcher = tokio::spawn(dispatcher.run(shutdown_rx));

        Self {
            shutdown_tx,
            dispatcher,
            sweeper,
        }
    }

    /// Ask the loop to stop before its next message.
    /// A message already being handled is finished first.
    pub fn request_shutdown(&self) {
        // ignore send error: receivers may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the dispatcher to stop on its own, then stop the sweeper.
    pub async fn join(self) -> Result<RunReport, SpoutError> {
        let report = self
            .dispatcher
            .await
            .map_err(|e| SpoutError::Join(e.to_string()))?;

        let _ = self.shutdown_tx.send(true);
        if let Some(sweeper) = self.sweeper {
            sweeper.await.map_err(|e| SpoutError::Join(e.to_string()))?;
        }
        Ok(report)
    }

    pub async fn shutdown_and_join(self) -> Result<RunReport, SpoutError> {
        self.request_shutdown();
        self.join().await
    }
}
