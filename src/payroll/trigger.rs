//! Fire-and-forget handoff of payroll runs to a background worker.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{EngineError, EngineResult};

use super::{PayrollRunner, RunRequest};

/// Queues payroll runs for a background worker.
///
/// [`RunTrigger::submit`] returns as soon as the request is queued; the
/// worker runs requests one at a time in submission order. Each run executes
/// in its own task, so a run that panics is logged and the worker moves on.
#[derive(Debug, Clone)]
pub struct RunTrigger {
    sender: mpsc::UnboundedSender<RunRequest>,
}

impl RunTrigger {
    /// Spawns the worker on the current runtime and returns the trigger
    /// together with the worker's handle.
    ///
    /// The worker exits once every clone of the trigger has been dropped.
    pub fn spawn(runner: PayrollRunner) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<RunRequest>();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let period_id = request.period_id;
                let runner = runner.clone();
                match tokio::spawn(async move { runner.run(request).await }).await {
                    Ok(outcome) => debug!(period_id, ?outcome, "Queued payroll run finished"),
                    Err(e) => error!(period_id, error = %e, "Queued payroll run failed"),
                }
            }
            info!("Payroll run worker stopped");
        });

        (Self { sender }, handle)
    }

    /// Queues a run. Fails only if the worker has stopped.
    pub fn submit(&self, request: RunRequest) -> EngineResult<()> {
        debug!(period_id = request.period_id, "Payroll run queued");
        self.sender
            .send(request)
            .map_err(|_| EngineError::QueueClosed)
    }
}
