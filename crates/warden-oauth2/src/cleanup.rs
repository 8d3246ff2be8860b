//! Periodic removal of expired access tokens.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryTokenStore;

/// Handle to a running cleanup job.
///
/// Dropping the handle leaves the job running; call [`stop`](Self::stop) to
/// end it.
#[derive(Debug)]
pub struct CleanupJob {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl CleanupJob {
    /// Signals the job to stop and waits for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }

    /// Whether the job has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a task that calls
/// [`remove_old_access_tokens`](MemoryTokenStore::remove_old_access_tokens)
/// once at startup and then every `lifespan`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_cleanup_job(store: Arc<MemoryTokenStore>, lifespan: Duration) -> CleanupJob {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let period = lifespan.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        // The first tick completes immediately, so the first sweep runs at
        // startup.
        let mut interval = tokio::time::interval(period);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    debug!("token cleanup job stopped");
                    break;
                }
                _ = interval.tick() => {
                    let removed = store.remove_old_access_tokens(lifespan);
                    if removed > 0 {
                        info!(removed, "removed expired access tokens");
                    }
                }
            }
        }
    });

    CleanupJob {
        shutdown_tx: Some(shutdown_tx),
        task,
    }
}
