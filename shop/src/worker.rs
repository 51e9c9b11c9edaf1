use crate::notify::Notifier;
use crate::queue::NotificationQueue;
use crate::storage::OrderStore;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, trace, warn};

/// Background consumer of the notification queue.
///
/// One job in flight at a time so sends to the messaging channel never
/// interleave. Order details are loaded fresh when the job is picked up, so
/// the message reflects the persisted state, not the request-time snapshot.
pub struct NotificationWorker {
    queue: Arc<dyn NotificationQueue>,
    orders: Arc<dyn OrderStore>,
    notifier: Arc<Notifier>,
    sleep_ms: u64,
}

impl NotificationWorker {
    pub fn new(
        queue: Arc<dyn NotificationQueue>,
        orders: Arc<dyn OrderStore>,
        notifier: Arc<Notifier>,
        sleep_ms: u64,
    ) -> Self {
        Self {
            queue,
            orders,
            notifier,
            sleep_ms,
        }
    }

    /// Handle at most one queued job. Returns whether a job was dequeued.
    ///
    /// Dispatch problems (missing order, load failure, send failure) are
    /// logged and swallowed here; only a queue failure surfaces to the loop.
    pub async fn tick(&self) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let Some(job) = self.queue.dequeue().await? else {
            trace!("Notification queue empty");
            return Ok(false);
        };

        match self.orders.get_order(job.order_id).await {
            Ok(Some(details)) => {
                self.notifier.notify_order(&details, job.is_new).await;
            }
            Ok(None) => {
                warn!(order_id = job.order_id, "Notification job for unknown order, skipping");
            }
            Err(e) => {
                error!(order_id = job.order_id, error = %e, "Failed to load order for notification");
            }
        }

        Ok(true)
    }

    pub async fn run(&self) {
        loop {
            match self.tick().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(Duration::from_millis(self.sleep_ms)).await,
                Err(e) => {
                    error!(error = %e, "Notification queue error");
                    tokio::time::sleep(Duration::from_millis(self.sleep_ms)).await;
                }
            }
        }
    }
}
