use crate::model::NotificationJob;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::error::Error;
use tokio::sync::Mutex;

/// Hand-off between the request path and the notification worker.
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    async fn enqueue(&self, job: NotificationJob) -> Result<(), Box<dyn Error + Send + Sync>>;
    async fn dequeue(&self) -> Result<Option<NotificationJob>, Box<dyn Error + Send + Sync>>;
}

/// In-process FIFO queue. Notifications are best-effort, so losing queued
/// jobs on shutdown is acceptable.
#[derive(Default)]
pub struct InMemoryQueue {
    queue: Mutex<VecDeque<NotificationJob>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationQueue for InMemoryQueue {
    async fn enqueue(&self, job: NotificationJob) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut queue = self.queue.lock().await;
        queue.push_back(job);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<NotificationJob>, Box<dyn Error + Send + Sync>> {
        let mut queue = self.queue.lock().await;
        Ok(queue.pop_front())
    }
}
