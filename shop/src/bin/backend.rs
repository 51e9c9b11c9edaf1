use std::error::Error;
use std::sync::Arc;

use chrono_tz::Tz;
use shop::{
    executable_utils::{AppState, initialize_executable, initialize_tracing, run_backend},
    notify::Notifier,
    queue::InMemoryQueue,
    service::OrderService,
    storage::ProdStorage,
    telegram::TelegramMessenger,
    worker::NotificationWorker,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting backend...");
    let config = initialize_executable()?;
    initialize_tracing(&config.backend.log_level);

    let timezone: Tz = config
        .common
        .timezone
        .parse()
        .map_err(|e| format!("Invalid timezone in config: {e}"))?;

    let storage = Arc::new(ProdStorage::new(&config.common.database_url, timezone).await?);
    let queue = Arc::new(InMemoryQueue::new());
    let messenger = Arc::new(TelegramMessenger::new(&config.telegram));
    let notifier = Arc::new(Notifier::new(messenger, timezone));

    // Single background consumer: one in-flight notification at a time
    let worker = NotificationWorker::new(
        queue.clone(),
        storage.clone(),
        notifier,
        config.worker.sleep_ms,
    );
    tokio::spawn(async move { worker.run().await });

    let state = AppState {
        orders: Arc::new(OrderService::new(storage.clone(), queue)),
        catalog: storage.clone(),
        reviews: storage.clone(),
        reports: storage,
    };

    run_backend(config.backend, state).await
}
