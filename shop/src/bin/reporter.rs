use std::error::Error;
use std::sync::Arc;

use chrono_tz::Tz;
use shop::{
    executable_utils::{initialize_executable, initialize_tracing},
    notify::Notifier,
    report::run_daily_report,
    storage::ProdStorage,
    telegram::TelegramMessenger,
};

/// One-shot daily report sender, triggered by an external scheduler (cron).
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting reporter...");
    let config = initialize_executable()?;
    initialize_tracing(&config.reporter.log_level);

    let timezone: Tz = config
        .common
        .timezone
        .parse()
        .map_err(|e| format!("Invalid timezone in config: {e}"))?;

    let storage = ProdStorage::new(&config.common.database_url, timezone).await?;
    let messenger = Arc::new(TelegramMessenger::new(&config.telegram));
    let notifier = Notifier::new(messenger, timezone);

    run_daily_report(&storage, &notifier, timezone).await
}
