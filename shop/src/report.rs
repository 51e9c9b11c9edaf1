use crate::entities::daily_report;
use crate::notify::Notifier;
use crate::storage::ReportStore;
use chrono::Utc;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::error::Error;
use tracing::{error, info};

/// Daily sales summary sent through the messaging channel.
pub fn format_report_message(report: &daily_report::Model) -> String {
    let mut message = vec![
        "📊 <b>DAILY SALES REPORT</b>\n".to_string(),
        format!("📅 Date: {}", report.date.format("%d.%m.%Y")),
        format!("🧾 Orders: {}", report.order_count),
        format!("💰 Revenue: {}₽", report.total_revenue),
    ];

    // Average only makes sense with at least one order
    if report.order_count > 0 {
        let average =
            (report.total_revenue / Decimal::from(report.order_count)).round_dp(2);
        message.push(format!("📈 Average order: {average}₽"));
    }

    message.join("\n")
}

/// The once-a-day report job, invoked by an external scheduler.
///
/// Reads the aggregate for "today" in the configured timezone. No row means
/// no orders landed yet: log and exit. Sending is fire-and-forget, so a
/// delivery failure is logged but does not fail the job. Re-running the job
/// re-sends the current snapshot; there is no dedup.
pub async fn run_daily_report(
    reports: &dyn ReportStore,
    notifier: &Notifier,
    timezone: Tz,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let today = Utc::now().with_timezone(&timezone).date_naive();
    info!(%today, "Running daily report job");

    let Some(report) = reports.get_report(today).await? else {
        info!(%today, "No daily report for today, nothing to send");
        return Ok(());
    };

    let text = format_report_message(&report);
    if let Err(e) = notifier.send_text(&text).await {
        error!(%today, error = %e, "Failed to send daily report");
    }

    Ok(())
}
