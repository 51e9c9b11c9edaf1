use crate::entities::daily_report;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::error::Error;

/// Read side of the daily sales aggregate. Rows are created and incremented
/// by the order-creation transaction, never through this trait.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn get_report(
        &self,
        date: NaiveDate,
    ) -> Result<Option<daily_report::Model>, Box<dyn Error + Send + Sync>>;

    /// All aggregates, newest date first.
    async fn list_reports(&self)
        -> Result<Vec<daily_report::Model>, Box<dyn Error + Send + Sync>>;
}
