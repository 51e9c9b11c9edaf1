use crate::model::{ModelId, NewOrder, OrderDetails, OrderStatus};
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order with its line items in one transaction.
    ///
    /// Unit prices are snapshotted from the current product rows, and the
    /// daily aggregate for the order's local date is upserted atomically in
    /// the same transaction. An empty item list is rejected.
    async fn create_order(
        &self,
        new_order: &NewOrder,
    ) -> Result<OrderDetails, Box<dyn Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: ModelId,
    ) -> Result<Option<OrderDetails>, Box<dyn Error + Send + Sync>>;

    /// A user's orders, newest first.
    async fn list_orders(
        &self,
        user_id: ModelId,
    ) -> Result<Vec<OrderDetails>, Box<dyn Error + Send + Sync>>;

    /// Fresh read of the currently persisted status, used by the status
    /// watcher before every transition. `None` means no row exists.
    async fn persisted_status(
        &self,
        id: ModelId,
    ) -> Result<Option<OrderStatus>, Box<dyn Error + Send + Sync>>;

    async fn set_status(
        &self,
        id: ModelId,
        status: OrderStatus,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
