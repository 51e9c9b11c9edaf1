use crate::model::{ModelId, NewOrder, OrderDetails, OrderStatus, NotificationJob};
use crate::queue::NotificationQueue;
use crate::storage::OrderStore;
use std::error::Error;
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::{error, info, warn};

#[derive(Debug, ThisError)]
pub enum ServiceError {
    #[error("order must contain at least one item")]
    EmptyOrder,
    #[error("order not found: {0}")]
    OrderNotFound(ModelId),
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error(transparent)]
    Storage(#[from] Box<dyn Error + Send + Sync>),
}

/// Use-case layer for the ordering flow.
///
/// Status transitions and order creation go through here so the
/// notification hand-off is an explicit call, not a save hook: the storage
/// layer never fires side effects on its own.
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    queue: Arc<dyn NotificationQueue>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderStore>, queue: Arc<dyn NotificationQueue>) -> Self {
        Self { orders, queue }
    }

    /// Create an order from a customer submission.
    ///
    /// Zero-quantity selections are dropped before anything is persisted; a
    /// submission with nothing left is a validation error and no partial
    /// order survives. Exactly one creation notification is enqueued.
    pub async fn create_order(&self, mut new_order: NewOrder) -> Result<OrderDetails, ServiceError> {
        new_order.items.retain(|sel| sel.quantity > 0);
        if new_order.items.is_empty() {
            return Err(ServiceError::EmptyOrder);
        }

        let details = self.orders.create_order(&new_order).await?;
        info!(
            order_id = details.order.id,
            total = %details.total_price(),
            "Created order"
        );

        self.enqueue_notification(NotificationJob {
            order_id: details.order.id,
            is_new: true,
        })
        .await;

        Ok(details)
    }

    /// Staff status transition.
    ///
    /// Compares against a fresh read of the persisted status. A missing
    /// order is a data error, logged and treated as a no-op. A changed
    /// status enqueues exactly one status-change notification; setting the
    /// same status again enqueues nothing.
    pub async fn update_status(
        &self,
        order_id: ModelId,
        new_status: OrderStatus,
    ) -> Result<(), ServiceError> {
        let Some(current) = self.orders.persisted_status(order_id).await? else {
            warn!(order_id, "Status update for unknown order, ignoring");
            return Ok(());
        };

        if current == new_status {
            return Ok(());
        }

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        self.orders.set_status(order_id, new_status).await?;
        info!(order_id, from = %current, to = %new_status, "Order status changed");

        self.enqueue_notification(NotificationJob {
            order_id,
            is_new: false,
        })
        .await;

        Ok(())
    }

    /// Re-submit an existing order's product selection as a brand-new order.
    /// Prices are re-snapshotted at current catalog prices and the full
    /// creation flow (aggregate update, creation notification) runs again.
    pub async fn reorder(
        &self,
        order_id: ModelId,
        user_id: ModelId,
    ) -> Result<OrderDetails, ServiceError> {
        let source = self
            .orders
            .get_order(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        let new_order = NewOrder {
            user_id,
            delivery_address: source.order.delivery_address.clone(),
            delivery_time: source.order.delivery_time,
            comment: source.order.comment.clone(),
            items: source
                .items
                .iter()
                .map(|i| crate::model::OrderItemSelection {
                    product_id: i.item.product_id,
                    quantity: i.item.quantity,
                })
                .collect(),
        };

        self.create_order(new_order).await
    }

    pub async fn get_order(&self, id: ModelId) -> Result<Option<OrderDetails>, ServiceError> {
        Ok(self.orders.get_order(id).await?)
    }

    pub async fn list_orders(&self, user_id: ModelId) -> Result<Vec<OrderDetails>, ServiceError> {
        Ok(self.orders.list_orders(user_id).await?)
    }

    /// The business action is already committed by the time we get here, so
    /// a queue failure is logged and swallowed.
    async fn enqueue_notification(&self, job: NotificationJob) {
        if let Err(e) = self.queue.enqueue(job).await {
            error!(
                order_id = job.order_id,
                is_new = job.is_new,
                error = %e,
                "Failed to enqueue order notification"
            );
        }
    }
}
