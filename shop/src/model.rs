use crate::entities::{order, order_item};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

pub type ModelId = i64;

/// Order lifecycle status.
///
/// `completed` and `canceled` are terminal; every other state can always be
/// canceled. Transitions are staff actions, validated in the service layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "new")]
    #[strum(to_string = "new")]
    New,
    #[sea_orm(string_value = "in_progress")]
    #[strum(to_string = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "in_delivery")]
    #[strum(to_string = "in_delivery")]
    InDelivery,
    #[sea_orm(string_value = "completed")]
    #[strum(to_string = "completed")]
    Completed,
    #[sea_orm(string_value = "canceled")]
    #[strum(to_string = "canceled")]
    Canceled,
}

impl OrderStatus {
    /// Human-readable label used in outbound notifications.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::InProgress => "In progress",
            OrderStatus::InDelivery => "In delivery",
            OrderStatus::Completed => "Completed",
            OrderStatus::Canceled => "Canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }

    /// Whether `next` is a legal staff transition from this status.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match self {
            OrderStatus::New => matches!(next, OrderStatus::InProgress | OrderStatus::Canceled),
            OrderStatus::InProgress => {
                matches!(next, OrderStatus::InDelivery | OrderStatus::Canceled)
            }
            OrderStatus::InDelivery => {
                matches!(next, OrderStatus::Completed | OrderStatus::Canceled)
            }
            OrderStatus::Completed | OrderStatus::Canceled => false,
        }
    }
}

/// One line item joined with the product fields the dispatcher needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDetails {
    pub item: order_item::Model,
    pub product_name: String,
    pub product_image: Option<String>,
}

impl OrderItemDetails {
    pub fn line_total(&self) -> Decimal {
        self.item.price * Decimal::from(self.item.quantity)
    }
}

/// Combined order model with its line items, built from SeaORM entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: order::Model,
    pub items: Vec<OrderItemDetails>,
}

impl OrderDetails {
    pub fn id(&self) -> ModelId {
        self.order.id
    }

    /// Exact-decimal order total: sum of unit price times quantity.
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(|i| i.line_total()).sum()
    }
}

/// A (product, quantity) pair picked by the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemSelection {
    pub product_id: ModelId,
    pub quantity: i32,
}

/// Customer order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: ModelId,
    pub delivery_address: String,
    pub delivery_time: DateTime<Utc>,
    #[serde(default)]
    pub comment: String,
    pub items: Vec<OrderItemSelection>,
}

/// Catalog entry payload (seed/admin use; the catalog itself is owned
/// elsewhere).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Review submission for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub user_id: ModelId,
    pub rating: i16,
    pub comment: String,
}

/// A queued request to notify the messaging channel about one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub order_id: ModelId,
    pub is_new: bool,
}
