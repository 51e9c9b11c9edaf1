use crate::model::OrderDetails;
use async_trait::async_trait;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("messaging api rejected the request: {0}")]
    Api(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a product photo comes from: a local media file or an http(s)
/// reference the messaging service can fetch itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    Path(PathBuf),
    Url(String),
}

impl PhotoSource {
    pub fn from_image_ref(image: &str) -> Self {
        if image.starts_with("http://") || image.starts_with("https://") {
            PhotoSource::Url(image.to_string())
        } else {
            PhotoSource::Path(PathBuf::from(image))
        }
    }
}

/// Outbound messaging channel. One configured destination; text supports a
/// bold/italic HTML subset.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError>;
    async fn send_photo(&self, photo: PhotoSource, caption: &str) -> Result<(), NotifyError>;
}

/// Formats and sends order notifications.
///
/// Failures never leave this type: an order must save successfully even if
/// the outbound notification fails, so everything is logged and swallowed
/// at this boundary. The text message always goes out before any photo, and
/// each photo send is independent of the others.
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
    timezone: Tz,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn Messenger>, timezone: Tz) -> Self {
        Self { messenger, timezone }
    }

    pub async fn notify_order(&self, order: &OrderDetails, is_new: bool) {
        let text = self.format_order_message(order, is_new);

        if let Err(e) = self.messenger.send_text(&text).await {
            error!(order_id = order.order.id, error = %e, "Order notification text send failed");
            return;
        }

        for item in &order.items {
            let Some(image) = &item.product_image else {
                continue;
            };
            let caption = format!("Product photo from order #{}", order.order.id);
            if let Err(e) = self
                .messenger
                .send_photo(PhotoSource::from_image_ref(image), &caption)
                .await
            {
                error!(
                    order_id = order.order.id,
                    product = %item.product_name,
                    error = %e,
                    "Order notification photo send failed"
                );
            }
        }

        info!(order_id = order.order.id, is_new, "Sent order notification");
    }

    /// Plain text-send primitive, used by the daily report job.
    pub async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        self.messenger.send_text(text).await
    }

    pub fn format_order_message(&self, order: &OrderDetails, is_new: bool) -> String {
        let header = if is_new {
            "NEW FLOWER ORDER"
        } else {
            "ORDER STATUS UPDATED"
        };
        let comment = if order.order.comment.is_empty() {
            "none"
        } else {
            order.order.comment.as_str()
        };
        let created = order
            .order
            .created_at
            .with_timezone(&self.timezone)
            .format("%d.%m.%Y %H:%M");
        let delivery = order
            .order
            .delivery_time
            .with_timezone(&self.timezone)
            .format("%d.%m.%Y %H:%M");

        let mut message = vec![
            format!("🌸 <b>{header}</b> 🌸\n"),
            "📦 <b>Order details:</b>".to_string(),
            format!("🆔 Number: {}", order.order.id),
            format!("📅 Date: {created}"),
            format!("⏰ Delivery: {delivery}"),
            format!("📍 Address: <i>{}</i>", order.order.delivery_address),
            format!("💬 Comment: <i>{comment}</i>"),
            format!("🚚 Status: {}\n", order.order.status.label()),
            "<b>Order contents:</b>".to_string(),
        ];

        for item in &order.items {
            message.push(format!(
                "➖ {} ({} pcs) - {}₽",
                item.product_name, item.item.quantity, item.item.price
            ));
        }

        message.push(format!("\n💰 <b>TOTAL:</b> {}₽", order.total_price()));
        message.join("\n")
    }
}
