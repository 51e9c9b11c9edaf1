#![allow(dead_code)]

//! Shared in-memory fakes for the integration test suites. They mirror the
//! storage contracts (price snapshotting, aggregate upsert, newest-first
//! listings) without needing a database.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shop::entities::{daily_report, order, order_item, product, review};
use shop::model::{
    ModelId, NewOrder, NewProduct, NewReview, OrderDetails, OrderItemDetails, OrderStatus,
};
use shop::notify::{Messenger, NotifyError, PhotoSource};
use shop::storage::{CatalogStore, OrderStore, ReportStore, ReviewStore};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory stand-in for `ProdStorage`, implementing all store traits.
pub struct InMemoryShop {
    pub products: Mutex<HashMap<ModelId, product::Model>>,
    pub orders: Mutex<HashMap<ModelId, OrderDetails>>,
    pub reports: Mutex<HashMap<NaiveDate, daily_report::Model>>,
    pub reviews: Mutex<Vec<review::Model>>,
    next_id: AtomicI64,
    pub timezone: Tz,
}

impl InMemoryShop {
    pub fn new() -> Self {
        Self {
            products: Mutex::new(HashMap::new()),
            orders: Mutex::new(HashMap::new()),
            reports: Mutex::new(HashMap::new()),
            reviews: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            timezone: chrono_tz::Europe::Moscow,
        }
    }

    pub fn next_id(&self) -> ModelId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn seed_product(&self, name: &str, price_cents: i64, image: Option<&str>) -> ModelId {
        let id = self.next_id();
        let now = Utc::now();
        self.products.lock().unwrap().insert(
            id,
            product::Model {
                id,
                name: name.to_string(),
                price: Decimal::new(price_cents, 2),
                description: String::new(),
                image: image.map(|s| s.to_string()),
                available: true,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn set_price(&self, product_id: ModelId, price_cents: i64) {
        let mut products = self.products.lock().unwrap();
        let product = products.get_mut(&product_id).unwrap();
        product.price = Decimal::new(price_cents, 2);
        product.updated_at = Utc::now();
    }

    pub fn report_for_today(&self) -> Option<daily_report::Model> {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        self.reports.lock().unwrap().get(&today).cloned()
    }
}

#[async_trait]
impl OrderStore for InMemoryShop {
    async fn create_order(
        &self,
        new_order: &NewOrder,
    ) -> Result<OrderDetails, Box<dyn Error + Send + Sync>> {
        if new_order.items.is_empty() {
            return Err("Order must contain at least one item".into());
        }

        let now = Utc::now();
        let products = self.products.lock().unwrap();
        let order_id = self.next_id();

        let mut items = Vec::new();
        for sel in &new_order.items {
            if sel.quantity <= 0 {
                return Err(format!("Invalid quantity for product {}", sel.product_id).into());
            }
            let product = products
                .get(&sel.product_id)
                .ok_or_else(|| format!("Product not found: {}", sel.product_id))?;
            if !product.available {
                return Err(format!("Product not available: {}", product.id).into());
            }
            items.push(OrderItemDetails {
                item: order_item::Model {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    order_id,
                    product_id: product.id,
                    quantity: sel.quantity,
                    price: product.price,
                    created_at: now,
                },
                product_name: product.name.clone(),
                product_image: product.image.clone(),
            });
        }
        drop(products);

        let details = OrderDetails {
            order: order::Model {
                id: order_id,
                user_id: new_order.user_id,
                delivery_address: new_order.delivery_address.clone(),
                delivery_time: new_order.delivery_time,
                created_at: now,
                status: OrderStatus::New,
                comment: new_order.comment.clone(),
            },
            items,
        };

        // Same unit of work as the order insert, like the real upsert
        let date = now.with_timezone(&self.timezone).date_naive();
        let total = details.total_price();
        let mut reports = self.reports.lock().unwrap();
        let entry = reports.entry(date).or_insert_with(|| daily_report::Model {
            id: 1,
            date,
            order_count: 0,
            total_revenue: Decimal::ZERO,
        });
        entry.order_count += 1;
        entry.total_revenue += total;
        drop(reports);

        self.orders.lock().unwrap().insert(order_id, details.clone());
        Ok(details)
    }

    async fn get_order(
        &self,
        id: ModelId,
    ) -> Result<Option<OrderDetails>, Box<dyn Error + Send + Sync>> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn list_orders(
        &self,
        user_id: ModelId,
    ) -> Result<Vec<OrderDetails>, Box<dyn Error + Send + Sync>> {
        let mut orders: Vec<OrderDetails> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.order.id.cmp(&a.order.id));
        Ok(orders)
    }

    async fn persisted_status(
        &self,
        id: ModelId,
    ) -> Result<Option<OrderStatus>, Box<dyn Error + Send + Sync>> {
        Ok(self.orders.lock().unwrap().get(&id).map(|o| o.order.status))
    }

    async fn set_status(
        &self,
        id: ModelId,
        status: OrderStatus,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| format!("Order not found: {}", id))?;
        order.order.status = status;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryShop {
    async fn list_available_products(
        &self,
    ) -> Result<Vec<product::Model>, Box<dyn Error + Send + Sync>> {
        let mut products: Vec<product::Model> = self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.available)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(products)
    }

    async fn get_product(
        &self,
        id: ModelId,
    ) -> Result<Option<product::Model>, Box<dyn Error + Send + Sync>> {
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }

    async fn create_product(
        &self,
        new_product: &NewProduct,
    ) -> Result<product::Model, Box<dyn Error + Send + Sync>> {
        let id = self.next_id();
        let now = Utc::now();
        let model = product::Model {
            id,
            name: new_product.name.clone(),
            price: new_product.price,
            description: new_product.description.clone(),
            image: new_product.image.clone(),
            available: new_product.available,
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().insert(id, model.clone());
        Ok(model)
    }

    async fn set_product_availability(
        &self,
        id: ModelId,
        available: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .get_mut(&id)
            .ok_or_else(|| format!("Product not found: {}", id))?;
        product.available = available;
        Ok(())
    }
}

#[async_trait]
impl ReportStore for InMemoryShop {
    async fn get_report(
        &self,
        date: NaiveDate,
    ) -> Result<Option<daily_report::Model>, Box<dyn Error + Send + Sync>> {
        Ok(self.reports.lock().unwrap().get(&date).cloned())
    }

    async fn list_reports(
        &self,
    ) -> Result<Vec<daily_report::Model>, Box<dyn Error + Send + Sync>> {
        let mut reports: Vec<daily_report::Model> =
            self.reports.lock().unwrap().values().cloned().collect();
        reports.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(reports)
    }
}

#[async_trait]
impl ReviewStore for InMemoryShop {
    async fn create_review(
        &self,
        product_id: ModelId,
        new_review: &NewReview,
    ) -> Result<review::Model, Box<dyn Error + Send + Sync>> {
        let model = review::Model {
            id: self.next_id(),
            product_id,
            user_id: new_review.user_id,
            rating: new_review.rating,
            comment: new_review.comment.clone(),
            created_at: Utc::now(),
        };
        self.reviews.lock().unwrap().push(model.clone());
        Ok(model)
    }

    async fn list_reviews(
        &self,
        product_id: ModelId,
    ) -> Result<Vec<review::Model>, Box<dyn Error + Send + Sync>> {
        let mut reviews: Vec<review::Model> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(reviews)
    }
}

/// Messenger that records every send; photo sends can be forced to fail.
pub struct RecordingMessenger {
    pub texts: Mutex<Vec<String>>,
    pub photos: Mutex<Vec<(PhotoSource, String)>>,
    pub fail_text: bool,
    pub fail_photos: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self {
            texts: Mutex::new(Vec::new()),
            photos: Mutex::new(Vec::new()),
            fail_text: false,
            fail_photos: false,
        }
    }

    pub fn failing_photos() -> Self {
        Self {
            fail_photos: true,
            ..Self::new()
        }
    }

    pub fn failing_text() -> Self {
        Self {
            fail_text: true,
            ..Self::new()
        }
    }

    pub fn text_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }

    pub fn photo_count(&self) -> usize {
        self.photos.lock().unwrap().len()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        if self.fail_text {
            return Err(NotifyError::Api("text send refused".to_string()));
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_photo(&self, photo: PhotoSource, caption: &str) -> Result<(), NotifyError> {
        if self.fail_photos {
            return Err(NotifyError::Api("photo send refused".to_string()));
        }
        self.photos
            .lock()
            .unwrap()
            .push((photo, caption.to_string()));
        Ok(())
    }
}

pub fn order_form(user_id: ModelId, items: Vec<(ModelId, i32)>) -> NewOrder {
    NewOrder {
        user_id,
        delivery_address: "10 Pushkin St, Moscow".to_string(),
        delivery_time: Utc::now() + chrono::Duration::hours(2),
        comment: String::new(),
        items: items
            .into_iter()
            .map(|(product_id, quantity)| shop::model::OrderItemSelection {
                product_id,
                quantity,
            })
            .collect(),
    }
}
