use crate::entities::{daily_report, order, order_item, product, review};
use crate::model::{ModelId, NewOrder, NewProduct, NewReview, OrderDetails, OrderItemDetails, OrderStatus};
use crate::storage::{CatalogStore, OrderStore, ReportStore, ReviewStore};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    IntoActiveModel, NotSet, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::error::Error;
use tracing::debug;

/// SeaORM-backed storage shared by the backend, the notification worker and
/// the reporter. One connection pool, one configured timezone for bucketing
/// daily aggregates.
#[derive(Clone)]
pub struct ProdStorage {
    pub db: DatabaseConnection,
    pub timezone: Tz,
}

impl ProdStorage {
    pub async fn new(
        database_url: &str,
        timezone: Tz,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let db = Database::connect(database_url).await?;
        Ok(Self { db, timezone })
    }

    pub fn with_connection(db: DatabaseConnection, timezone: Tz) -> Self {
        Self { db, timezone }
    }

    /// The atomic daily-aggregate upsert: one statement, no
    /// read-modify-write, safe under concurrent order creations.
    pub fn daily_report_upsert(date: NaiveDate, total: Decimal) -> sea_orm::Insert<daily_report::ActiveModel> {
        daily_report::Entity::insert(daily_report::ActiveModel {
            id: NotSet,
            date: Set(date),
            order_count: Set(1),
            total_revenue: Set(total),
        })
        .on_conflict(
            OnConflict::column(daily_report::Column::Date)
                .value(
                    daily_report::Column::OrderCount,
                    Expr::col(daily_report::Column::OrderCount).add(1),
                )
                .value(
                    daily_report::Column::TotalRevenue,
                    Expr::col(daily_report::Column::TotalRevenue).add(total),
                )
                .to_owned(),
        )
    }

    async fn load_items<C: ConnectionTrait>(
        conn: &C,
        order_ids: &[ModelId],
    ) -> Result<HashMap<ModelId, Vec<OrderItemDetails>>, Box<dyn Error + Send + Sync>> {
        let rows = order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids.to_vec()))
            .find_also_related(product::Entity)
            .order_by_asc(order_item::Column::Id)
            .all(conn)
            .await?;

        let mut by_order: HashMap<ModelId, Vec<OrderItemDetails>> = HashMap::new();
        for (item, maybe_product) in rows {
            let product = maybe_product
                .ok_or_else(|| format!("Product not found for order item {}", item.id))?;
            by_order.entry(item.order_id).or_default().push(OrderItemDetails {
                item,
                product_name: product.name,
                product_image: product.image,
            });
        }
        Ok(by_order)
    }
}

#[async_trait]
impl OrderStore for ProdStorage {
    async fn create_order(
        &self,
        new_order: &NewOrder,
    ) -> Result<OrderDetails, Box<dyn Error + Send + Sync>> {
        if new_order.items.is_empty() {
            return Err("Order must contain at least one item".into());
        }

        let txn = self.db.begin().await?;

        let product_ids: Vec<ModelId> =
            new_order.items.iter().map(|sel| sel.product_id).collect();
        let products: HashMap<ModelId, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let now = Utc::now();
        let order_row = order::ActiveModel {
            id: NotSet,
            user_id: Set(new_order.user_id),
            delivery_address: Set(new_order.delivery_address.clone()),
            delivery_time: Set(new_order.delivery_time),
            created_at: Set(now),
            status: Set(OrderStatus::New),
            comment: Set(new_order.comment.clone()),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for sel in &new_order.items {
            if sel.quantity <= 0 {
                return Err(format!(
                    "Invalid quantity {} for product {}",
                    sel.quantity, sel.product_id
                )
                .into());
            }
            let product = products
                .get(&sel.product_id)
                .ok_or_else(|| format!("Product not found: {}", sel.product_id))?;
            if !product.available {
                return Err(format!("Product not available: {}", product.id).into());
            }

            // Snapshot the unit price; later catalog price changes must not
            // touch this order.
            let item_row = order_item::ActiveModel {
                id: NotSet,
                order_id: Set(order_row.id),
                product_id: Set(product.id),
                quantity: Set(sel.quantity),
                price: Set(product.price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;

            items.push(OrderItemDetails {
                item: item_row,
                product_name: product.name.clone(),
                product_image: product.image.clone(),
            });
        }

        let details = OrderDetails {
            order: order_row,
            items,
        };

        // Daily aggregate update shares this transaction: if it fails the
        // order insert rolls back with it.
        let local_date = now.with_timezone(&self.timezone).date_naive();
        Self::daily_report_upsert(local_date, details.total_price())
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        debug!("Created order {} with {} items", details.order.id, details.items.len());
        Ok(details)
    }

    async fn get_order(
        &self,
        id: ModelId,
    ) -> Result<Option<OrderDetails>, Box<dyn Error + Send + Sync>> {
        let Some(order_row) = order::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut by_order = Self::load_items(&self.db, &[order_row.id]).await?;
        Ok(Some(OrderDetails {
            items: by_order.remove(&order_row.id).unwrap_or_default(),
            order: order_row,
        }))
    }

    async fn list_orders(
        &self,
        user_id: ModelId,
    ) -> Result<Vec<OrderDetails>, Box<dyn Error + Send + Sync>> {
        let orders = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let order_ids: Vec<ModelId> = orders.iter().map(|o| o.id).collect();
        let mut by_order = Self::load_items(&self.db, &order_ids).await?;

        Ok(orders
            .into_iter()
            .map(|order_row| OrderDetails {
                items: by_order.remove(&order_row.id).unwrap_or_default(),
                order: order_row,
            })
            .collect())
    }

    async fn persisted_status(
        &self,
        id: ModelId,
    ) -> Result<Option<OrderStatus>, Box<dyn Error + Send + Sync>> {
        let row = order::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(|o| o.status))
    }

    async fn set_status(
        &self,
        id: ModelId,
        status: OrderStatus,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut row = order::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| format!("Order not found: {}", id))?
            .into_active_model();
        row.status = Set(status);
        row.update(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for ProdStorage {
    async fn list_available_products(
        &self,
    ) -> Result<Vec<product::Model>, Box<dyn Error + Send + Sync>> {
        let products = product::Entity::find()
            .filter(product::Column::Available.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(products)
    }

    async fn get_product(
        &self,
        id: ModelId,
    ) -> Result<Option<product::Model>, Box<dyn Error + Send + Sync>> {
        Ok(product::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn create_product(
        &self,
        new_product: &NewProduct,
    ) -> Result<product::Model, Box<dyn Error + Send + Sync>> {
        let now = Utc::now();
        let row = product::ActiveModel {
            id: NotSet,
            name: Set(new_product.name.clone()),
            price: Set(new_product.price),
            description: Set(new_product.description.clone()),
            image: Set(new_product.image.clone()),
            available: Set(new_product.available),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(row)
    }

    async fn set_product_availability(
        &self,
        id: ModelId,
        available: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut row = product::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| format!("Product not found: {}", id))?
            .into_active_model();
        row.available = Set(available);
        row.updated_at = Set(Utc::now());
        row.update(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl ReportStore for ProdStorage {
    async fn get_report(
        &self,
        date: NaiveDate,
    ) -> Result<Option<daily_report::Model>, Box<dyn Error + Send + Sync>> {
        let row = daily_report::Entity::find()
            .filter(daily_report::Column::Date.eq(date))
            .one(&self.db)
            .await?;
        Ok(row)
    }

    async fn list_reports(
        &self,
    ) -> Result<Vec<daily_report::Model>, Box<dyn Error + Send + Sync>> {
        let rows = daily_report::Entity::find()
            .order_by_desc(daily_report::Column::Date)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ReviewStore for ProdStorage {
    async fn create_review(
        &self,
        product_id: ModelId,
        new_review: &NewReview,
    ) -> Result<review::Model, Box<dyn Error + Send + Sync>> {
        let row = review::ActiveModel {
            id: NotSet,
            product_id: Set(product_id),
            user_id: Set(new_review.user_id),
            rating: Set(new_review.rating),
            comment: Set(new_review.comment.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_reviews(
        &self,
        product_id: ModelId,
    ) -> Result<Vec<review::Model>, Box<dyn Error + Send + Sync>> {
        let rows = review::Entity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::PostgresQueryBuilder;
    use sea_orm::QueryTrait;

    #[test]
    fn test_daily_report_upsert_increments_in_place() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let sql = ProdStorage::daily_report_upsert(date, Decimal::new(60000, 2))
            .into_query()
            .to_string(PostgresQueryBuilder);

        // One conditional statement, no read-modify-write
        assert!(sql.contains("ON CONFLICT (\"date\")"), "sql was: {sql}");
        assert!(
            sql.contains("\"order_count\" = \"order_count\" + 1"),
            "sql was: {sql}"
        );
        assert!(
            sql.contains("\"total_revenue\" = \"total_revenue\" + 600.00"),
            "sql was: {sql}"
        );
    }
}
