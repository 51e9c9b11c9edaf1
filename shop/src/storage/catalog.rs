use crate::entities::product;
use crate::model::{ModelId, NewProduct};
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Products shown to customers, newest first. Unavailable products are
    /// filtered out.
    async fn list_available_products(
        &self,
    ) -> Result<Vec<product::Model>, Box<dyn Error + Send + Sync>>;

    async fn get_product(
        &self,
        id: ModelId,
    ) -> Result<Option<product::Model>, Box<dyn Error + Send + Sync>>;

    async fn create_product(
        &self,
        new_product: &NewProduct,
    ) -> Result<product::Model, Box<dyn Error + Send + Sync>>;

    async fn set_product_availability(
        &self,
        id: ModelId,
        available: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
