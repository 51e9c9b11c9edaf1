use crate::entities::review;
use crate::model::{ModelId, NewReview};
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create_review(
        &self,
        product_id: ModelId,
        new_review: &NewReview,
    ) -> Result<review::Model, Box<dyn Error + Send + Sync>>;

    /// Reviews for one product, newest first.
    async fn list_reviews(
        &self,
        product_id: ModelId,
    ) -> Result<Vec<review::Model>, Box<dyn Error + Send + Sync>>;
}
