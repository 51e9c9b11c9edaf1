use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use common::config::{BackendConfig, Config};
use serde::Deserialize;
use std::{error::Error, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    model::{ModelId, NewOrder, NewReview, OrderStatus},
    service::{OrderService, ServiceError},
    storage::{CatalogStore, ReportStore, ReviewStore},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,
}

pub fn initialize_executable() -> Result<Config, Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    println!("Loading config from: {}", args.config);
    let config = Config::load(&args.config)?;

    Ok(config)
}

pub fn initialize_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub catalog: Arc<dyn CatalogStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub reports: Arc<dyn ReportStore>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route(
            "/api/products/{id}/reviews",
            get(list_reviews).post(create_review),
        )
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", post(update_order_status))
        .route("/api/orders/{id}/reorder", post(reorder))
        .route("/api/reports", get(list_reports))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn run_backend(
    config: BackendConfig,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = build_router(state);

    tracing::info!("Starting backend service at {}", config.server_address);
    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

fn internal_error(context: &str, e: Box<dyn Error + Send + Sync>) -> Response {
    tracing::error!(error = %e, "{context}");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
}

fn service_error(context: &str, e: ServiceError) -> Response {
    match e {
        ServiceError::EmptyOrder | ServiceError::InvalidTransition { .. } => {
            tracing::warn!(error = %e, "{context}");
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
        }
        ServiceError::OrderNotFound(_) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        ServiceError::Storage(inner) => internal_error(context, inner),
    }
}

async fn list_products(State(state): State<AppState>) -> Response {
    match state.catalog.list_available_products().await {
        Ok(products) => Json(products).into_response(),
        Err(e) => internal_error("Failed to list products", e),
    }
}

async fn get_product(State(state): State<AppState>, Path(id): Path<ModelId>) -> Response {
    match state.catalog.get_product(id).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Product not found").into_response(),
        Err(e) => internal_error("Failed to load product", e),
    }
}

async fn list_reviews(State(state): State<AppState>, Path(product_id): Path<ModelId>) -> Response {
    match state.catalog.get_product(product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, "Product not found").into_response(),
        Err(e) => return internal_error("Failed to load product", e),
    }
    match state.reviews.list_reviews(product_id).await {
        Ok(reviews) => Json(reviews).into_response(),
        Err(e) => internal_error("Failed to list reviews", e),
    }
}

async fn create_review(
    State(state): State<AppState>,
    Path(product_id): Path<ModelId>,
    Json(new_review): Json<NewReview>,
) -> Response {
    if !(1..=5).contains(&new_review.rating) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Rating must be between 1 and 5")
            .into_response();
    }
    match state.catalog.get_product(product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, "Product not found").into_response(),
        Err(e) => return internal_error("Failed to load product", e),
    }
    match state.reviews.create_review(product_id, &new_review).await {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(e) => internal_error("Failed to create review", e),
    }
}

async fn create_order(State(state): State<AppState>, Json(new_order): Json<NewOrder>) -> Response {
    match state.orders.create_order(new_order).await {
        Ok(details) => (StatusCode::CREATED, Json(details)).into_response(),
        Err(e) => service_error("Failed to create order", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub user_id: ModelId,
}

async fn list_orders(State(state): State<AppState>, Query(query): Query<OrdersQuery>) -> Response {
    match state.orders.list_orders(query.user_id).await {
        Ok(orders) => Json(orders).into_response(),
        Err(e) => service_error("Failed to list orders", e),
    }
}

async fn get_order(State(state): State<AppState>, Path(id): Path<ModelId>) -> Response {
    match state.orders.get_order(id).await {
        Ok(Some(details)) => Json(details).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Order not found").into_response(),
        Err(e) => service_error("Failed to load order", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Staff action; every accepted change flows through the status watcher in
/// the service layer and triggers exactly one notification.
async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
    Json(update): Json<StatusUpdate>,
) -> Response {
    match state.orders.update_status(id, update.status).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => service_error("Failed to update order status", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub user_id: ModelId,
}

async fn reorder(
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
    Json(request): Json<ReorderRequest>,
) -> Response {
    match state.orders.reorder(id, request.user_id).await {
        Ok(details) => (StatusCode::CREATED, Json(details)).into_response(),
        Err(e) => service_error("Failed to reorder", e),
    }
}

async fn list_reports(State(state): State<AppState>) -> Response {
    match state.reports.list_reports().await {
        Ok(reports) => Json(reports).into_response(),
        Err(e) => internal_error("Failed to list reports", e),
    }
}
