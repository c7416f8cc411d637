//! HTTP API for the stockade daemon.
//!
//! Provides REST endpoints for:
//! - Health check and metrics
//! - Placing orders (the admission boundary)
//! - Opening, restocking and inspecting products
//! - Fetching archived orders
//!
//! Every classified order returns `200` with `{success, error?}`; HTTP
//! error statuses are reserved for faults and invalid requests.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use stockade_domain::{Order, OrderResult, Outcome, Price, ProductId, Quantity};
use stockade_engine::{AdmissionError, AdmissionService, PaymentPort, StubCatalog};
use stockade_ledger::{LedgerError, StockLedger};
use stockade_store::{MemoryOrderStore, OrderRepository};

use crate::error::DaemonError;
use crate::event_bus::{DaemonEvent, EventBus};
use crate::metrics::Metrics;

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState<P: PaymentPort + 'static> {
    pub service: Arc<AdmissionService<P, StubCatalog, MemoryOrderStore>>,
    pub ledger: Arc<StockLedger>,
    pub catalog: Arc<StubCatalog>,
    pub store: Arc<MemoryOrderStore>,
    pub metrics: Arc<Metrics>,
    pub event_bus: Arc<EventBus>,
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Request to place an order.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Product to order
    pub product_info_id: i64,
    /// Units requested
    pub quantity: u32,
}

/// Request to open a product for sale.
#[derive(Debug, Deserialize)]
pub struct OpenProductRequest {
    /// Unit price
    pub price: Decimal,
    /// Initial available stock
    pub initial_stock: u32,
}

/// Request to add stock to an open product.
#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    /// Units to add
    pub units: u32,
}

/// Current stock for a product.
#[derive(Debug, Serialize, Deserialize)]
pub struct StockResponse {
    pub product_id: i64,
    pub available: i64,
}

/// Summary of an archived order.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub buyer_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub state: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminated_at: Option<DateTime<Utc>>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router<P>(state: Arc<ApiState<P>>) -> Router
where
    P: PaymentPort + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/orders", post(place_order_handler))
        .route("/orders/:id", get(get_order_handler))
        .route("/products/:id", put(open_product_handler))
        .route("/products/:id/restock", post(restock_handler))
        .route("/products/:id/stock", get(stock_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Prometheus metrics endpoint.
async fn metrics_handler<P>(State(state): State<Arc<ApiState<P>>>) -> Result<String, ApiError>
where
    P: PaymentPort + 'static,
{
    state.metrics.encode().map_err(to_error_response)
}

/// Place an order.
///
/// The buyer identity arrives in the `X-Buyer-Id` header (opaque to this
/// service, forwarded from the edge). Any classified outcome is `200`;
/// requests turned away without a classification count as rejections.
async fn place_order_handler<P>(
    State(state): State<Arc<ApiState<P>>>,
    headers: HeaderMap,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<OrderResult>, ApiError>
where
    P: PaymentPort + 'static,
{
    try_place_order(&state, &headers, req).await.map_err(|e| {
        state.metrics.orders_rejected_total.inc();
        e
    })
}

async fn try_place_order<P>(
    state: &ApiState<P>,
    headers: &HeaderMap,
    req: PlaceOrderRequest,
) -> Result<Json<OrderResult>, ApiError>
where
    P: PaymentPort + 'static,
{
    let buyer_id = parse_buyer_id(headers)?;
    let product_id = ProductId::new(req.product_info_id).map_err(bad_request)?;
    let quantity = Quantity::new(req.quantity).map_err(bad_request)?;

    let result = state
        .service
        .place_order(product_id, quantity, buyer_id)
        .await
        .map_err(|e| to_error_response(DaemonError::Admission(e)))?;

    let outcome = result.outcome();
    state.metrics.record_outcome(outcome);

    let now = Utc::now();
    if outcome != Outcome::SoldOut {
        state.event_bus.send(DaemonEvent::OrderAdmitted {
            order_id: result.order_id,
            product_id,
            quantity: quantity.as_u32(),
            timestamp: now,
        });
    }
    state.event_bus.send(DaemonEvent::OrderSettled {
        order_id: result.order_id,
        product_id,
        outcome,
        timestamp: now,
    });

    Ok(Json(result))
}

/// Get an archived order.
async fn get_order_handler<P>(
    State(state): State<Arc<ApiState<P>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderSummary>, ApiError>
where
    P: PaymentPort + 'static,
{
    let order = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| to_error_response(DaemonError::Store(e)))?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse { error: format!("Order not found: {}", id) }),
            )
        })?;

    Ok(Json(order_to_summary(&order)))
}

/// Open a product for sale with an initial stock.
async fn open_product_handler<P>(
    State(state): State<Arc<ApiState<P>>>,
    Path(id): Path<i64>,
    Json(req): Json<OpenProductRequest>,
) -> Result<(StatusCode, Json<StockResponse>), ApiError>
where
    P: PaymentPort + 'static,
{
    let product_id = ProductId::new(id).map_err(bad_request)?;
    let price = Price::new(req.price).map_err(bad_request)?;

    state
        .ledger
        .open_product(product_id, req.initial_stock)
        .map_err(|e| to_error_response(DaemonError::Ledger(e)))?;
    state.catalog.add_product(product_id, price);
    state.metrics.products_open.inc();

    let available = req.initial_stock as i64;
    state.event_bus.send(DaemonEvent::StockChanged {
        product_id,
        available,
        timestamp: Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(StockResponse { product_id: id, available })))
}

/// Add stock to an open product.
async fn restock_handler<P>(
    State(state): State<Arc<ApiState<P>>>,
    Path(id): Path<i64>,
    Json(req): Json<RestockRequest>,
) -> Result<Json<StockResponse>, ApiError>
where
    P: PaymentPort + 'static,
{
    let product_id = ProductId::new(id).map_err(bad_request)?;
    let units = Quantity::new(req.units).map_err(bad_request)?;

    let available = state
        .ledger
        .restock(product_id, units)
        .map_err(|e| to_error_response(DaemonError::Ledger(e)))?;

    state.event_bus.send(DaemonEvent::StockChanged {
        product_id,
        available,
        timestamp: Utc::now(),
    });

    Ok(Json(StockResponse { product_id: id, available }))
}

/// Current stock for a product.
async fn stock_handler<P>(
    State(state): State<Arc<ApiState<P>>>,
    Path(id): Path<i64>,
) -> Result<Json<StockResponse>, ApiError>
where
    P: PaymentPort + 'static,
{
    let product_id = ProductId::new(id).map_err(bad_request)?;

    let available = state
        .ledger
        .available(product_id)
        .map_err(|e| to_error_response(DaemonError::Ledger(e)))?;

    Ok(Json(StockResponse { product_id: id, available }))
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_buyer_id(headers: &HeaderMap) -> Result<i64, ApiError> {
    let raw = headers
        .get("X-Buyer-Id")
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: "Missing X-Buyer-Id header".to_string() }),
            )
        })?
        .to_str()
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: "Invalid X-Buyer-Id header".to_string() }),
            )
        })?;

    raw.parse::<i64>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: format!("Invalid X-Buyer-Id: {}", raw) }),
        )
    })
}

fn bad_request(error: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: error.to_string() }))
}

fn to_error_response(error: DaemonError) -> ApiError {
    let status = match &error {
        DaemonError::Admission(inner) => match inner {
            AdmissionError::UnknownProduct(_) => StatusCode::NOT_FOUND,
            AdmissionError::ProductNotOnSale(_) => StatusCode::CONFLICT,
            AdmissionError::Payment(_) | AdmissionError::Catalog(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DaemonError::Ledger(LedgerError::UnknownProduct(_)) => StatusCode::NOT_FOUND,
        DaemonError::Ledger(LedgerError::ProductExists(_)) => StatusCode::CONFLICT,
        DaemonError::Domain(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorResponse { error: error.to_string() }))
}

fn order_to_summary(order: &Order) -> OrderSummary {
    OrderSummary {
        id: order.id,
        buyer_id: order.buyer_id,
        product_id: order.product_id.as_i64(),
        quantity: order.quantity.as_u32(),
        state: order.state.name().to_string(),
        created_at: order.created_at,
        terminated_at: order.terminated_at,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stockade_engine::StubPayment;
    use stockade_ledger::ReservationArbiter;

    fn test_state() -> Arc<ApiState<StubPayment>> {
        let ledger = Arc::new(StockLedger::new());
        let catalog = Arc::new(StubCatalog::new());
        let store = Arc::new(MemoryOrderStore::new());
        let service = Arc::new(AdmissionService::new(
            Arc::new(ReservationArbiter::new(ledger.clone())),
            Arc::new(StubPayment::approving()),
            catalog.clone(),
            store.clone(),
        ));

        Arc::new(ApiState {
            service,
            ledger,
            catalog,
            store,
            metrics: Arc::new(Metrics::new().unwrap()),
            event_bus: Arc::new(EventBus::new(100)),
        })
    }

    #[test]
    fn test_router_builds() {
        let _router = create_router(test_state());
    }

    #[test]
    fn test_parse_buyer_id() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Buyer-Id", "28".parse().unwrap());
        assert_eq!(parse_buyer_id(&headers).unwrap(), 28);
    }

    #[test]
    fn test_parse_buyer_id_missing() {
        let headers = HeaderMap::new();
        let err = parse_buyer_id(&headers).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_buyer_id_not_numeric() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Buyer-Id", "bob".parse().unwrap());
        let err = parse_buyer_id(&headers).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejections_are_counted() {
        let state = test_state();
        let mut headers = HeaderMap::new();
        headers.insert("X-Buyer-Id", "28".parse().unwrap());

        // Unknown product: 404, no classification
        let req = PlaceOrderRequest { product_info_id: 404, quantity: 1 };
        let err = place_order_handler(State(state.clone()), headers.clone(), Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
        assert_eq!(state.metrics.orders_rejected_total.get(), 1);

        // Invalid quantity: 400
        let req = PlaceOrderRequest { product_info_id: 32, quantity: 0 };
        let err = place_order_handler(State(state.clone()), headers, Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(state.metrics.orders_rejected_total.get(), 2);

        // No outcome counter moved
        assert_eq!(state.metrics.orders_soldout_total.get(), 0);
    }

    #[test]
    fn test_error_status_mapping() {
        let unknown = DaemonError::Admission(AdmissionError::UnknownProduct(
            ProductId::new(99).unwrap(),
        ));
        assert_eq!(to_error_response(unknown).0, StatusCode::NOT_FOUND);

        let not_on_sale = DaemonError::Admission(AdmissionError::ProductNotOnSale(
            ProductId::new(99).unwrap(),
        ));
        assert_eq!(to_error_response(not_on_sale).0, StatusCode::CONFLICT);

        let payment = DaemonError::Admission(AdmissionError::Payment("down".to_string()));
        assert_eq!(to_error_response(payment).0, StatusCode::BAD_GATEWAY);

        let exists = DaemonError::Ledger(LedgerError::ProductExists(ProductId::new(1).unwrap()));
        assert_eq!(to_error_response(exists).0, StatusCode::CONFLICT);
    }
}
