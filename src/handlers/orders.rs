use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::billing::BillSnapshot,
    services::orders::{
        CreateOrderRequest, OrderListFilter, OrderListResponse, OrderResponse,
    },
    services::sharing::SharePlan,
    stage::Stage,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub search: Option<String>,
    pub status: Option<Stage>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Stage,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateBillQuery {
    /// Regenerate even when a bill URL is already cached on the order.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub order_id: String,
    pub bill_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    #[serde(default)]
    pub kind: ShareKind,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareKind {
    #[default]
    Bill,
    Tracking,
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ServiceError> {
    let order = state
        .services
        .orders
        .create_order(user.tailor_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrderListResponse>, ServiceError> {
    let filter = OrderListFilter {
        search: query.search,
        status: query.status,
    };
    let list = state
        .services
        .orders
        .list_orders(user.tailor_id, query.page, query.per_page.min(100), filter)
        .await?;
    Ok(Json(list))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order = state.services.orders.get_order(user.tailor_id, id).await?;
    Ok(Json(order))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order = state
        .services
        .orders
        .set_status(user.tailor_id, id, request.status)
        .await?;
    Ok(Json(order))
}

/// Generates the bill PDF for an order (or returns the cached URL), caching
/// the artifact URL on the order row.
pub async fn generate_bill(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<GenerateBillQuery>,
) -> Result<Json<BillResponse>, ServiceError> {
    let (order, customer) = state
        .services
        .orders
        .find_with_customer(user.tailor_id, id)
        .await?;

    if let Some(url) = order.bill_url.as_ref().filter(|_| !query.refresh) {
        return Ok(Json(BillResponse {
            order_id: order.order_id,
            bill_url: url.clone(),
        }));
    }

    let profile = state.services.profiles.get(user.tailor_id).await?;
    let measurements: BTreeMap<String, String> = serde_json::from_value(order.measurements)
        .map_err(|e| ServiceError::InternalError(format!("Measurement decoding: {e}")))?;

    let snapshot = BillSnapshot {
        order_id: order.order_id.clone(),
        token_number: order.token_number,
        customer_name: customer.name,
        customer_phone: customer.phone_number,
        gender: order.gender,
        stitch_category: order.stitch_category,
        measurements,
        work_description: order.work_description,
        due_date: order.due_date,
        charges: order.charges,
        created_at: order.created_at,
        shop_name: profile.shop_name,
        shop_phone: profile.phone_number,
    };

    let url = state.services.billing.generate_bill(&snapshot).await?;
    state
        .services
        .orders
        .set_bill_url(user.tailor_id, id, &url)
        .await?;

    info!(order_id = %order.order_id, "Bill URL cached on order");
    Ok(Json(BillResponse {
        order_id: order.order_id,
        bill_url: url,
    }))
}

/// Builds a share payload for the order: either the generated bill or the
/// public tracking link. Bill sharing requires a generated bill.
pub async fn share_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ShareQuery>,
) -> Result<Json<SharePlan>, ServiceError> {
    let (order, customer) = state
        .services
        .orders
        .find_with_customer(user.tailor_id, id)
        .await?;
    let profile = state.services.profiles.get(user.tailor_id).await?;

    let plan = match query.kind {
        ShareKind::Bill => {
            let bill_url = order.bill_url.as_deref().ok_or_else(|| {
                ServiceError::ValidationError(
                    "No bill has been generated for this order yet".to_string(),
                )
            })?;
            state.services.sharing.bill_share(
                &order.order_id,
                &customer.name,
                &customer.phone_number,
                &profile.shop_name,
                bill_url,
            )
        }
        ShareKind::Tracking => state.services.sharing.tracking_share(
            &order.order_id,
            &customer.name,
            &customer.phone_number,
            &profile.shop_name,
        ),
    };

    Ok(Json(plan))
}
