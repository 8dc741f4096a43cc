use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::order::{OrderStatus, OrderView};
use crate::errors::AppError;
use crate::handlers::{money, Staff};
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingResponse {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub order_number: String,
    pub customer_id: i32,
    pub status: String,
    pub payment_method: String,
    pub shipping_address: ShippingResponse,
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub total: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        let s = o.shipping;
        Self {
            id: o.id,
            order_number: o.order_number,
            customer_id: o.customer_id,
            status: o.status.to_string(),
            payment_method: o.payment_method,
            shipping_address: ShippingResponse {
                name: s.name,
                email: s.email,
                phone: s.phone,
                address: s.address,
                city: s.city,
                state: s.state,
                postcode: s.postcode,
                country: s.country,
            },
            subtotal: money(&o.subtotal),
            tax: money(&o.tax),
            shipping: money(&o.shipping_cost),
            total: money(&o.total),
            created_at: o.created_at.to_rfc3339(),
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    sku: i.sku,
                    name: i.name,
                    quantity: i.quantity,
                    unit_price: money(&i.unit_price),
                    subtotal: money(&i.subtotal),
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// `pending`, `processing`, `shipped`, `delivered` or `cancelled`.
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders/{order_number}
///
/// Order confirmation view, items included.
#[utoipa::path(
    get,
    path = "/orders/{order_number}",
    params(
        ("order_number" = String, Path, description = "Order number, e.g. ORD-3F9A0C1B7E"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let order = web::block(move || state.orders.get_order(&order_number)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /admin/orders
///
/// Returns a paginated list of orders (without their items), newest first.
#[utoipa::path(
    get,
    path = "/admin/orders",
    params(
        ListOrdersParams,
        ("X-Staff-Name" = String, Header, description = "Staff member"),
        ("X-Staff-Role" = String, Header, description = "admin or manager"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Missing staff headers"),
        (status = 403, description = "Role may not view orders"),
    ),
    tag = "admin"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    staff: Staff,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || state.orders.list_orders(&staff.0, page, limit)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PUT /admin/orders/{order_number}/status
#[utoipa::path(
    put,
    path = "/admin/orders/{order_number}/status",
    params(
        ("order_number" = String, Path, description = "Order number"),
        ("X-Staff-Name" = String, Header, description = "Staff member"),
        ("X-Staff-Role" = String, Header, description = "admin or manager"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 403, description = "Role may not manage orders"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Unknown status or transition not allowed"),
    ),
    tag = "admin"
)]
pub async fn update_order_status(
    state: web::Data<AppState>,
    staff: Staff,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let status: OrderStatus = body.into_inner().status.parse()?;

    let order =
        web::block(move || state.orders.update_status(&staff.0, &order_number, status)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
