use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::cart_service::CartSummary;
use crate::errors::AppError;
use crate::handlers::{money, CountResponse, PricingResponse, SessionId};
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub product_id: i32,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    /// Zero or less removes the line.
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub product_id: i32,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub original_price: String,
    pub discount_percentage: i32,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub item_count: i32,
    pub pricing: PricingResponse,
}

impl From<CartSummary> for CartResponse {
    fn from(summary: CartSummary) -> Self {
        Self {
            items: summary
                .cart
                .lines()
                .map(|l| CartLineResponse {
                    product_id: l.product_id,
                    name: l.name.clone(),
                    image: l.image.clone(),
                    quantity: l.quantity,
                    unit_price: money(&l.unit_price),
                    original_price: money(&l.original_price),
                    discount_percentage: l.discount_percentage,
                    line_total: money(&l.line_total()),
                })
                .collect(),
            item_count: summary.item_count,
            pricing: PricingResponse::from(&summary.pricing),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    params(("X-Session-Id" = String, Header, description = "Cart session")),
    responses(
        (status = 200, description = "Cart with live totals", body = CartResponse),
        (status = 401, description = "Missing session header"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    let summary = web::block(move || state.cart.summary(&session.0)).await??;
    Ok(HttpResponse::Ok().json(CartResponse::from(summary)))
}

/// GET /cart/count
#[utoipa::path(
    get,
    path = "/cart/count",
    params(("X-Session-Id" = String, Header, description = "Cart session")),
    responses(
        (status = 200, description = "Total quantity in the cart", body = CountResponse),
    ),
    tag = "cart"
)]
pub async fn cart_count(
    state: web::Data<AppState>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    let count = web::block(move || state.cart.count(&session.0)).await??;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// POST /cart/items
///
/// The unit price is captured now; later catalog price changes do not
/// affect lines already in the cart.
#[utoipa::path(
    post,
    path = "/cart/items",
    params(("X-Session-Id" = String, Header, description = "Cart session")),
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Item added", body = CountResponse),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Quantity must be positive"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    state: web::Data<AppState>,
    session: SessionId,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let count =
        web::block(move || state.cart.add(&session.0, body.product_id, body.quantity)).await??;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// PUT /cart/items/{product_id}
#[utoipa::path(
    put,
    path = "/cart/items/{product_id}",
    params(
        ("X-Session-Id" = String, Header, description = "Cart session"),
        ("product_id" = i32, Path, description = "Product id of the line"),
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Quantity updated", body = CountResponse),
        (status = 404, description = "Product not in cart"),
    ),
    tag = "cart"
)]
pub async fn update_item(
    state: web::Data<AppState>,
    session: SessionId,
    path: web::Path<i32>,
    body: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    let count =
        web::block(move || state.cart.update(&session.0, product_id, quantity)).await??;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// DELETE /cart/items/{product_id}
#[utoipa::path(
    delete,
    path = "/cart/items/{product_id}",
    params(
        ("X-Session-Id" = String, Header, description = "Cart session"),
        ("product_id" = i32, Path, description = "Product id of the line"),
    ),
    responses(
        (status = 200, description = "Line removed (no-op if absent)", body = CountResponse),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    state: web::Data<AppState>,
    session: SessionId,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let count = web::block(move || state.cart.remove(&session.0, product_id)).await??;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// DELETE /cart
#[utoipa::path(
    delete,
    path = "/cart",
    params(("X-Session-Id" = String, Header, description = "Cart session")),
    responses(
        (status = 204, description = "Cart emptied"),
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    state: web::Data<AppState>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    web::block(move || state.cart.clear(&session.0)).await??;
    Ok(HttpResponse::NoContent().finish())
}
