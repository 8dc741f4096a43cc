use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::activity::ActivityEntry;
use crate::domain::product::{NewProduct, ProductUpdate, TasteProfile};
use crate::errors::AppError;
use crate::handlers::{ProductResponse, Staff};
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    /// Decimal price as a string, e.g. "24.50".
    pub price: String,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub discount_percentage: i32,
    pub description: Option<String>,
    pub image: Option<String>,
    pub taste_sweetness: Option<i32>,
    pub taste_aroma: Option<i32>,
    pub taste_body: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub subcategory: Option<String>,
    pub price: Option<String>,
    pub stock: Option<i32>,
    pub discount_percentage: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub taste_sweetness: Option<i32>,
    pub taste_aroma: Option<i32>,
    pub taste_body: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityParams {
    /// Most recent entries to return. Defaults to 50, maximum 100.
    #[serde(default = "default_activity_limit")]
    pub limit: i64,
}

fn default_activity_limit() -> i64 {
    50
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityResponse {
    pub id: i32,
    pub user_name: String,
    pub user_role: String,
    pub action: String,
    pub product_id: Option<i32>,
    pub product_sku: Option<String>,
    pub product_name: Option<String>,
    pub details: String,
    pub created_at: String,
}

impl From<ActivityEntry> for ActivityResponse {
    fn from(e: ActivityEntry) -> Self {
        Self {
            id: e.id,
            user_name: e.user_name,
            user_role: e.user_role,
            action: e.action,
            product_id: e.product_id,
            product_sku: e.product_sku,
            product_name: e.product_name,
            details: e.details,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::Validation(format!("Invalid price '{raw}': {e}")))
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = AppError;

    fn try_from(r: CreateProductRequest) -> Result<Self, Self::Error> {
        Ok(NewProduct {
            price: parse_price(&r.price)?,
            sku: r.sku,
            name: r.name,
            brand: r.brand,
            category: r.category,
            subcategory: r.subcategory,
            stock: r.stock,
            discount_percentage: r.discount_percentage,
            description: r.description,
            image: r.image,
            taste: TasteProfile {
                sweetness: r.taste_sweetness,
                aroma: r.taste_aroma,
                body: r.taste_body,
            },
        })
    }
}

impl TryFrom<UpdateProductRequest> for ProductUpdate {
    type Error = AppError;

    fn try_from(r: UpdateProductRequest) -> Result<Self, Self::Error> {
        Ok(ProductUpdate {
            price: r.price.as_deref().map(parse_price).transpose()?,
            name: r.name,
            brand: r.brand,
            subcategory: r.subcategory,
            stock: r.stock,
            discount_percentage: r.discount_percentage,
            description: r.description,
            image: r.image,
            taste_sweetness: r.taste_sweetness,
            taste_aroma: r.taste_aroma,
            taste_body: r.taste_body,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /admin/products
#[utoipa::path(
    post,
    path = "/admin/products",
    params(
        ("X-Staff-Name" = String, Header, description = "Staff member"),
        ("X-Staff-Role" = String, Header, description = "admin or manager"),
    ),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 403, description = "Role may not manage products"),
        (status = 409, description = "SKU already exists"),
        (status = 422, description = "Invalid product fields"),
    ),
    tag = "admin"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    staff: Staff,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = NewProduct::try_from(body.into_inner())?;
    let created = web::block(move || state.catalog.create(&staff.0, product)).await??;
    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// PUT /admin/products/{sku}
///
/// Partial update; omitted fields keep their current values.
#[utoipa::path(
    put,
    path = "/admin/products/{sku}",
    params(
        ("sku" = String, Path, description = "Product SKU"),
        ("X-Staff-Name" = String, Header, description = "Staff member"),
        ("X-Staff-Role" = String, Header, description = "admin or manager"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 403, description = "Role may not manage products"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid product fields"),
    ),
    tag = "admin"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    staff: Staff,
    path: web::Path<String>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let sku = path.into_inner();
    let update = ProductUpdate::try_from(body.into_inner())?;
    let updated = web::block(move || state.catalog.update(&staff.0, &sku, update)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(updated)))
}

/// GET /admin/activity
#[utoipa::path(
    get,
    path = "/admin/activity",
    params(
        ActivityParams,
        ("X-Staff-Name" = String, Header, description = "Staff member"),
        ("X-Staff-Role" = String, Header, description = "manager"),
    ),
    responses(
        (status = 200, description = "Newest entries first", body = [ActivityResponse]),
        (status = 403, description = "Only managers may read the activity log"),
    ),
    tag = "admin"
)]
pub async fn activity(
    state: web::Data<AppState>,
    staff: Staff,
    query: web::Query<ActivityParams>,
) -> Result<HttpResponse, AppError> {
    let limit = query.into_inner().limit;
    let entries = web::block(move || state.orders.activity(&staff.0, limit)).await??;

    let body: Vec<ActivityResponse> = entries.into_iter().map(ActivityResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_parses_price_and_taste() {
        let product = NewProduct::try_from(CreateProductRequest {
            sku: " A-SCALE-004 ".to_string(),
            name: "Brew Scale".to_string(),
            brand: None,
            category: "Accessories".to_string(),
            subcategory: None,
            price: "45.00".to_string(),
            stock: 10,
            discount_percentage: 0,
            description: None,
            image: None,
            taste_sweetness: None,
            taste_aroma: Some(4),
            taste_body: None,
        })
        .expect("valid request");
        assert_eq!(product.price, BigDecimal::from(45));
        assert_eq!(product.taste.aroma, Some(4));
    }

    #[test]
    fn malformed_prices_are_validation_errors() {
        let err = ProductUpdate::try_from(UpdateProductRequest {
            price: Some("twelve".to_string()),
            ..Default::default()
        })
        .expect_err("bad price");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
