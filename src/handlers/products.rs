use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::product::ProductFilter;
use crate::errors::AppError;
use crate::handlers::ProductResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsParams {
    /// `machines`, `beans` or `accessories`.
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    params(ListProductsParams),
    responses(
        (status = 200, description = "Catalog listing", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = ProductFilter {
        category: params.category.filter(|c| !c.trim().is_empty()),
        subcategory: params.subcategory.filter(|s| !s.trim().is_empty()),
    };

    let products = web::block(move || state.catalog.list(&filter)).await??;

    let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = web::block(move || state.catalog.get(id)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// GET /products/sku/{sku}
#[utoipa::path(
    get,
    path = "/products/sku/{sku}",
    params(
        ("sku" = String, Path, description = "Product SKU, e.g. M-BRE001"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product_by_sku(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let sku = path.into_inner();
    let product = web::block(move || state.catalog.get_by_sku(&sku)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}
