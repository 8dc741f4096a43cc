use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::AppError;
use crate::handlers::ProductResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text query; synonyms and common misspellings are expanded.
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub products: Vec<ProductResponse>,
    /// "Did you mean" alternatives drawn from product names and brands.
    pub suggestions: Vec<String>,
}

/// GET /search
///
/// Exact name matches rank first, then exact brand, name prefix and brand
/// prefix matches, then everything else alphabetically.
#[utoipa::path(
    get,
    path = "/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Ranked results", body = SearchResponse),
    ),
    tag = "catalog"
)]
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let SearchParams { q, category } = query.into_inner();

    let raw = q.clone();
    let results = web::block(move || state.search.search(&raw, category.as_deref())).await??;

    Ok(HttpResponse::Ok().json(SearchResponse {
        query: q,
        products: results.products.into_iter().map(ProductResponse::from).collect(),
        suggestions: results.suggestions,
    }))
}
