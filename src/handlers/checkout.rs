use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::order::ShippingForm;
use crate::errors::AppError;
use crate::handlers::{PricingResponse, SessionId};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    /// Two-letter country code, defaults to `AU`.
    pub country: Option<String>,
    /// `card` (default), `paypal` or `bank_transfer`.
    pub payment_method: Option<String>,
}

impl From<CheckoutRequest> for ShippingForm {
    fn from(r: CheckoutRequest) -> Self {
        ShippingForm {
            name: r.name,
            email: r.email,
            phone: r.phone,
            address: r.address,
            city: r.city,
            state: r.state,
            postcode: r.postcode,
            country: r.country,
            payment_method: r.payment_method,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_id: i32,
    pub order_number: String,
    pub pricing: PricingResponse,
}

/// POST /checkout
///
/// Places an order from the session cart. Stock is re-checked inside the
/// order transaction; if any line is short nothing is written and the cart
/// is kept.
#[utoipa::path(
    post,
    path = "/checkout",
    params(("X-Session-Id" = String, Header, description = "Cart session")),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = CheckoutResponse),
        (status = 409, description = "Insufficient stock for one or more lines"),
        (status = 422, description = "Empty cart or invalid shipping details"),
    ),
    tag = "checkout"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    session: SessionId,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let form = ShippingForm::from(body.into_inner());
    let receipt = web::block(move || state.checkout.checkout(&session.0, &form)).await??;

    Ok(HttpResponse::Created().json(CheckoutResponse {
        order_id: receipt.order_id,
        order_number: receipt.order_number,
        pricing: PricingResponse::from(&receipt.pricing),
    }))
}
