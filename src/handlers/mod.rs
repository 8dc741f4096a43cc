pub mod admin;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod search;

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::pricing::{round_money, PriceBreakdown};
use crate::domain::product::Product;
use crate::domain::role::{Actor, Role};
use crate::errors::AppError;

pub const SESSION_HEADER: &str = "X-Session-Id";
pub const STAFF_NAME_HEADER: &str = "X-Staff-Name";
pub const STAFF_ROLE_HEADER: &str = "X-Staff-Role";

/// Money is exchanged as a decimal string, e.g. "9.99", to avoid
/// floating-point issues.
pub fn money(value: &BigDecimal) -> String {
    let (cents, _) = (round_money(value) * BigDecimal::from(100))
        .with_scale(0)
        .into_bigint_and_exponent();
    let cents = cents.to_string();
    let (sign, digits) = match cents.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", cents.as_str()),
    };
    let digits = format!("{digits:0>3}");
    let (units, fraction) = digits.split_at(digits.len() - 2);
    format!("{sign}{units}.{fraction}")
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ── Extractors ───────────────────────────────────────────────────────────────

/// Cart owner, taken from the `X-Session-Id` header.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

impl FromRequest for SessionId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            header(req, SESSION_HEADER)
                .map(SessionId)
                .ok_or_else(|| AppError::Unauthorized(format!("{SESSION_HEADER} header required"))),
        )
    }
}

/// Back-office caller. Identity is asserted by the gateway in front of the
/// service through `X-Staff-Name` and `X-Staff-Role`.
#[derive(Debug, Clone)]
pub struct Staff(pub Actor);

impl FromRequest for Staff {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let staff = match (header(req, STAFF_NAME_HEADER), header(req, STAFF_ROLE_HEADER)) {
            (Some(name), Some(role)) => role
                .parse::<Role>()
                .map(|role| Staff(Actor::new(name, role)))
                .map_err(|_| AppError::Unauthorized(format!("unknown role '{role}'"))),
            _ => Err(AppError::Unauthorized(format!(
                "{STAFF_NAME_HEADER} and {STAFF_ROLE_HEADER} headers required"
            ))),
        };
        ready(staff)
    }
}

// ── Shared response DTOs ─────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    /// List price before discount.
    pub price: String,
    /// Price a customer pays today.
    pub discounted_price: String,
    pub discount_percentage: i32,
    pub stock: i32,
    pub in_stock: bool,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Taste scores from 1 to 5; mostly set on beans.
    pub taste_sweetness: Option<i32>,
    pub taste_aroma: Option<i32>,
    pub taste_body: Option<i32>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            discounted_price: money(&p.discounted_price()),
            price: money(&p.price),
            in_stock: p.stock > 0,
            id: p.id,
            sku: p.sku,
            name: p.name,
            brand: p.brand,
            category: p.category,
            subcategory: p.subcategory,
            discount_percentage: p.discount_percentage,
            stock: p.stock,
            description: p.description,
            image: p.image,
            taste_sweetness: p.taste.sweetness,
            taste_aroma: p.taste.aroma,
            taste_body: p.taste.body,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PricingResponse {
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub total: String,
}

impl From<&PriceBreakdown> for PricingResponse {
    fn from(p: &PriceBreakdown) -> Self {
        Self {
            subtotal: money(&p.subtotal),
            tax: money(&p.tax),
            shipping: money(&p.shipping),
            total: money(&p.total),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i32,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(money(&BigDecimal::from(0)), "0.00");
        assert_eq!(money(&dec("0")), "0.00");
        assert_eq!(money(&dec("0.05")), "0.05");
        assert_eq!(money(&dec("12.5")), "12.50");
        assert_eq!(money(&dec("66.14375")), "66.14");
        assert_eq!(money(&dec("1868.9")), "1868.90");
        assert_eq!(money(&dec("-3.456")), "-3.46");
    }
}
