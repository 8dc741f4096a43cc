use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::Cart;
use super::errors::DomainError;
use super::pricing::PriceBreakdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Orders move forward one step at a time; only orders that have not
    /// shipped can be cancelled.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Pending | Self::Processing, Self::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::InvalidInput(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Paypal,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Paypal => "paypal",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "card" => Ok(Self::Card),
            "paypal" => Ok(Self::Paypal),
            "bank_transfer" => Ok(Self::BankTransfer),
            other => Err(DomainError::InvalidInput(format!(
                "unsupported payment method '{other}'"
            ))),
        }
    }
}

/// Checkout form exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: String,
}

pub const DEFAULT_COUNTRY: &str = "AU";

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ShippingForm {
    /// Trims every field and checks the required ones.
    pub fn validate(&self) -> Result<(ShippingDetails, PaymentMethod), DomainError> {
        let name = trimmed(&self.name);
        let email = trimmed(&self.email);
        let address = trimmed(&self.address);

        let missing: Vec<&str> = [("name", &name), ("email", &email), ("address", &address)]
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(field, _)| *field)
            .collect();
        let (Some(name), Some(email), Some(address)) = (name, email, address) else {
            return Err(DomainError::InvalidInput(format!(
                "{} required",
                missing.join(", ")
            )));
        };

        if !email.contains('@') {
            return Err(DomainError::InvalidInput(format!(
                "'{email}' is not a valid email address"
            )));
        }

        let payment_method = self
            .payment_method
            .as_deref()
            .map(PaymentMethod::from_str)
            .transpose()?
            .unwrap_or_default();

        Ok((
            ShippingDetails {
                name,
                email,
                phone: trimmed(&self.phone),
                address,
                city: trimmed(&self.city),
                state: trimmed(&self.state),
                postcode: trimmed(&self.postcode),
                country: trimmed(&self.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            },
            payment_method,
        ))
    }
}

/// Human-readable order reference, e.g. `ORD-3F9A0C1B7E`.
pub fn generate_order_number() -> String {
    let token: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(10)
        .collect();
    format!("ORD-{}", token.to_ascii_uppercase())
}

#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub product_id: i32,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Everything needed to persist an order in one transaction.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_number: String,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    pub pricing: PriceBreakdown,
    pub items: Vec<OrderItemDraft>,
}

impl OrderDraft {
    pub fn from_cart(
        order_number: String,
        cart: &Cart,
        shipping: ShippingDetails,
        payment_method: PaymentMethod,
        pricing: PriceBreakdown,
    ) -> Self {
        Self {
            order_number,
            shipping,
            payment_method,
            pricing,
            items: cart
                .lines()
                .map(|l| OrderItemDraft {
                    product_id: l.product_id,
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: i32,
    pub order_number: String,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: i32,
    pub product_id: i32,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub order_number: String,
    pub customer_id: i32,
    pub shipping: ShippingDetails,
    pub payment_method: String,
    pub status: OrderStatus,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// Error for a status update that lost a race with another one.
pub fn status_changed(order_number: &str, current: OrderStatus) -> DomainError {
    DomainError::Conflict(format!(
        "Order {order_number} was changed concurrently and is now {current}"
    ))
}

/// Rows to skip for a 1-based `page`; saturates instead of overflowing.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    page.max(1).saturating_sub(1).saturating_mul(limit.max(0))
}
