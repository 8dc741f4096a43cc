use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::order::{generate_order_number, OrderDraft, ShippingForm};
use crate::domain::ports::{CartStore, OrderRepository};
use crate::domain::pricing::{PriceBreakdown, PricingConfig};

#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order_id: i32,
    pub order_number: String,
    pub pricing: PriceBreakdown,
}

#[derive(Clone)]
pub struct CheckoutService {
    orders: Arc<dyn OrderRepository>,
    carts: Arc<dyn CartStore>,
    pricing: PricingConfig,
}

impl CheckoutService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        carts: Arc<dyn CartStore>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            orders,
            carts,
            pricing,
        }
    }

    /// Turns the session cart into an order.
    ///
    /// Pricing uses the unit prices captured in the cart, so discounts locked
    /// in at add time are honoured. The cart is cleared only after the order
    /// has been committed; on any failure it is left untouched.
    pub fn checkout(
        &self,
        session_id: &str,
        form: &ShippingForm,
    ) -> Result<CheckoutReceipt, DomainError> {
        let cart = self.carts.load(session_id)?;
        if cart.is_empty() {
            return Err(DomainError::InvalidInput("Your cart is empty.".to_string()));
        }
        let (shipping, payment_method) = form.validate()?;

        let pricing = self.pricing.quote(&cart);
        let draft = OrderDraft::from_cart(
            generate_order_number(),
            &cart,
            shipping,
            payment_method,
            pricing.clone(),
        );

        let placed = match self.orders.place_order(draft) {
            Ok(placed) => placed,
            Err(DomainError::InsufficientStock(lines)) => {
                log::warn!(
                    "session {session_id}: checkout rejected, {} line(s) short on stock",
                    lines.len()
                );
                return Err(DomainError::InsufficientStock(lines));
            }
            Err(e) => {
                log::error!("session {session_id}: failed to persist order: {e}");
                return Err(e);
            }
        };

        self.carts.clear(session_id)?;
        log::info!(
            "Placed order {} (total {})",
            placed.order_number,
            pricing.total
        );

        Ok(CheckoutReceipt {
            order_id: placed.id,
            order_number: placed.order_number,
            pricing,
        })
    }
}
