use std::sync::Arc;

use serde::Serialize;

use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartStore, ProductRepository};
use crate::domain::pricing::{PriceBreakdown, PricingConfig};

#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub cart: Cart,
    pub pricing: PriceBreakdown,
    pub item_count: i32,
}

#[derive(Clone)]
pub struct CartService {
    products: Arc<dyn ProductRepository>,
    carts: Arc<dyn CartStore>,
    pricing: PricingConfig,
}

impl CartService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        carts: Arc<dyn CartStore>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            products,
            carts,
            pricing,
        }
    }

    /// Adds a product (one unit unless `quantity` is given) and returns the
    /// new cart item count.
    pub fn add(
        &self,
        session_id: &str,
        product_id: i32,
        quantity: Option<i32>,
    ) -> Result<i32, DomainError> {
        let product = self
            .products
            .find_by_id(product_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Product {product_id}")))?;

        let mut cart = self.carts.load(session_id)?;
        cart.add(&product, quantity.unwrap_or(1))?;
        self.carts.save(session_id, &cart)?;

        log::debug!("session {session_id}: added product {product_id} to cart");
        Ok(cart.item_count())
    }

    pub fn update(&self, session_id: &str, product_id: i32, quantity: i32) -> Result<i32, DomainError> {
        let mut cart = self.carts.load(session_id)?;
        cart.set_quantity(product_id, quantity)?;
        self.carts.save(session_id, &cart)?;

        log::debug!("session {session_id}: set product {product_id} quantity to {quantity}");
        Ok(cart.item_count())
    }

    pub fn remove(&self, session_id: &str, product_id: i32) -> Result<i32, DomainError> {
        let mut cart = self.carts.load(session_id)?;
        if cart.remove(product_id) {
            self.carts.save(session_id, &cart)?;
            log::debug!("session {session_id}: removed product {product_id}");
        }
        Ok(cart.item_count())
    }

    pub fn clear(&self, session_id: &str) -> Result<(), DomainError> {
        self.carts.clear(session_id)
    }

    pub fn count(&self, session_id: &str) -> Result<i32, DomainError> {
        Ok(self.carts.load(session_id)?.item_count())
    }

    pub fn summary(&self, session_id: &str) -> Result<CartSummary, DomainError> {
        let cart = self.carts.load(session_id)?;
        let pricing = self.pricing.quote(&cart);
        let item_count = cart.item_count();
        Ok(CartSummary {
            cart,
            pricing,
            item_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::infrastructure::cart_store::InMemoryCartStore;
    use crate::infrastructure::memory::{sample_product, MemoryStore};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn service() -> (CartService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.insert_product(sample_product(1, "B-HOUSE-001", "House Blend 1kg", "24.50", 50));
        store.insert_product(sample_product(2, "A-TAMP-002", "Barista Tamper", "39.00", 60));
        let service = CartService::new(
            store.clone(),
            Arc::new(InMemoryCartStore::new()),
            PricingConfig::default(),
        );
        (service, store)
    }

    #[test]
    fn add_returns_running_item_count() {
        let (service, _) = service();
        assert_eq!(service.add("s1", 1, None).expect("add"), 1);
        assert_eq!(service.add("s1", 1, Some(2)).expect("add"), 3);
        assert_eq!(service.add("s1", 2, None).expect("add"), 4);
        assert_eq!(service.count("s1").expect("count"), 4);
    }

    #[test]
    fn add_unknown_product_is_not_found() {
        let (service, _) = service();
        assert!(matches!(
            service.add("s1", 99, None),
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(service.count("s1").expect("count"), 0);
    }

    #[test]
    fn sessions_do_not_share_carts() {
        let (service, _) = service();
        service.add("alice", 1, Some(2)).expect("add");
        assert_eq!(service.count("bob").expect("count"), 0);
    }

    #[test]
    fn captured_price_survives_catalog_edits() {
        let (service, store) = service();
        service.add("s1", 2, None).expect("add");

        store.insert_product(sample_product(2, "A-TAMP-002", "Barista Tamper", "99.00", 60));

        let summary = service.summary("s1").expect("summary");
        assert_eq!(summary.pricing.subtotal, dec("39.00"));
    }

    #[test]
    fn update_to_zero_and_remove_drop_lines() {
        let (service, _) = service();
        service.add("s1", 1, Some(2)).expect("add");
        service.add("s1", 2, Some(1)).expect("add");

        assert_eq!(service.update("s1", 1, 5).expect("update"), 6);
        assert_eq!(service.update("s1", 1, 0).expect("update"), 1);
        assert_eq!(service.remove("s1", 2).expect("remove"), 0);
        assert_eq!(service.remove("s1", 2).expect("remove twice"), 0);
    }

    #[test]
    fn summary_prices_cart() {
        let (service, _) = service();
        service.add("s1", 1, Some(2)).expect("add");

        let summary = service.summary("s1").expect("summary");
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.pricing.subtotal, dec("49.00"));
        assert_eq!(summary.pricing.tax, dec("4.90"));
        // 15 * (1 - 49/80 * 0.3) = 12.24375
        assert_eq!(summary.pricing.shipping, dec("12.24"));
        assert_eq!(summary.pricing.total, dec("66.14"));
    }

    #[test]
    fn clear_empties_cart() {
        let (service, _) = service();
        service.add("s1", 1, None).expect("add");
        service.clear("s1").expect("clear");
        assert!(service.summary("s1").expect("summary").cart.is_empty());
    }
}
