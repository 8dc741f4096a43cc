use dashmap::DashMap;

use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartStore;

/// Session carts held in process memory, keyed by session id.
#[derive(Default)]
pub struct InMemoryCartStore {
    carts: DashMap<String, Cart>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for InMemoryCartStore {
    fn load(&self, session_id: &str) -> Result<Cart, DomainError> {
        Ok(self
            .carts
            .get(session_id)
            .map(|cart| cart.value().clone())
            .unwrap_or_default())
    }

    fn save(&self, session_id: &str, cart: &Cart) -> Result<(), DomainError> {
        if cart.is_empty() {
            self.carts.remove(session_id);
        } else {
            self.carts.insert(session_id.to_string(), cart.clone());
        }
        Ok(())
    }

    fn clear(&self, session_id: &str) -> Result<(), DomainError> {
        self.carts.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::sample_product;

    #[test]
    fn unknown_session_loads_empty_cart() {
        let store = InMemoryCartStore::new();
        assert!(store.load("nobody").expect("load").is_empty());
    }

    #[test]
    fn save_then_clear() {
        let store = InMemoryCartStore::new();
        let mut cart = Cart::new();
        cart.add(&sample_product(1, "B-COL-002", "Single Origin Colombia 250g", "12.00", 80), 2)
            .expect("add");

        store.save("s1", &cart).expect("save");
        assert_eq!(store.load("s1").expect("load").item_count(), 2);

        store.clear("s1").expect("clear");
        assert!(store.load("s1").expect("load").is_empty());
    }
}
