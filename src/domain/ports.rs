use super::activity::{ActivityEntry, NewActivity};
use super::cart::Cart;
use super::errors::DomainError;
use super::order::{ListResult, OrderDraft, OrderStatus, OrderView, PlacedOrder};
use super::product::{NewProduct, Product, ProductFilter, ProductUpdate};

pub trait ProductRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: i32) -> Result<Option<Product>, DomainError>;
    fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, DomainError>;
    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError>;
    /// Products where any searchable field contains any of `terms`
    /// (lowercase), optionally restricted to one category. Unordered.
    fn search(&self, terms: &[String], category: Option<&str>)
        -> Result<Vec<Product>, DomainError>;
    /// Distinct product names and brands, the source of search suggestions.
    fn vocabulary(&self) -> Result<Vec<String>, DomainError>;
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn update(&self, sku: &str, update: &ProductUpdate) -> Result<Option<Product>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persists the order, its items, the customer record and the stock
    /// decrements atomically. Fails with `InsufficientStock` and writes
    /// nothing if any line exceeds live stock.
    fn place_order(&self, draft: OrderDraft) -> Result<PlacedOrder, DomainError>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    /// Moves the order from `from` to `to`. Fails with `Conflict` if the
    /// stored status is no longer `from`.
    fn set_status(
        &self,
        order_number: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), DomainError>;
}

/// Session-scoped cart persistence.
pub trait CartStore: Send + Sync + 'static {
    /// Returns an empty cart for unknown sessions.
    fn load(&self, session_id: &str) -> Result<Cart, DomainError>;
    fn save(&self, session_id: &str, cart: &Cart) -> Result<(), DomainError>;
    fn clear(&self, session_id: &str) -> Result<(), DomainError>;
}

pub trait ActivityLog: Send + Sync + 'static {
    fn record(&self, entry: NewActivity) -> Result<(), DomainError>;
    fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, DomainError>;
}
