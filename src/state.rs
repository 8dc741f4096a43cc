use std::sync::Arc;

use crate::application::cart_service::CartService;
use crate::application::catalog_service::CatalogService;
use crate::application::checkout_service::CheckoutService;
use crate::application::order_service::OrderService;
use crate::application::search_service::SearchService;
use crate::db::DbPool;
use crate::domain::ports::{ActivityLog, CartStore, OrderRepository, ProductRepository};
use crate::domain::pricing::PricingConfig;
use crate::infrastructure::{
    DieselActivityLog, DieselOrderRepository, DieselProductRepository, InMemoryCartStore,
    MemoryStore,
};

/// Services shared by every actix worker.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub search: SearchService,
    pub cart: CartService,
    pub checkout: CheckoutService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        activity: Arc<dyn ActivityLog>,
        carts: Arc<dyn CartStore>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            catalog: CatalogService::new(products.clone(), activity.clone()),
            search: SearchService::new(products.clone()),
            cart: CartService::new(products, carts.clone(), pricing.clone()),
            checkout: CheckoutService::new(orders.clone(), carts, pricing),
            orders: OrderService::new(orders, activity),
        }
    }

    /// PostgreSQL-backed catalog and orders; carts stay in process memory.
    pub fn postgres(pool: DbPool, pricing: PricingConfig) -> Self {
        Self::new(
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool.clone())),
            Arc::new(DieselActivityLog::new(pool)),
            Arc::new(InMemoryCartStore::new()),
            pricing,
        )
    }

    /// Everything in process memory, seeded with the starter catalog.
    pub fn in_memory(pricing: PricingConfig) -> Self {
        let store = Arc::new(MemoryStore::with_sample_catalog());
        Self::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(InMemoryCartStore::new()),
            pricing,
        )
    }
}
