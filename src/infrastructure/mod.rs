pub mod activity_repo;
pub mod cart_store;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod product_repo;

#[cfg(test)]
pub(crate) mod test_db;

pub use activity_repo::DieselActivityLog;
pub use cart_store::InMemoryCartStore;
pub use memory::MemoryStore;
pub use order_repo::DieselOrderRepository;
pub use product_repo::DieselProductRepository;
