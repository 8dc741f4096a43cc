pub mod activity;
pub mod cart;
pub mod errors;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod product;
pub mod role;
pub mod search;
