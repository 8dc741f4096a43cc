use chrono::{DateTime, Utc};

use super::role::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    ProductCreated,
    ProductUpdated,
    OrderStatusChanged,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductCreated => "product_created",
            Self::ProductUpdated => "product_updated",
            Self::OrderStatusChanged => "order_status_changed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub actor: Actor,
    pub action: ActivityAction,
    pub product_id: Option<i32>,
    pub product_sku: Option<String>,
    pub product_name: Option<String>,
    pub details: String,
}

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub id: i32,
    pub user_name: String,
    pub user_role: String,
    pub action: String,
    pub product_id: Option<i32>,
    pub product_sku: Option<String>,
    pub product_name: Option<String>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}
