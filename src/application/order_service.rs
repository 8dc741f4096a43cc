use std::sync::Arc;

use super::audit;
use crate::domain::activity::{ActivityAction, ActivityEntry, NewActivity};
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderStatus, OrderView};
use crate::domain::ports::{ActivityLog, OrderRepository};
use crate::domain::role::{Actor, Capability};

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { repo, activity }
    }

    pub fn get_order(&self, order_number: &str) -> Result<OrderView, DomainError> {
        self.repo
            .find_by_number(order_number)?
            .ok_or_else(|| DomainError::NotFound(format!("Order {order_number}")))
    }

    pub fn list_orders(&self, actor: &Actor, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        actor.authorize(Capability::ViewOrders)?;
        self.repo.list(page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
    }

    pub fn update_status(
        &self,
        actor: &Actor,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<OrderView, DomainError> {
        actor.authorize(Capability::ManageOrders)?;

        let order = self.get_order(order_number)?;
        if !order.status.can_transition_to(status) {
            return Err(DomainError::InvalidInput(format!(
                "cannot move order from {} to {status}",
                order.status
            )));
        }

        self.repo.set_status(order_number, order.status, status)?;
        audit(self.activity.as_ref(), NewActivity {
            actor: actor.clone(),
            action: ActivityAction::OrderStatusChanged,
            product_id: None,
            product_sku: None,
            product_name: None,
            details: format!("{order_number}: {} -> {status}", order.status),
        });

        log::info!("{} moved order {order_number} to {status}", actor.name);
        self.get_order(order_number)
    }

    pub fn activity(&self, actor: &Actor, limit: i64) -> Result<Vec<ActivityEntry>, DomainError> {
        actor.authorize(Capability::ViewActivityLog)?;
        self.activity.recent(limit.clamp(1, MAX_PAGE_SIZE))
    }
}
