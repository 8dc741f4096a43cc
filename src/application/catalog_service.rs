use std::sync::Arc;

use super::audit;
use crate::domain::activity::{ActivityAction, NewActivity};
use crate::domain::errors::DomainError;
use crate::domain::ports::{ActivityLog, ProductRepository};
use crate::domain::product::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::domain::role::{Actor, Capability};

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { products, activity }
    }

    pub fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        self.products.list(filter)
    }

    pub fn get(&self, id: i32) -> Result<Product, DomainError> {
        self.products
            .find_by_id(id)?
            .ok_or_else(|| DomainError::NotFound(format!("Product {id}")))
    }

    pub fn get_by_sku(&self, sku: &str) -> Result<Product, DomainError> {
        self.products
            .find_by_sku(sku)?
            .ok_or_else(|| DomainError::NotFound(format!("Product {sku}")))
    }

    pub fn create(&self, actor: &Actor, product: NewProduct) -> Result<Product, DomainError> {
        actor.authorize(Capability::ManageProducts)?;
        let product = product.normalized();
        product.validate()?;

        if self.products.find_by_sku(&product.sku)?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Product with SKU {} already exists",
                product.sku
            )));
        }

        let created = self.products.create(product)?;
        audit(self.activity.as_ref(), NewActivity {
            actor: actor.clone(),
            action: ActivityAction::ProductCreated,
            product_id: Some(created.id),
            product_sku: Some(created.sku.clone()),
            product_name: Some(created.name.clone()),
            details: format!("price {}, stock {}", created.price, created.stock),
        });

        log::info!("{} created product {}", actor.name, created.sku);
        Ok(created)
    }

    pub fn update(
        &self,
        actor: &Actor,
        sku: &str,
        update: ProductUpdate,
    ) -> Result<Product, DomainError> {
        actor.authorize(Capability::ManageProducts)?;
        update.validate()?;

        let updated = self
            .products
            .update(sku, &update)?
            .ok_or_else(|| DomainError::NotFound(format!("Product {sku}")))?;

        audit(self.activity.as_ref(), NewActivity {
            actor: actor.clone(),
            action: ActivityAction::ProductUpdated,
            product_id: Some(updated.id),
            product_sku: Some(updated.sku.clone()),
            product_name: Some(updated.name.clone()),
            details: format!("changed {}", update.changed_fields().join(", ")),
        });

        log::info!("{} updated product {sku}", actor.name);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::role::Role;
    use crate::infrastructure::memory::{sample_product, MemoryStore};

    fn service() -> (CatalogService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.insert_product(sample_product(1, "A-TAMP-002", "Barista Tamper", "39.00", 60));
        (CatalogService::new(store.clone(), store.clone()), store)
    }

    fn new_product(sku: &str) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: "Milk Frothing Pitcher 600ml".to_string(),
            brand: Some("Cruzy Coffee".to_string()),
            category: "accessories".to_string(),
            subcategory: Some("brewing-equipment".to_string()),
            price: BigDecimal::from_str("29.50").expect("dec"),
            stock: 75,
            discount_percentage: 0,
            description: None,
            image: None,
            taste: Default::default(),
        }
    }

    #[test]
    fn admin_creates_product_and_activity_is_logged() {
        let (service, store) = service();
        let admin = Actor::new("Alex", Role::Admin);

        let created = service.create(&admin, new_product("A-PITCH-003")).expect("create");

        assert_eq!(service.get(created.id).expect("get").sku, "A-PITCH-003");
        assert_eq!(service.get_by_sku("A-PITCH-003").expect("by sku").id, created.id);
        let entries = store.activity_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "product_created");
        assert_eq!(entries[0].user_role, "admin");
    }

    #[test]
    fn duplicate_sku_is_a_conflict() {
        let (service, _) = service();
        let admin = Actor::new("Alex", Role::Admin);
        assert!(matches!(
            service.create(&admin, new_product("A-TAMP-002")),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn padded_duplicate_sku_is_a_conflict() {
        let (service, _) = service();
        let admin = Actor::new("Alex", Role::Admin);
        assert!(matches!(
            service.create(&admin, new_product("  A-TAMP-002 ")),
            Err(DomainError::Conflict(_))
        ));

        let created = service.create(&admin, new_product(" A-PITCH-003\t")).expect("create");
        assert_eq!(created.sku, "A-PITCH-003");
        assert!(matches!(
            service.create(&admin, new_product("A-PITCH-003")),
            Err(DomainError::Conflict(_))
        ));
    }

    struct BrokenLog;

    impl ActivityLog for BrokenLog {
        fn record(&self, _: NewActivity) -> Result<(), DomainError> {
            Err(DomainError::Internal("activity table unavailable".to_string()))
        }

        fn recent(&self, _: i64) -> Result<Vec<crate::domain::activity::ActivityEntry>, DomainError> {
            Ok(vec![])
        }
    }

    #[test]
    fn committed_writes_survive_activity_log_failures() {
        let store = Arc::new(MemoryStore::new());
        let service = CatalogService::new(store.clone(), Arc::new(BrokenLog));
        let admin = Actor::new("Alex", Role::Admin);

        let created = service.create(&admin, new_product("A-PITCH-003")).expect("create");
        assert_eq!(service.get_by_sku("A-PITCH-003").expect("stored").id, created.id);

        let update = ProductUpdate {
            stock: Some(12),
            ..Default::default()
        };
        let updated = service.update(&admin, "A-PITCH-003", update).expect("update");
        assert_eq!(updated.stock, 12);
    }

    #[test]
    fn customers_cannot_edit_catalog() {
        let (service, store) = service();
        let customer = Actor::new("Sam", Role::Customer);
        let update = ProductUpdate {
            stock: Some(0),
            ..Default::default()
        };

        assert!(matches!(
            service.update(&customer, "A-TAMP-002", update),
            Err(DomainError::Forbidden(_))
        ));
        assert!(store.activity_entries().is_empty());
    }

    #[test]
    fn update_unknown_sku_is_not_found() {
        let (service, _) = service();
        let manager = Actor::new("Cruz", Role::Manager);
        let update = ProductUpdate {
            stock: Some(4),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&manager, "NOPE", update),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(service.get_by_sku("NOPE"), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn update_changes_fields_and_logs_them() {
        let (service, store) = service();
        let manager = Actor::new("Cruz", Role::Manager);
        let update = ProductUpdate {
            price: Some(BigDecimal::from_str("35.00").expect("dec")),
            discount_percentage: Some(10),
            ..Default::default()
        };

        let updated = service.update(&manager, "A-TAMP-002", update).expect("update");

        assert_eq!(updated.discounted_price(), BigDecimal::from_str("31.50").expect("dec"));
        assert_eq!(
            store.activity_entries()[0].details,
            "changed price, discount_percentage"
        );
    }
}
