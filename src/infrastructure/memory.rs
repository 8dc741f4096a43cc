//! Process-local implementation of every repository port, used by the
//! `memory` backend and by tests.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::activity::{ActivityEntry, NewActivity};
use crate::domain::errors::{DomainError, StockShortfall};
use crate::domain::order::{
    page_offset, status_changed, ListResult, OrderDraft, OrderItemView, OrderStatus, OrderView,
    PlacedOrder,
};
use crate::domain::ports::{ActivityLog, OrderRepository, ProductRepository};
use crate::domain::product::{NewProduct, Product, ProductFilter, ProductUpdate, TasteProfile};
use crate::domain::search::product_matches;

#[derive(Default)]
struct State {
    products: BTreeMap<i32, Product>,
    customers: HashMap<String, i32>,
    orders: Vec<OrderView>,
    activity: Vec<ActivityEntry>,
    next_product_id: i32,
    next_customer_id: i32,
    next_order_id: i32,
    next_item_id: i32,
    next_activity_id: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with the shop's starter catalog.
    pub fn with_sample_catalog() -> Self {
        let store = Self::new();
        for product in sample_catalog() {
            store.insert_product(product);
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or replaces a product by id.
    pub fn insert_product(&self, product: Product) {
        let mut state = self.lock();
        state.next_product_id = state.next_product_id.max(product.id);
        state.products.insert(product.id, product);
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn order_by_number(&self, order_number: &str) -> Option<OrderView> {
        self.lock()
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned()
    }

    pub fn activity_entries(&self) -> Vec<ActivityEntry> {
        self.lock().activity.clone()
    }
}

impl ProductRepository for MemoryStore {
    fn find_by_id(&self, id: i32) -> Result<Option<Product>, DomainError> {
        Ok(self.lock().products.get(&id).cloned())
    }

    fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, DomainError> {
        Ok(self
            .lock()
            .products
            .values()
            .find(|p| p.sku == sku)
            .cloned())
    }

    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = self
            .lock()
            .products
            .values()
            .filter(|p| filter.category.as_ref().map_or(true, |c| &p.category == c))
            .filter(|p| {
                filter
                    .subcategory
                    .as_ref()
                    .map_or(true, |s| p.subcategory.as_ref() == Some(s))
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| (&a.brand, &a.name).cmp(&(&b.brand, &b.name)));
        Ok(products)
    }

    fn search(&self, terms: &[String], category: Option<&str>) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .lock()
            .products
            .values()
            .filter(|p| category.map_or(true, |c| p.category.eq_ignore_ascii_case(c)))
            .filter(|p| product_matches(p, terms))
            .cloned()
            .collect())
    }

    fn vocabulary(&self) -> Result<Vec<String>, DomainError> {
        let state = self.lock();
        let mut words: Vec<String> = state
            .products
            .values()
            .flat_map(|p| std::iter::once(p.name.clone()).chain(p.brand.clone()))
            .collect();
        words.sort();
        words.dedup();
        Ok(words)
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut state = self.lock();
        if state.products.values().any(|p| p.sku == product.sku) {
            return Err(DomainError::Conflict(format!(
                "Product with SKU {} already exists",
                product.sku
            )));
        }
        let id = next(&mut state.next_product_id);
        let created = Product {
            id,
            sku: product.sku,
            name: product.name,
            brand: product.brand,
            category: product.category,
            subcategory: product.subcategory,
            price: product.price,
            stock: product.stock,
            discount_percentage: product.discount_percentage,
            description: product.description,
            image: product.image,
            taste: product.taste,
        };
        state.products.insert(id, created.clone());
        Ok(created)
    }

    fn update(&self, sku: &str, update: &ProductUpdate) -> Result<Option<Product>, DomainError> {
        let mut state = self.lock();
        let Some(product) = state.products.values_mut().find(|p| p.sku == sku) else {
            return Ok(None);
        };
        update.apply(product);
        Ok(Some(product.clone()))
    }
}

impl OrderRepository for MemoryStore {
    fn place_order(&self, draft: OrderDraft) -> Result<PlacedOrder, DomainError> {
        // One lock for the whole operation stands in for a transaction.
        let mut state = self.lock();

        let shortfalls: Vec<StockShortfall> = draft
            .items
            .iter()
            .filter_map(|item| match state.products.get(&item.product_id) {
                Some(p) if p.stock >= item.quantity => None,
                Some(p) => Some(StockShortfall {
                    product_id: p.id,
                    name: p.name.clone(),
                    requested: item.quantity,
                    available: p.stock,
                }),
                None => Some(StockShortfall {
                    product_id: item.product_id,
                    name: item.name.clone(),
                    requested: item.quantity,
                    available: 0,
                }),
            })
            .collect();
        if !shortfalls.is_empty() {
            return Err(DomainError::InsufficientStock(shortfalls));
        }

        let existing = state.customers.get(&draft.shipping.email).copied();
        let customer_id = match existing {
            Some(id) => id,
            None => {
                let id = next(&mut state.next_customer_id);
                state.customers.insert(draft.shipping.email.clone(), id);
                id
            }
        };

        let mut items = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            let id = next(&mut state.next_item_id);
            let Some(product) = state.products.get_mut(&item.product_id) else {
                continue;
            };
            product.stock = (product.stock - item.quantity).max(0);
            items.push(OrderItemView {
                id,
                product_id: product.id,
                sku: product.sku.clone(),
                name: product.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price.clone(),
                subtotal: &item.unit_price * BigDecimal::from(item.quantity),
            });
        }

        let id = next(&mut state.next_order_id);
        state.orders.push(OrderView {
            id,
            order_number: draft.order_number.clone(),
            customer_id,
            shipping: draft.shipping,
            payment_method: draft.payment_method.as_str().to_string(),
            status: OrderStatus::Pending,
            subtotal: draft.pricing.subtotal,
            tax: draft.pricing.tax,
            shipping_cost: draft.pricing.shipping,
            total: draft.pricing.total,
            created_at: Utc::now(),
            items,
        });

        Ok(PlacedOrder {
            id,
            order_number: draft.order_number,
        })
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        Ok(self.order_by_number(order_number))
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let state = self.lock();
        let offset = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);

        let items = state
            .orders
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .map(|o| OrderView {
                items: vec![],
                ..o.clone()
            })
            .collect();

        Ok(ListResult {
            items,
            total: state.orders.len() as i64,
        })
    }

    fn set_status(
        &self,
        order_number: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), DomainError> {
        let mut state = self.lock();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.order_number == order_number)
            .ok_or_else(|| DomainError::NotFound(format!("Order {order_number}")))?;
        if order.status != from {
            return Err(status_changed(order_number, order.status));
        }
        order.status = to;
        Ok(())
    }
}

impl ActivityLog for MemoryStore {
    fn record(&self, entry: NewActivity) -> Result<(), DomainError> {
        let mut state = self.lock();
        let id = next(&mut state.next_activity_id);
        state.activity.push(ActivityEntry {
            id,
            user_name: entry.actor.name,
            user_role: entry.actor.role.as_str().to_string(),
            action: entry.action.as_str().to_string(),
            product_id: entry.product_id,
            product_sku: entry.product_sku,
            product_name: entry.product_name,
            details: entry.details,
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, DomainError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self.lock().activity.iter().rev().take(limit).cloned().collect())
    }
}

/// Builds a product whose category follows the SKU prefix convention
/// (`M-` machines, `B-` beans, anything else accessories).
pub fn sample_product(id: i32, sku: &str, name: &str, price: &str, stock: i32) -> Product {
    let category = match sku.split('-').next() {
        Some("M") => "machines",
        Some("B") => "beans",
        _ => "accessories",
    };
    Product {
        id,
        sku: sku.to_string(),
        name: name.to_string(),
        brand: None,
        category: category.to_string(),
        subcategory: None,
        price: BigDecimal::from_str(price).unwrap_or_default(),
        stock,
        discount_percentage: 0,
        description: None,
        image: Some(format!("{sku}.jpg")),
        taste: Default::default(),
    }
}

fn sample_catalog() -> Vec<Product> {
    let house = "Cruzy Coffee";
    let rows: [(&str, &str, &str, Option<&str>, &str, i32, &str); 9] = [
        ("B-HOUSE-001", "House Blend 1kg", house, None, "24.50", 50, "Medium roast - chocolate & citrus notes"),
        ("B-COL-002", "Single Origin Colombia 250g", house, None, "12.00", 80, "Light-medium roast, bright acidity"),
        ("B-ESP-003", "Dark Roast Espresso 250g", house, None, "11.00", 40, "Rich, full-bodied dark roast"),
        ("A-GRID-001", "Precision Grinder", house, Some("grinders"), "199.00", 15, "Consistent grind for every brew"),
        ("A-TAMP-002", "Barista Tamper", house, Some("brewing-equipment"), "39.00", 60, "Stainless steel tamper with calibration"),
        ("A-PITCH-003", "Milk Frothing Pitcher 600ml", house, Some("brewing-equipment"), "29.50", 75, "Professional stainless pitcher"),
        ("M-BRE001", "Breville Barista Express", "Breville", Some("semi-auto"), "879.00", 5, "Semi-automatic espresso machine from Breville"),
        ("M-DEL001", "DeLonghi Dedica EC685M", "DeLonghi", Some("semi-auto"), "599.00", 5, "Semi-automatic espresso machine from DeLonghi"),
        ("M-ROC001", "Rocket Espresso Appartamento", "Rocket Espresso", Some("semi-auto"), "1868.90", 5, "Semi-automatic espresso machine from Rocket Espresso"),
    ];

    rows.into_iter()
        .zip(1..)
        .map(|((sku, name, brand, subcategory, price, stock, description), id)| Product {
            brand: Some(brand.to_string()),
            subcategory: subcategory.map(str::to_string),
            description: Some(description.to_string()),
            taste: bean_taste(sku),
            ..sample_product(id, sku, name, price, stock)
        })
        .collect()
}

fn bean_taste(sku: &str) -> TasteProfile {
    let (sweetness, aroma, body) = match sku {
        "B-HOUSE-001" => (3, 4, 3),
        "B-COL-002" => (4, 4, 2),
        "B-ESP-003" => (2, 5, 5),
        _ => return TasteProfile::default(),
    };
    TasteProfile {
        sweetness: Some(sweetness),
        aroma: Some(aroma),
        body: Some(body),
    }
}
