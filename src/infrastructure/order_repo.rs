use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::sql_types::Integer;

use crate::db::DbPool;
use crate::domain::errors::{DomainError, StockShortfall};
use crate::domain::order::{
    page_offset, status_changed, ListResult, OrderDraft, OrderItemView, OrderStatus, OrderView,
    PlacedOrder,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{customers, order_items, orders, products};

use super::models::{CustomerContactRow, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow, ProductRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

diesel::define_sql_function!(fn greatest(a: Integer, b: Integer) -> Integer);

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn place_order(&self, draft: OrderDraft) -> Result<PlacedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock every product row involved, in id order, and re-check stock.
            let ids: Vec<i32> = draft.items.iter().map(|i| i.product_id).collect();
            let locked: HashMap<i32, ProductRow> = products::table
                .filter(products::id.eq_any(&ids))
                .order(products::id.asc())
                .select(ProductRow::as_select())
                .for_update()
                .load(conn)?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();

            let shortfalls: Vec<StockShortfall> = draft
                .items
                .iter()
                .filter_map(|item| {
                    let (name, available) = match locked.get(&item.product_id) {
                        Some(p) if p.stock >= item.quantity => return None,
                        Some(p) => (p.name.clone(), p.stock),
                        None => (item.name.clone(), 0),
                    };
                    Some(StockShortfall {
                        product_id: item.product_id,
                        name,
                        requested: item.quantity,
                        available,
                    })
                })
                .collect();
            if !shortfalls.is_empty() {
                return Err(DomainError::InsufficientStock(shortfalls));
            }

            // 2. Get-or-create the customer by email, refreshing contact details.
            let contact = CustomerContactRow::from(&draft.shipping);
            let customer_id: i32 = diesel::insert_into(customers::table)
                .values(&contact)
                .on_conflict(customers::email)
                .do_update()
                .set((&contact, customers::updated_at.eq(Utc::now())))
                .returning(customers::id)
                .get_result(conn)?;

            // 3. Insert the order with its shipping snapshot and totals.
            let shipping = &draft.shipping;
            let order_id: i32 = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    order_number: draft.order_number.clone(),
                    customer_id,
                    shipping_name: shipping.name.clone(),
                    shipping_email: shipping.email.clone(),
                    shipping_phone: shipping.phone.clone(),
                    shipping_address: shipping.address.clone(),
                    shipping_city: shipping.city.clone(),
                    shipping_state: shipping.state.clone(),
                    shipping_postcode: shipping.postcode.clone(),
                    shipping_country: shipping.country.clone(),
                    payment_method: draft.payment_method.as_str().to_string(),
                    subtotal: draft.pricing.subtotal.clone(),
                    tax: draft.pricing.tax.clone(),
                    shipping_cost: draft.pricing.shipping.clone(),
                    total: draft.pricing.total.clone(),
                    status: OrderStatus::Pending.as_str().to_string(),
                })
                .returning(orders::id)
                .get_result(conn)?;

            // 4. Snapshot the items.
            let new_items: Vec<NewOrderItemRow> = draft
                .items
                .iter()
                .filter_map(|item| {
                    let product = locked.get(&item.product_id)?;
                    Some(NewOrderItemRow {
                        order_id,
                        product_id: item.product_id,
                        sku: product.sku.clone(),
                        name: product.name.clone(),
                        quantity: item.quantity,
                        unit_price: item.unit_price.clone(),
                        subtotal: &item.unit_price * BigDecimal::from(item.quantity),
                    })
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            // 5. Decrement stock, never below zero.
            for item in &draft.items {
                diesel::update(products::table.find(item.product_id))
                    .set((
                        products::stock.eq(greatest(products::stock - item.quantity, 0)),
                        products::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
            }

            Ok(PlacedOrder {
                id: order_id,
                order_number: draft.order_number.clone(),
            })
        })
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::order_number.eq(order_number))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = OrderItemRow::belonging_to(&order)
            .order(order_items::id.asc())
            .select(OrderItemRow::as_select())
            .load(&mut conn)?;

        order
            .into_view(items.into_iter().map(OrderItemView::from).collect())
            .map(Some)
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = page_offset(page, limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(|o| o.into_view(vec![]))
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }

    fn set_status(
        &self,
        order_number: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            orders::table
                .filter(orders::order_number.eq(order_number))
                .filter(orders::status.eq(from.as_str())),
        )
        .set((
            orders::status.eq(to.as_str()),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        if updated > 0 {
            return Ok(());
        }

        let current: Option<String> = orders::table
            .filter(orders::order_number.eq(order_number))
            .select(orders::status)
            .first(&mut conn)
            .optional()?;
        match current {
            None => Err(DomainError::NotFound(format!("Order {order_number}"))),
            Some(current) => Err(status_changed(order_number, current.parse()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use diesel::prelude::*;

    use super::DieselOrderRepository;
    use crate::domain::cart::Cart;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{generate_order_number, OrderDraft, OrderStatus, ShippingForm};
    use crate::domain::ports::{OrderRepository, ProductRepository};
    use crate::domain::pricing::PricingConfig;
    use crate::domain::product::NewProduct;
    use crate::infrastructure::product_repo::DieselProductRepository;
    use crate::infrastructure::test_db::setup_db;
    use crate::schema::customers;

    fn new_product(sku: &str, price: &str, stock: i32) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            brand: Some("Cruzy Coffee".to_string()),
            category: "accessories".to_string(),
            subcategory: None,
            price: BigDecimal::from_str(price).expect("valid decimal"),
            stock,
            discount_percentage: 0,
            description: None,
            image: None,
            taste: Default::default(),
        }
    }

    fn draft(cart: &Cart, email: &str) -> OrderDraft {
        let (shipping, payment) = ShippingForm {
            name: Some("Cruz Leung".to_string()),
            email: Some(email.to_string()),
            address: Some("123 Coffee Street".to_string()),
            ..Default::default()
        }
        .validate()
        .expect("valid form");
        OrderDraft::from_cart(
            generate_order_number(),
            cart,
            shipping,
            payment,
            PricingConfig::default().quote(cart),
        )
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn place_order_persists_items_and_decrements_stock() {
        let (_container, pool) = setup_db().await;
        let products = DieselProductRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool);

        let tamper = products
            .create(new_product("A-TAMP-002", "39.00", 5))
            .expect("create product");
        let mut cart = Cart::new();
        cart.add(&tamper, 2).expect("add");

        let placed = orders
            .place_order(draft(&cart, "cruz@example.com"))
            .expect("place order");

        let order = orders
            .find_by_number(&placed.order_number)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(order.id, placed.id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].sku, "A-TAMP-002");
        assert_eq!(order.items[0].subtotal, BigDecimal::from(78));
        assert_eq!(
            order.total,
            &order.subtotal + &order.tax + &order.shipping_cost
        );

        let after = products
            .find_by_id(tamper.id)
            .expect("find product")
            .expect("product exists");
        assert_eq!(after.stock, 3);
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn place_order_rejects_short_stock_without_writing() {
        let (_container, pool) = setup_db().await;
        let products = DieselProductRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool.clone());

        let grinder = products
            .create(new_product("A-GRID-001", "199.00", 1))
            .expect("create product");
        let mut cart = Cart::new();
        cart.add(&grinder, 3).expect("add");

        let err = orders
            .place_order(draft(&cart, "cruz@example.com"))
            .expect_err("stock is short");
        match err {
            DomainError::InsufficientStock(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].available, 1);
                assert_eq!(items[0].requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(orders.list(1, 20).expect("list").total, 0);
        let mut conn = pool.get().expect("connection");
        let customer_count: i64 = customers::table
            .count()
            .get_result(&mut conn)
            .expect("count customers");
        assert_eq!(customer_count, 0);
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn repeat_customers_are_reused_by_email() {
        let (_container, pool) = setup_db().await;
        let products = DieselProductRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool);

        let beans = products
            .create(new_product("B-HOUSE-001", "24.50", 50))
            .expect("create product");
        let mut cart = Cart::new();
        cart.add(&beans, 1).expect("add");

        let first = orders
            .place_order(draft(&cart, "cruz@example.com"))
            .expect("first order");
        let second = orders
            .place_order(draft(&cart, "cruz@example.com"))
            .expect("second order");

        let a = orders.find_by_number(&first.order_number).expect("find").expect("exists");
        let b = orders.find_by_number(&second.order_number).expect("find").expect("exists");
        assert_eq!(a.customer_id, b.customer_id);
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn list_paginates_newest_first() {
        let (_container, pool) = setup_db().await;
        let products = DieselProductRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool);

        let beans = products
            .create(new_product("B-COL-002", "12.00", 80))
            .expect("create product");
        let mut cart = Cart::new();
        cart.add(&beans, 1).expect("add");

        let mut numbers = Vec::new();
        for _ in 0..5 {
            numbers.push(
                orders
                    .place_order(draft(&cart, "cruz@example.com"))
                    .expect("place order")
                    .order_number,
            );
        }

        let page1 = orders.list(1, 3).expect("list page 1 failed");
        assert_eq!(page1.total, 5);
        assert_eq!(page1.items.len(), 3);
        assert_eq!(page1.items[0].order_number, numbers[4]);

        let page2 = orders.list(2, 3).expect("list page 2 failed");
        assert_eq!(page2.items.len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn set_status_updates_and_reports_unknown_orders() {
        let (_container, pool) = setup_db().await;
        let products = DieselProductRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool);

        let beans = products
            .create(new_product("B-ESP-003", "11.00", 40))
            .expect("create product");
        let mut cart = Cart::new();
        cart.add(&beans, 1).expect("add");
        let placed = orders
            .place_order(draft(&cart, "cruz@example.com"))
            .expect("place order");

        orders
            .set_status(&placed.order_number, OrderStatus::Pending, OrderStatus::Processing)
            .expect("set status");
        let order = orders
            .find_by_number(&placed.order_number)
            .expect("find")
            .expect("exists");
        assert_eq!(order.status, OrderStatus::Processing);

        // A second writer still believing the order is pending loses.
        assert!(matches!(
            orders.set_status(&placed.order_number, OrderStatus::Pending, OrderStatus::Cancelled),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            orders.set_status("ORD-0000000000", OrderStatus::Pending, OrderStatus::Shipped),
            Err(DomainError::NotFound(_))
        ));
    }
}
