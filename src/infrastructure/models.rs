use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::activity::ActivityEntry;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderItemView, OrderStatus, OrderView, ShippingDetails};
use crate::domain::product::{NewProduct, Product, ProductUpdate, TasteProfile};
use crate::schema::{activity_log, customers, order_items, orders, products};

// ── Products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub discount_percentage: i32,
    pub description: Option<String>,
    pub image: Option<String>,
    pub taste_sweetness: Option<i32>,
    pub taste_aroma: Option<i32>,
    pub taste_body: Option<i32>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            brand: row.brand,
            category: row.category,
            subcategory: row.subcategory,
            price: row.price,
            stock: row.stock,
            discount_percentage: row.discount_percentage,
            description: row.description,
            image: row.image,
            taste: TasteProfile {
                sweetness: row.taste_sweetness,
                aroma: row.taste_aroma,
                body: row.taste_body,
            },
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub sku: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub discount_percentage: i32,
    pub description: Option<String>,
    pub image: Option<String>,
    pub taste_sweetness: Option<i32>,
    pub taste_aroma: Option<i32>,
    pub taste_body: Option<i32>,
}

impl From<NewProduct> for NewProductRow {
    fn from(p: NewProduct) -> Self {
        NewProductRow {
            sku: p.sku,
            name: p.name,
            brand: p.brand,
            category: p.category,
            subcategory: p.subcategory,
            price: p.price,
            stock: p.stock,
            discount_percentage: p.discount_percentage,
            description: p.description,
            image: p.image,
            taste_sweetness: p.taste.sweetness,
            taste_aroma: p.taste.aroma,
            taste_body: p.taste.body,
        }
    }
}

/// `None` fields are skipped by Diesel's `AsChangeset`.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub subcategory: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub discount_percentage: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub taste_sweetness: Option<i32>,
    pub taste_aroma: Option<i32>,
    pub taste_body: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ProductUpdate> for ProductChangeset {
    fn from(u: &ProductUpdate) -> Self {
        ProductChangeset {
            name: u.name.as_deref().map(|n| n.trim().to_string()),
            brand: u.brand.clone(),
            subcategory: u.subcategory.clone(),
            price: u.price.clone(),
            stock: u.stock,
            discount_percentage: u.discount_percentage,
            description: u.description.clone(),
            image: u.image.clone(),
            taste_sweetness: u.taste_sweetness,
            taste_aroma: u.taste_aroma,
            taste_body: u.taste_body,
            updated_at: Utc::now(),
        }
    }
}

// ── Customers ────────────────────────────────────────────────────────────────

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = customers)]
pub struct CustomerContactRow {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: String,
}

impl From<&ShippingDetails> for CustomerContactRow {
    fn from(s: &ShippingDetails) -> Self {
        CustomerContactRow {
            name: s.name.clone(),
            email: s.email.clone(),
            phone: s.phone.clone(),
            address: s.address.clone(),
            city: s.city.clone(),
            state: s.state.clone(),
            postcode: s.postcode.clone(),
            country: s.country.clone(),
        }
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i32,
    pub order_number: String,
    pub customer_id: i32,
    pub shipping_name: String,
    pub shipping_email: String,
    pub shipping_phone: Option<String>,
    pub shipping_address: String,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_postcode: Option<String>,
    pub shipping_country: String,
    pub payment_method: String,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub total: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    /// Unknown status strings are reported rather than silently coerced.
    pub fn into_view(self, items: Vec<OrderItemView>) -> Result<OrderView, DomainError> {
        let status: OrderStatus = self.status.parse()?;
        Ok(OrderView {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            shipping: ShippingDetails {
                name: self.shipping_name,
                email: self.shipping_email,
                phone: self.shipping_phone,
                address: self.shipping_address,
                city: self.shipping_city,
                state: self.shipping_state,
                postcode: self.shipping_postcode,
                country: self.shipping_country,
            },
            payment_method: self.payment_method,
            status,
            subtotal: self.subtotal,
            tax: self.tax,
            shipping_cost: self.shipping_cost,
            total: self.total,
            created_at: self.created_at,
            items,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub order_number: String,
    pub customer_id: i32,
    pub shipping_name: String,
    pub shipping_email: String,
    pub shipping_phone: Option<String>,
    pub shipping_address: String,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_postcode: Option<String>,
    pub shipping_country: String,
    pub payment_method: String,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub total: BigDecimal,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

impl From<OrderItemRow> for OrderItemView {
    fn from(row: OrderItemRow) -> Self {
        OrderItemView {
            id: row.id,
            product_id: row.product_id,
            sku: row.sku,
            name: row.name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: i32,
    pub product_id: i32,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

// ── Activity log ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = activity_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
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

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        ActivityEntry {
            id: row.id,
            user_name: row.user_name,
            user_role: row.user_role,
            action: row.action,
            product_id: row.product_id,
            product_sku: row.product_sku,
            product_name: row.product_name,
            details: row.details,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_log)]
pub struct NewActivityRow {
    pub user_name: String,
    pub user_role: String,
    pub action: String,
    pub product_id: Option<i32>,
    pub product_sku: Option<String>,
    pub product_name: Option<String>,
    pub details: String,
}
