use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::product::Product;

/// One product's entry in a session cart.
///
/// `unit_price` is the discounted price captured when the product was first
/// added; later catalog edits do not change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i32,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub original_price: BigDecimal,
    pub discount_percentage: i32,
}

impl CartLine {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<i32, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn line(&self, product_id: i32) -> Option<&CartLine> {
        self.lines.get(&product_id)
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i32 {
        // add and set_quantity keep the total within i32.
        i32::try_from(self.units_except(None)).unwrap_or(i32::MAX)
    }

    fn units_except(&self, product_id: Option<i32>) -> i64 {
        self.lines
            .values()
            .filter(|l| Some(l.product_id) != product_id)
            .map(|l| i64::from(l.quantity))
            .sum()
    }

    fn check_total(&self, product_id: i32, quantity: i64) -> Result<i32, DomainError> {
        let too_large = || DomainError::InvalidInput("quantity is too large".to_string());
        i32::try_from(self.units_except(Some(product_id)) + quantity).map_err(|_| too_large())?;
        i32::try_from(quantity).map_err(|_| too_large())
    }

    pub fn subtotal(&self) -> BigDecimal {
        self.lines
            .values()
            .fold(BigDecimal::from(0), |acc, l| acc + l.line_total())
    }

    /// Adds `quantity` units of `product`. An existing line keeps the price it
    /// captured on first add.
    pub fn add(&mut self, product: &Product, quantity: i32) -> Result<(), DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidInput(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let current = self.lines.get(&product.id).map_or(0, |l| l.quantity);
        let quantity = self.check_total(product.id, i64::from(current) + i64::from(quantity))?;

        match self.lines.get_mut(&product.id) {
            Some(line) => line.quantity = quantity,
            None => {
                self.lines.insert(
                    product.id,
                    CartLine {
                        product_id: product.id,
                        name: product.name.clone(),
                        image: product.image.clone(),
                        quantity,
                        unit_price: product.discounted_price(),
                        original_price: product.price.clone(),
                        discount_percentage: product.discount_percentage,
                    },
                );
            }
        }
        Ok(())
    }

    /// Sets the quantity of an existing line; zero or less removes it.
    pub fn set_quantity(&mut self, product_id: i32, quantity: i32) -> Result<(), DomainError> {
        if !self.lines.contains_key(&product_id) {
            return Err(DomainError::NotFound(format!(
                "Product {product_id} in cart"
            )));
        }
        if quantity <= 0 {
            self.lines.remove(&product_id);
            return Ok(());
        }
        let quantity = self.check_total(product_id, i64::from(quantity))?;
        if let Some(line) = self.lines.get_mut(&product_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: i32) -> bool {
        self.lines.remove(&product_id).is_some()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
