use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::pricing::round_money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
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
    pub taste: TasteProfile,
}

/// Lowest and highest score on each taste axis.
pub const TASTE_SCALE: std::ops::RangeInclusive<i32> = 1..=5;

/// Optional tasting notes for beans, each scored on [`TASTE_SCALE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasteProfile {
    pub sweetness: Option<i32>,
    pub aroma: Option<i32>,
    pub body: Option<i32>,
}

impl TasteProfile {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_taste("taste_sweetness", self.sweetness)?;
        check_taste("taste_aroma", self.aroma)?;
        check_taste("taste_body", self.body)
    }
}

impl Product {
    /// Unit price after the product's percentage discount, rounded to cents.
    pub fn discounted_price(&self) -> BigDecimal {
        if self.discount_percentage <= 0 {
            return round_money(&self.price);
        }
        let keep = BigDecimal::from(100 - self.discount_percentage.min(100));
        round_money(&(&self.price * keep / BigDecimal::from(100)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
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
    pub taste: TasteProfile,
}

impl NewProduct {
    /// Trims identity fields and lowercases the category so lookups by SKU
    /// and category see the stored form.
    pub fn normalized(mut self) -> Self {
        self.sku = self.sku.trim().to_string();
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_lowercase();
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut missing = Vec::new();
        if self.sku.trim().is_empty() {
            missing.push("sku");
        }
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.category.trim().is_empty() {
            missing.push("category");
        }
        if !missing.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "{} required",
                missing.join(", ")
            )));
        }
        check_price(&self.price)?;
        check_stock(self.stock)?;
        check_discount(self.discount_percentage)?;
        self.taste.validate()
    }
}

/// Partial update applied by the back-office; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
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
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::InvalidInput("name must not be blank".to_string()));
            }
        }
        if let Some(price) = &self.price {
            check_price(price)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        if let Some(discount) = self.discount_percentage {
            check_discount(discount)?;
        }
        check_taste("taste_sweetness", self.taste_sweetness)?;
        check_taste("taste_aroma", self.taste_aroma)?;
        check_taste("taste_body", self.taste_body)
    }

    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(brand) = &self.brand {
            product.brand = Some(brand.clone());
        }
        if let Some(subcategory) = &self.subcategory {
            product.subcategory = Some(subcategory.clone());
        }
        if let Some(price) = &self.price {
            product.price = price.clone();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(discount) = self.discount_percentage {
            product.discount_percentage = discount;
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(image) = &self.image {
            product.image = Some(image.clone());
        }
        if self.taste_sweetness.is_some() {
            product.taste.sweetness = self.taste_sweetness;
        }
        if self.taste_aroma.is_some() {
            product.taste.aroma = self.taste_aroma;
        }
        if self.taste_body.is_some() {
            product.taste.body = self.taste_body;
        }
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.brand.is_some() {
            fields.push("brand");
        }
        if self.subcategory.is_some() {
            fields.push("subcategory");
        }
        if self.price.is_some() {
            fields.push("price");
        }
        if self.stock.is_some() {
            fields.push("stock");
        }
        if self.discount_percentage.is_some() {
            fields.push("discount_percentage");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.image.is_some() {
            fields.push("image");
        }
        if self.taste_sweetness.is_some() {
            fields.push("taste_sweetness");
        }
        if self.taste_aroma.is_some() {
            fields.push("taste_aroma");
        }
        if self.taste_body.is_some() {
            fields.push("taste_body");
        }
        fields
    }
}

fn check_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price < BigDecimal::from(0) {
        return Err(DomainError::InvalidInput("price must not be negative".to_string()));
    }
    Ok(())
}

fn check_stock(stock: i32) -> Result<(), DomainError> {
    if stock < 0 {
        return Err(DomainError::InvalidInput("stock must not be negative".to_string()));
    }
    Ok(())
}

fn check_discount(discount: i32) -> Result<(), DomainError> {
    if !(0..=100).contains(&discount) {
        return Err(DomainError::InvalidInput(
            "discount_percentage must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

fn check_taste(field: &str, score: Option<i32>) -> Result<(), DomainError> {
    match score {
        Some(score) if !TASTE_SCALE.contains(&score) => Err(DomainError::InvalidInput(format!(
            "{field} must be between {} and {}",
            TASTE_SCALE.start(),
            TASTE_SCALE.end()
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn grinder(price: &str, discount: i32) -> Product {
        Product {
            id: 1,
            sku: "A-GRID-001".to_string(),
            name: "Precision Grinder".to_string(),
            brand: Some("Cruzy Coffee".to_string()),
            category: "accessories".to_string(),
            subcategory: Some("grinders".to_string()),
            price: dec(price),
            stock: 15,
            discount_percentage: discount,
            description: None,
            image: None,
            taste: TasteProfile::default(),
        }
    }

    #[test]
    fn discounted_price_without_discount_is_list_price() {
        assert_eq!(grinder("199.00", 0).discounted_price(), dec("199.00"));
    }

    #[test]
    fn discounted_price_rounds_to_cents() {
        // 39.99 * 0.85 = 33.9915
        assert_eq!(grinder("39.99", 15).discounted_price(), dec("33.99"));
    }

    #[test]
    fn full_discount_is_free() {
        assert_eq!(grinder("29.50", 100).discounted_price(), dec("0.00"));
    }

    #[test]
    fn new_product_requires_identity_fields() {
        let product = NewProduct {
            sku: " ".to_string(),
            name: String::new(),
            brand: None,
            category: "beans".to_string(),
            subcategory: None,
            price: dec("12.00"),
            stock: 1,
            discount_percentage: 0,
            description: None,
            image: None,
            taste: TasteProfile::default(),
        };
        let err = product.validate().expect_err("blank sku and name");
        assert_eq!(err.to_string(), "Invalid input: sku, name required");
    }

    #[test]
    fn update_rejects_out_of_range_discount() {
        let update = ProductUpdate {
            discount_percentage: Some(120),
            ..Default::default()
        };
        assert!(matches!(update.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn update_applies_only_provided_fields() {
        let mut product = grinder("199.00", 0);
        let update = ProductUpdate {
            price: Some(dec("179.00")),
            stock: Some(3),
            ..Default::default()
        };
        update.apply(&mut product);

        assert_eq!(product.price, dec("179.00"));
        assert_eq!(product.stock, 3);
        assert_eq!(product.name, "Precision Grinder");
        assert_eq!(update.changed_fields(), vec!["price", "stock"]);
    }

    #[test]
    fn taste_scores_must_stay_on_the_scale() {
        let profile = TasteProfile {
            sweetness: Some(3),
            aroma: Some(5),
            body: None,
        };
        assert!(profile.validate().is_ok());

        let update = ProductUpdate {
            taste_body: Some(6),
            ..Default::default()
        };
        let err = update.validate().expect_err("body out of range");
        assert_eq!(err.to_string(), "Invalid input: taste_body must be between 1 and 5");

        let mut product = grinder("199.00", 0);
        product.taste.aroma = Some(2);
        ProductUpdate {
            taste_sweetness: Some(4),
            ..Default::default()
        }
        .apply(&mut product);
        assert_eq!(product.taste.sweetness, Some(4));
        assert_eq!(product.taste.aroma, Some(2));
    }

    #[test]
    fn normalized_trims_sku_and_lowercases_category() {
        let product = NewProduct {
            sku: " A-SCALE-004 ".to_string(),
            name: " Brew Scale".to_string(),
            brand: None,
            category: " Accessories ".to_string(),
            subcategory: None,
            price: dec("45.00"),
            stock: 1,
            discount_percentage: 0,
            description: None,
            image: None,
            taste: TasteProfile::default(),
        }
        .normalized();
        assert_eq!(product.sku, "A-SCALE-004");
        assert_eq!(product.name, "Brew Scale");
        assert_eq!(product.category, "accessories");
    }
}
