use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable};

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::schema::products;

use super::models::{NewProductRow, ProductChangeset, ProductRow};

type Predicate = Box<dyn BoxableExpression<products::table, Pg, SqlType = Nullable<Bool>>>;

/// Escapes `%`, `_` and `\` so user text is matched literally by `ILIKE`.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn term_matches(term: &str) -> Predicate {
    let pattern = format!("%{}%", escape_like(term));
    Box::new(
        products::name
            .nullable()
            .ilike(pattern.clone())
            .or(products::description.ilike(pattern.clone()))
            .or(products::brand.ilike(pattern.clone()))
            .or(products::category.nullable().ilike(pattern.clone()))
            .or(products::subcategory.ilike(pattern)),
    )
}

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn find_by_id(&self, id: i32) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .filter(products::sku.eq(sku))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = products::table.select(ProductRow::as_select()).into_boxed();
        if let Some(category) = &filter.category {
            query = query.filter(products::category.eq(category));
        }
        if let Some(subcategory) = &filter.subcategory {
            query = query.filter(products::subcategory.eq(subcategory));
        }

        let rows = query
            .order((products::brand.asc().nulls_first(), products::name.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn search(&self, terms: &[String], category: Option<&str>) -> Result<Vec<Product>, DomainError> {
        let mut terms = terms.iter();
        let Some(first) = terms.next() else {
            return Ok(vec![]);
        };
        let predicate = terms.fold(term_matches(first), |acc, term| -> Predicate {
            Box::new(acc.or(term_matches(term)))
        });

        let mut conn = self.pool.get()?;
        let mut query = products::table
            .select(ProductRow::as_select())
            .into_boxed()
            .filter(predicate);
        if let Some(category) = category {
            query = query.filter(products::category.ilike(escape_like(category)));
        }

        let rows = query.load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn vocabulary(&self) -> Result<Vec<String>, DomainError> {
        let mut conn = self.pool.get()?;

        let names: Vec<String> = products::table
            .select(products::name)
            .distinct()
            .load(&mut conn)?;
        let brands: Vec<Option<String>> = products::table
            .select(products::brand)
            .distinct()
            .load(&mut conn)?;

        let mut words: Vec<String> = names.into_iter().chain(brands.into_iter().flatten()).collect();
        words.sort();
        words.dedup();
        Ok(words)
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow::from(product))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, sku: &str, update: &ProductUpdate) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(products::table.filter(products::sku.eq(sku)))
            .set(&ProductChangeset::from(update))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::{escape_like, DieselProductRepository};
    use crate::domain::errors::DomainError;
    use crate::domain::ports::ProductRepository;
    use crate::domain::product::{NewProduct, ProductFilter, ProductUpdate};
    use crate::infrastructure::test_db::setup_db;

    fn machine(sku: &str, name: &str, brand: &str) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: name.to_string(),
            brand: Some(brand.to_string()),
            category: "machines".to_string(),
            subcategory: Some("semi-auto".to_string()),
            price: BigDecimal::from_str("599.00").expect("valid decimal"),
            stock: 5,
            discount_percentage: 0,
            description: Some(format!("Semi-automatic espresso machine from {brand}")),
            image: None,
            taste: Default::default(),
        }
    }

    #[test]
    fn escape_like_neutralises_wildcards() {
        assert_eq!(escape_like("100%_pure\\"), "100\\%\\_pure\\\\");
        assert_eq!(escape_like("espresso"), "espresso");
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn create_find_and_update_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let created = repo
            .create(machine("M-DEL001", "DeLonghi Dedica EC685M", "DeLonghi"))
            .expect("create failed");
        let by_sku = repo
            .find_by_sku("M-DEL001")
            .expect("find failed")
            .expect("product should exist");
        assert_eq!(by_sku.id, created.id);

        let updated = repo
            .update(
                "M-DEL001",
                &ProductUpdate {
                    stock: Some(9),
                    discount_percentage: Some(10),
                    ..Default::default()
                },
            )
            .expect("update failed")
            .expect("product should exist");
        assert_eq!(updated.stock, 9);
        assert_eq!(updated.discount_percentage, 10);
        assert_eq!(updated.name, "DeLonghi Dedica EC685M");

        assert!(repo
            .update("M-NOPE", &ProductUpdate::default())
            .expect("update failed")
            .is_none());
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn duplicate_sku_is_a_conflict() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        repo.create(machine("M-BRE001", "Breville Barista Express", "Breville"))
            .expect("create failed");
        let err = repo
            .create(machine("M-BRE001", "Breville Barista Pro", "Breville"))
            .expect_err("duplicate sku");
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn search_matches_any_term_case_insensitively() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        repo.create(machine("M-BRE001", "Breville Barista Express", "Breville"))
            .expect("create failed");
        repo.create(machine("M-ROC001", "Rocket Espresso Appartamento", "Rocket Espresso"))
            .expect("create failed");

        let hits = repo
            .search(&["appartamento".to_string(), "nothing".to_string()], None)
            .expect("search failed");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sku, "M-ROC001");

        let hits = repo
            .search(&["espresso".to_string()], Some("Machines"))
            .expect("search failed");
        assert_eq!(hits.len(), 2);

        let none = repo
            .search(&["espresso".to_string()], Some("beans"))
            .expect("search failed");
        assert!(none.is_empty());

        let vocabulary = repo.vocabulary().expect("vocabulary failed");
        assert!(vocabulary.contains(&"Rocket Espresso".to_string()));
        assert!(vocabulary.contains(&"Breville Barista Express".to_string()));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn list_filters_by_category() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        repo.create(machine("M-BRE001", "Breville Barista Express", "Breville"))
            .expect("create failed");
        let mut beans = machine("B-HOUSE-001", "House Blend 1kg", "Cruzy Coffee");
        beans.category = "beans".to_string();
        beans.subcategory = None;
        repo.create(beans).expect("create failed");

        let machines = repo
            .list(&ProductFilter {
                category: Some("machines".to_string()),
                subcategory: None,
            })
            .expect("list failed");
        assert_eq!(machines.len(), 1);
        assert_eq!(repo.list(&ProductFilter::default()).expect("list failed").len(), 2);
    }
}
