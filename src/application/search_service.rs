use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::Product;
use crate::domain::search::{rank_products, suggest, NormalizedQuery};

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub products: Vec<Product>,
    pub suggestions: Vec<String>,
}

#[derive(Clone)]
pub struct SearchService {
    products: Arc<dyn ProductRepository>,
}

impl SearchService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub fn search(&self, raw_query: &str, category: Option<&str>) -> Result<SearchResults, DomainError> {
        let Some(query) = NormalizedQuery::parse(raw_query) else {
            return Ok(SearchResults::default());
        };
        let category = category.map(str::trim).filter(|c| !c.is_empty());

        let matches = self.products.search(&query.match_terms(), category)?;
        let products = rank_products(matches, &query);

        let vocabulary = self.products.vocabulary()?;
        let suggestions = suggest(&query, vocabulary.iter().map(String::as_str));

        log::debug!(
            "search '{}' -> {} product(s), {} suggestion(s)",
            query.normalized,
            products.len(),
            suggestions.len()
        );
        Ok(SearchResults {
            products,
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{sample_product, MemoryStore};

    fn service() -> SearchService {
        let store = MemoryStore::new();
        let mut machine = sample_product(1, "M-BRE001", "Breville Barista Express", "879.00", 5);
        machine.brand = Some("Breville".to_string());
        machine.description = Some("Semi-automatic espresso machine from Breville".to_string());
        store.insert_product(machine);

        let mut espresso = sample_product(2, "M-GEN001", "Espresso Machine", "299.00", 3);
        espresso.brand = Some("Cruzy Coffee".to_string());
        store.insert_product(espresso);

        let mut grinder = sample_product(3, "A-GRID-001", "Precision Grinder", "199.00", 15);
        grinder.category = "accessories".to_string();
        grinder.brand = Some("Cruzy Coffee".to_string());
        store.insert_product(grinder);

        let mut beans = sample_product(4, "B-ESP-003", "Dark Roast Espresso 250g", "11.00", 40);
        beans.category = "beans".to_string();
        store.insert_product(beans);

        SearchService::new(Arc::new(store))
    }

    fn names(results: &SearchResults) -> Vec<&str> {
        results.products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_nothing() {
        let results = service().search("   ", None).expect("search");
        assert!(results.products.is_empty());
        assert!(results.suggestions.is_empty());
    }

    #[test]
    fn exact_name_ranks_first() {
        let results = service().search("Espresso Machine", None).expect("search");
        assert_eq!(names(&results)[0], "Espresso Machine");
    }

    #[test]
    fn synonyms_widen_matches() {
        let results = service().search("mill", None).expect("search");
        assert_eq!(names(&results), vec!["Precision Grinder"]);
    }

    #[test]
    fn category_filter_restricts_results() {
        let results = service().search("espresso", Some("beans")).expect("search");
        assert_eq!(names(&results), vec!["Dark Roast Espresso 250g"]);
    }

    #[test]
    fn typo_yields_suggestion_and_synonym_matches() {
        let results = service().search("expresso", None).expect("search");
        assert!(results
            .suggestions
            .iter()
            .any(|s| s.eq_ignore_ascii_case("espresso")));
        assert!(names(&results).contains(&"Espresso Machine"));
    }

    #[test]
    fn suggestions_never_echo_the_query() {
        let results = service().search("BREVILLE", None).expect("search");
        assert!(results
            .suggestions
            .iter()
            .all(|s| !s.eq_ignore_ascii_case("breville") && s.chars().count() > 2));
    }
}
