//! Product search: query normalization, synonym expansion, result ranking and
//! "did you mean" suggestions.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::product::Product;

/// Groups of interchangeable catalog terms. Lookups work in both directions.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["espresso", "coffee"],
    &["beans", "coffee", "roast"],
    &["grinder", "mill", "burr"],
    &["tamper", "tamp"],
    &["frother", "steamer", "steam wand"],
    &["pitcher", "jug"],
    &["cup", "mug"],
    &["machine", "maker"],
    &["capsule", "capsules", "pod", "pods"],
    &["scale", "scales"],
    &["decaf", "decaffeinated"],
    &["semi-auto", "semi-automatic"],
    &["fully-auto", "fully-automatic", "bean-to-cup"],
];

/// Frequent misspellings, mapped one way onto the catalog term.
const MISSPELLINGS: &[(&str, &str)] = &[
    ("expresso", "espresso"),
    ("expreso", "espresso"),
    ("espreso", "espresso"),
    ("capuccino", "cappuccino"),
    ("cappucino", "cappuccino"),
    ("grindr", "grinder"),
    ("froter", "frother"),
    ("machiato", "macchiato"),
];

pub const SUGGESTION_LIMIT: usize = 3;
pub const SUGGESTION_THRESHOLD: f64 = 0.5;
const CONTAINMENT_SCORE: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// Lowercased, whitespace collapsed.
    pub normalized: String,
    /// `normalized` with all spaces removed, for compound words.
    pub compact: String,
    pub tokens: Vec<String>,
}

impl NormalizedQuery {
    /// Returns `None` for a blank query.
    pub fn parse(raw: &str) -> Option<Self> {
        let tokens: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
        if tokens.is_empty() {
            return None;
        }
        let normalized = tokens.join(" ");
        let compact = tokens.concat();
        Some(Self {
            normalized,
            compact,
            tokens,
        })
    }

    /// Synonym and spelling expansions of the query and each of its tokens,
    /// excluding the query's own words.
    pub fn expansions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let lookups = std::iter::once(self.normalized.as_str())
            .chain(self.tokens.iter().map(String::as_str));
        for word in lookups {
            for term in synonyms_for(word) {
                if term != self.normalized
                    && !self.tokens.iter().any(|t| t == term)
                    && !out.iter().any(|o| o == term)
                {
                    out.push(term.to_string());
                }
            }
        }
        out
    }

    /// All substrings a product field may contain to count as a match.
    pub fn match_terms(&self) -> Vec<String> {
        let mut terms = vec![self.normalized.clone()];
        if self.compact != self.normalized {
            terms.push(self.compact.clone());
        }
        for term in self.expansions() {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }
}

pub fn synonyms_for(word: &str) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for (typo, fixed) in MISSPELLINGS {
        if *typo == word {
            out.push(*fixed);
            // The corrected term brings its own synonyms along.
            out.extend(group_synonyms(fixed));
        }
    }
    out.extend(group_synonyms(word));
    out.dedup();
    out
}

fn group_synonyms(word: &str) -> Vec<&'static str> {
    SYNONYM_GROUPS
        .iter()
        .filter(|group| group.contains(&word))
        .flat_map(|group| group.iter().copied())
        .filter(|term| *term != word)
        .collect()
}

/// Case-insensitive substring match of any term against the searchable
/// product fields.
pub fn product_matches(product: &Product, terms: &[String]) -> bool {
    let fields = [
        Some(product.name.as_str()),
        product.description.as_deref(),
        product.brand.as_deref(),
        Some(product.category.as_str()),
        product.subcategory.as_deref(),
    ];
    fields.iter().flatten().any(|field| {
        let field = field.to_lowercase();
        terms.iter().any(|term| field.contains(term.as_str()))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    ExactName,
    ExactBrand,
    NamePrefix,
    BrandPrefix,
    Other,
}

pub fn match_rank(product: &Product, query: &NormalizedQuery) -> MatchRank {
    let name = product.name.to_lowercase();
    let brand = product.brand.as_deref().map(str::to_lowercase);
    let q = query.normalized.as_str();

    if name == q {
        MatchRank::ExactName
    } else if brand.as_deref() == Some(q) {
        MatchRank::ExactBrand
    } else if name.starts_with(q) {
        MatchRank::NamePrefix
    } else if brand.as_deref().is_some_and(|b| b.starts_with(q)) {
        MatchRank::BrandPrefix
    } else {
        MatchRank::Other
    }
}

pub fn rank_products(mut products: Vec<Product>, query: &NormalizedQuery) -> Vec<Product> {
    products.sort_by_cached_key(|p| (match_rank(p, query), p.name.to_lowercase()));
    products
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Edit similarity in `0.0..=1.0`; 1.0 means identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Splits catalog text into suggestion candidates longer than two characters.
fn vocabulary_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|t| t.trim_matches('-'))
        .filter(|t| t.chars().count() > 2)
}

/// Up to [`SUGGESTION_LIMIT`] "did you mean" terms drawn from `vocabulary`
/// (product names and brands) and the query's synonym expansions.
pub fn suggest<'a, I>(query: &NormalizedQuery, vocabulary: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidates = vocabulary
        .into_iter()
        .flat_map(vocabulary_tokens)
        .map(str::to_string)
        .chain(
            query
                .expansions()
                .into_iter()
                .filter(|t| t.chars().count() > 2),
        );

    // lowercase key -> (display form, best score)
    let mut scored: HashMap<String, (String, f64)> = HashMap::new();
    for candidate in candidates {
        let key = candidate.to_lowercase();
        if key == query.normalized || query.tokens.contains(&key) {
            continue;
        }
        let score = candidate_score(&key, query);
        if score <= SUGGESTION_THRESHOLD {
            continue;
        }
        scored
            .entry(key)
            .and_modify(|(_, best)| *best = best.max(score))
            .or_insert((candidate, score));
    }

    let mut ranked: Vec<(String, f64)> = scored.into_values().collect();
    ranked.sort_by(|(a, sa), (b, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
    });
    ranked
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .map(|(term, _)| term)
        .collect()
}

fn candidate_score(candidate: &str, query: &NormalizedQuery) -> f64 {
    let mut score = std::iter::once(query.normalized.as_str())
        .chain(query.tokens.iter().map(String::as_str))
        .map(|q| similarity(candidate, q))
        .fold(0.0, f64::max);

    if candidate.chars().count() > 3
        && (candidate.contains(query.normalized.as_str())
            || query.normalized.contains(candidate))
    {
        score = score.max(CONTAINMENT_SCORE);
    }
    score
}
