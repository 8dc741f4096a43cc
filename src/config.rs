use std::str::FromStr;

use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::domain::pricing::PricingConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    /// Present whenever `backend` is `Postgres`.
    pub database_url: Option<String>,
    pub pricing: PricingConfig,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080)?;
        let backend = parse_or(&lookup, "STORE_BACKEND", StoreBackend::default())?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let defaults = PricingConfig::default();
        let pricing = PricingConfig {
            free_shipping_threshold: parse_or(
                &lookup,
                "FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold,
            )?,
            base_shipping: parse_or(&lookup, "BASE_SHIPPING", defaults.base_shipping)?,
            min_shipping: parse_or(&lookup, "MIN_SHIPPING", defaults.min_shipping)?,
            shipping_discount_factor: parse_or(
                &lookup,
                "SHIPPING_DISCOUNT_FACTOR",
                defaults.shipping_discount_factor,
            )?,
            tax_rate: parse_or(&lookup, "TAX_RATE", defaults.tax_rate)?,
        };
        check_pricing(&pricing)?;

        Ok(Self {
            host,
            port,
            backend,
            database_url,
            pricing,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn check_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    let zero = BigDecimal::from(0);
    let checks: [(&'static str, &BigDecimal); 5] = [
        ("FREE_SHIPPING_THRESHOLD", &pricing.free_shipping_threshold),
        ("BASE_SHIPPING", &pricing.base_shipping),
        ("MIN_SHIPPING", &pricing.min_shipping),
        ("SHIPPING_DISCOUNT_FACTOR", &pricing.shipping_discount_factor),
        ("TAX_RATE", &pricing.tax_rate),
    ];
    for (name, value) in checks {
        if *value < zero {
            return Err(ConfigError::Invalid {
                name,
                value: value.to_string(),
            });
        }
    }
    if pricing.min_shipping > pricing.base_shipping {
        return Err(ConfigError::Invalid {
            name: "MIN_SHIPPING",
            value: pricing.min_shipping.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/store")]).expect("valid config");
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.backend, StoreBackend::Postgres);
        assert_eq!(cfg.pricing.free_shipping_threshold, BigDecimal::from(80));
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        assert_eq!(
            config(&[]).expect_err("missing url"),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let cfg = config(&[("STORE_BACKEND", "Memory"), ("PORT", "9090")]).expect("valid config");
        assert_eq!(cfg.backend, StoreBackend::Memory);
        assert_eq!(cfg.port, 9090);
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn pricing_overrides_are_parsed() {
        let cfg = config(&[
            ("STORE_BACKEND", "memory"),
            ("FREE_SHIPPING_THRESHOLD", "100"),
            ("TAX_RATE", "0.15"),
        ])
        .expect("valid config");
        assert_eq!(cfg.pricing.free_shipping_threshold, BigDecimal::from(100));
        assert_eq!(cfg.pricing.tax_rate, BigDecimal::from_str("0.15").expect("decimal"));
        assert_eq!(cfg.pricing.base_shipping, BigDecimal::from(15));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config(&[("STORE_BACKEND", "memory"), ("PORT", "eighty")]).expect_err("bad port");
        assert_eq!(err.to_string(), "PORT has invalid value 'eighty'");

        let err = config(&[("STORE_BACKEND", "redis")]).expect_err("bad backend");
        assert!(matches!(err, ConfigError::Invalid { name: "STORE_BACKEND", .. }));

        let err = config(&[("STORE_BACKEND", "memory"), ("TAX_RATE", "-0.1")]).expect_err("negative");
        assert!(matches!(err, ConfigError::Invalid { name: "TAX_RATE", .. }));

        let err = config(&[("STORE_BACKEND", "memory"), ("MIN_SHIPPING", "20")]).expect_err("min > base");
        assert!(matches!(err, ConfigError::Invalid { name: "MIN_SHIPPING", .. }));
    }
}
