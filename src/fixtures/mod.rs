//! Fixtures
//!
//! YAML-defined offering catalogs for tests, demos and scenario setups.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::offerings::{Catalog, OfferingKey};

pub mod offerings;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Offering not found
    #[error("Offering not found: {0}")]
    OfferingNotFound(String),

    /// Currency mismatch between offerings
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No offerings loaded yet
    #[error("No offerings loaded yet; currency unknown")]
    NoCurrency,
}

/// A loaded fixture set: the catalog plus string-key lookups for offerings.
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// The catalog built from the loaded offerings
    catalog: Catalog,

    /// String key -> catalog key mappings for lookups
    offering_keys: FxHashMap<String, OfferingKey>,

    /// Currency shared by the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            offering_keys: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load offerings from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are
    /// currency mismatches.
    pub fn load_offerings(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("offerings").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: offerings::OfferingsFixture = serde_norway::from_str(&contents)?;

        for (key, offering_fixture) in fixture.offerings {
            // Parse to get currency first (before creating the Offering)
            let (_minor_units, currency) = offerings::parse_price(&offering_fixture.price)?;

            // Validate currency consistency
            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let offering = offering_fixture.try_into()?;
            let offering_key = self.catalog.insert(offering);

            self.offering_keys.insert(key, offering_key);
        }

        Ok(self)
    }

    /// Load a complete fixture set
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_offerings(name)?;

        Ok(fixture)
    }

    /// The catalog built from the loaded offerings.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get an offering's catalog key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the offering is not found.
    pub fn offering_key(&self, key: &str) -> Result<OfferingKey, FixtureError> {
        self.offering_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::OfferingNotFound(key.to_string()))
    }

    /// Currency shared by the loaded offerings
    ///
    /// # Errors
    ///
    /// Returns an error if no offerings have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::offerings::OfferingPricing;

    use super::*;

    #[test]
    fn from_set_loads_the_coaching_catalog() -> TestResult {
        let fixture = Fixture::from_set("coaching")?;

        assert_eq!(fixture.currency()?, USD);
        assert!(fixture.catalog().len() >= 4);

        Ok(())
    }

    #[test]
    fn offering_keys_resolve_into_the_catalog() -> TestResult {
        let fixture = Fixture::from_set("coaching")?;

        let key = fixture.offering_key("self-led-training")?;

        let offering = fixture
            .catalog()
            .get(key)
            .ok_or("offering should be in the catalog")?;

        assert_eq!(offering.name, "Self-Led Training");
        assert!(matches!(
            offering.pricing,
            OfferingPricing::Subscription { .. }
        ));

        Ok(())
    }

    #[test]
    fn one_time_offerings_load_without_recurrence() -> TestResult {
        let fixture = Fixture::from_set("coaching")?;

        let key = fixture.offering_key("six-week-shred")?;

        let offering = fixture
            .catalog()
            .get(key)
            .ok_or("offering should be in the catalog")?;

        assert!(matches!(offering.pricing, OfferingPricing::OneTime(_)));

        Ok(())
    }

    #[test]
    fn unknown_offering_key_errors() -> TestResult {
        let fixture = Fixture::from_set("coaching")?;

        let result = fixture.offering_key("powerlifting-total");

        assert!(
            matches!(result, Err(FixtureError::OfferingNotFound(key)) if key == "powerlifting-total")
        );

        Ok(())
    }

    #[test]
    fn missing_fixture_set_errors_with_io() {
        let result = Fixture::from_set("does-not-exist");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn currency_is_unknown_before_loading() {
        let fixture = Fixture::new();

        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
    }
}
