//! Offering Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    offerings::{Offering, OfferingPricing},
};

/// Wrapper for offerings in YAML
#[derive(Debug, Deserialize)]
pub struct OfferingsFixture {
    /// Map of offering key -> offering fixture
    pub offerings: FxHashMap<String, OfferingFixture>,
}

/// How a fixture offering is billed
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingFixture {
    /// A single charge with no recurrence
    OneTime,

    /// A subscription quoted at its per-month price
    Monthly,
}

/// Offering Fixture
#[derive(Debug, Deserialize)]
pub struct OfferingFixture {
    /// Offering name
    pub name: String,

    /// Offering description
    pub description: String,

    /// Offering price (e.g., "19.99 USD"); per-month for subscriptions
    pub price: String,

    /// How the offering is billed
    pub billing: BillingFixture,
}

impl TryFrom<OfferingFixture> for Offering {
    type Error = FixtureError;

    fn try_from(fixture: OfferingFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;
        let amount = Money::from_minor(minor_units, currency);

        let pricing = match fixture.billing {
            BillingFixture::OneTime => OfferingPricing::OneTime(amount),
            BillingFixture::Monthly => OfferingPricing::Subscription { monthly: amount },
        };

        Ok(Offering {
            name: fixture.name,
            description: fixture.description,
            pricing,
        })
    }
}

/// Parse price string (e.g., "19.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
