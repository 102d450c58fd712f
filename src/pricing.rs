//! Pricing
//!
//! Canonical-base-price arithmetic for cart charges. A recurring charge keeps
//! an immutable per-month base amount; the displayed amount for either billing
//! interval is a pure function of that base, so switching intervals back and
//! forth never accumulates rounding drift.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::intervals::BillingInterval;

/// Months in a billing year.
const MONTHS_PER_YEAR: i64 = 12;

/// Fixed discount applied when a subscription is billed annually.
#[must_use]
pub fn yearly_discount() -> Percentage {
    Percentage::from(Decimal::new(2, 1))
}

/// Ratio between the annual total and the per-month base amount.
///
/// Twelve months with the yearly discount taken off.
fn annual_multiplier() -> Decimal {
    Decimal::from(MONTHS_PER_YEAR) * (Decimal::ONE - yearly_discount() * Decimal::ONE)
}

/// Errors that can occur while deriving or summing prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A charge amount was negative (minor units).
    #[error("charge amounts must not be negative, got {0} minor units")]
    NegativeAmount(i64),

    /// A derived amount overflowed or could not be represented in minor units.
    #[error("amount conversion overflowed or was not representable")]
    Conversion,

    /// No prices were provided, so currency could not be determined.
    #[error("no prices provided; cannot determine currency")]
    NoItems,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A recurring subscription charge with an immutable per-month base amount.
///
/// The base is held at full decimal precision in minor units and is never
/// overwritten after construction. Interval switches re-derive the displayed
/// amount from the base, so a month-year-month round trip reproduces the
/// original monthly price to the cent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecurringCharge {
    /// Canonical per-month amount in minor units. Never mutated.
    base_monthly_minor: Decimal,
    currency: &'static Currency,
}

impl RecurringCharge {
    /// Create a recurring charge from its per-month price.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError::NegativeAmount`] if the price is negative.
    pub fn from_monthly(monthly: &Money<'static, Currency>) -> Result<Self, PricingError> {
        let minor = monthly.to_minor_units();

        if minor < 0 {
            return Err(PricingError::NegativeAmount(minor));
        }

        Ok(Self {
            base_monthly_minor: Decimal::from_i64(minor).ok_or(PricingError::Conversion)?,
            currency: monthly.currency(),
        })
    }

    /// Create a recurring charge from a pre-discounted annual total.
    ///
    /// The per-month base is derived by the exact inverse of the annual
    /// conversion and kept at full precision, so displaying the annual amount
    /// again reproduces the supplied total.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError::NegativeAmount`] if the total is negative, or
    /// a [`PricingError::Conversion`] if the base cannot be derived.
    pub fn from_yearly_total(yearly: &Money<'static, Currency>) -> Result<Self, PricingError> {
        let minor = yearly.to_minor_units();

        if minor < 0 {
            return Err(PricingError::NegativeAmount(minor));
        }

        let total = Decimal::from_i64(minor).ok_or(PricingError::Conversion)?;

        let base = total
            .checked_div(annual_multiplier())
            .ok_or(PricingError::Conversion)?;

        Ok(Self {
            base_monthly_minor: base,
            currency: yearly.currency(),
        })
    }

    /// The displayed amount for the given billing interval.
    ///
    /// Monthly billing shows the base amount; yearly billing shows twelve
    /// months with the yearly discount taken off, rounded half-up to a whole
    /// minor unit.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError::Conversion`] if the derived amount cannot be
    /// represented in minor units.
    pub fn amount_for(
        &self,
        interval: BillingInterval,
    ) -> Result<Money<'static, Currency>, PricingError> {
        let amount = match interval {
            BillingInterval::Month => self.base_monthly_minor,
            BillingInterval::Year => self
                .base_monthly_minor
                .checked_mul(annual_multiplier())
                .ok_or(PricingError::Conversion)?,
        };

        let minor = amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(PricingError::Conversion)?;

        Ok(Money::from_minor(minor, self.currency))
    }

    /// The currency of the charge.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// How a cart line is charged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargeSchedule {
    /// A single, non-recurring charge.
    OneTime(Money<'static, Currency>),

    /// A recurring subscription billed at the selected interval.
    Recurring {
        /// The immutable canonical charge.
        charge: RecurringCharge,

        /// Currently selected billing interval.
        interval: BillingInterval,
    },
}

impl ChargeSchedule {
    /// The displayed price for this schedule.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the recurring amount cannot be derived.
    pub fn price(&self) -> Result<Money<'static, Currency>, PricingError> {
        match self {
            ChargeSchedule::OneTime(amount) => Ok(*amount),
            ChargeSchedule::Recurring { charge, interval } => charge.amount_for(*interval),
        }
    }

    /// Currently selected billing interval, if any.
    #[must_use]
    pub fn interval(&self) -> Option<BillingInterval> {
        match self {
            ChargeSchedule::OneTime(_) => None,
            ChargeSchedule::Recurring { interval, .. } => Some(*interval),
        }
    }

    /// The currency of the charge.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        match self {
            ChargeSchedule::OneTime(amount) => amount.currency(),
            ChargeSchedule::Recurring { charge, .. } => charge.currency(),
        }
    }
}

/// Calculates the total of a list of prices.
///
/// # Errors
///
/// - [`PricingError::NoItems`]: No prices were provided, so currency could not
///   be determined.
/// - [`PricingError::Money`]: Wrapped money arithmetic or currency mismatch
///   error.
pub fn total_price(
    prices: &[Money<'static, Currency>],
) -> Result<Money<'static, Currency>, PricingError> {
    let first = prices.first().ok_or(PricingError::NoItems)?;

    let total = prices.iter().try_fold(
        Money::from_minor(0, first.currency()),
        |acc, price| acc.add(*price),
    )?;

    Ok(total)
}
