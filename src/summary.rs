//! Order Summary
//!
//! Renders the cart as a terminal table for review before the checkout
//! handoff. Pure presentation over cart state; nothing here mutates.

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::{Columns, Rows}},
};
use thiserror::Error;

use crate::{cart::Cart, intervals::BillingInterval, pricing::PricingError};

/// Errors that can occur while rendering an order summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    Io,
}

/// Billing column label for a cart line.
fn billing_label(interval: Option<BillingInterval>) -> &'static str {
    match interval {
        None => "one-time",
        Some(BillingInterval::Month) => "per month",
        Some(BillingInterval::Year) => "per year",
    }
}

/// Write the cart contents and total as a table.
///
/// # Errors
///
/// Returns a [`SummaryError`] if a line price cannot be derived or the table
/// cannot be written.
pub fn write_to(mut out: impl io::Write, cart: &Cart) -> Result<(), SummaryError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Billing", "Gift", "Price"]);

    for item in cart.iter() {
        let price = item.price()?;

        builder.push_record([
            item.name().to_string(),
            billing_label(item.interval()).to_string(),
            if item.is_gift() {
                "gift".to_string()
            } else {
                String::new()
            },
            format!("{price}"),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Alignment::center());
    table.modify(Columns::last(), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| SummaryError::Io)?;
    writeln!(out, " Total: {}", cart.total()?).map_err(|_err| SummaryError::Io)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        cart::NewCartItem,
        offerings::OfferingKey,
        pricing::{ChargeSchedule, RecurringCharge},
    };

    use super::*;

    fn test_cart() -> Result<Cart, Box<dyn std::error::Error>> {
        let mut cart = Cart::new(USD);

        cart.add_item(NewCartItem {
            offering: OfferingKey::default(),
            name: "Self-Led Training".to_string(),
            description: "Monthly programming.".to_string(),
            charge: ChargeSchedule::Recurring {
                charge: RecurringCharge::from_monthly(&Money::from_minor(1999, USD))?,
                interval: BillingInterval::Year,
            },
        })?;

        cart.add_item(NewCartItem {
            offering: OfferingKey::default(),
            name: "Six-Week Shred Challenge".to_string(),
            description: "Dated six-week challenge.".to_string(),
            charge: ChargeSchedule::OneTime(Money::from_minor(9900, USD)),
        })?;

        Ok(cart)
    }

    #[test]
    fn renders_line_names_billing_labels_and_total() -> TestResult {
        let cart = test_cart()?;

        let mut out = Vec::new();
        write_to(&mut out, &cart)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Self-Led Training"));
        assert!(output.contains("per year"));
        assert!(output.contains("Six-Week Shred Challenge"));
        assert!(output.contains("one-time"));
        assert!(output.contains("Total:"));
        assert!(output.contains("290.90"));

        Ok(())
    }

    #[test]
    fn marks_gift_lines() -> TestResult {
        let mut cart = Cart::new(USD);

        let key = cart.add_item(NewCartItem {
            offering: OfferingKey::default(),
            name: "Nutrition Coaching".to_string(),
            description: "Macro targets and meal guidance.".to_string(),
            charge: ChargeSchedule::Recurring {
                charge: RecurringCharge::from_monthly(&Money::from_minor(5900, USD))?,
                interval: BillingInterval::Month,
            },
        })?;

        cart.set_gift_status(key, true);

        let mut out = Vec::new();
        write_to(&mut out, &cart)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("gift"));
        assert!(output.contains("per month"));

        Ok(())
    }

    #[test]
    fn renders_an_empty_cart_with_zero_total() -> TestResult {
        let cart = Cart::new(USD);

        let mut out = Vec::new();
        write_to(&mut out, &cart)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Total:"));
        assert!(output.contains("0.00"));

        Ok(())
    }
}
