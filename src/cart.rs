//! Cart
//!
//! The cart store: an ordered collection of priced lines with a derived
//! total. Construct one cart per customer session and pass it to consumers
//! explicitly; there is no global instance. All mutations are synchronous and
//! atomic within a single call, so the total can never be observed out of
//! step with the items.

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    contacts::{Customer, GiftRecipient},
    intervals::BillingInterval,
    offerings::{Catalog, OfferingKey, OfferingPricing},
    pricing::{ChargeSchedule, PricingError, RecurringCharge, total_price},
};

new_key_type! {
    /// Line Item Key
    ///
    /// Unique per cart line; adding the same offering twice produces two
    /// lines with distinct keys.
    pub struct LineItemKey;
}

/// Errors related to cart mutation.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item's currency differs from the cart currency (item currency, cart currency).
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The referenced offering does not exist in the catalog.
    #[error("offering not found in catalog")]
    UnknownOffering,

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Outcome of a billing-interval update.
///
/// Interval updates never error. Callers that care can distinguish the
/// cases; everyone else can ignore the value and rely on the no-op
/// guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalOutcome {
    /// The interval and displayed price changed.
    Updated,

    /// The line already used the requested interval; nothing changed.
    Unchanged,

    /// The line is a one-time purchase; interval updates do not apply.
    OneTimeCharge,

    /// No line with the given key is in the cart.
    NotFound,
}

/// Input for a cart line whose charge was resolved outside the catalog.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    /// Catalog key of the offering this line was created from.
    pub offering: OfferingKey,

    /// Display name.
    pub name: String,

    /// Display description.
    pub description: String,

    /// Charge schedule.
    pub charge: ChargeSchedule,
}

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    key: LineItemKey,
    offering: OfferingKey,
    name: String,
    description: String,
    charge: ChargeSchedule,
    is_gift: bool,
    customer: Option<Customer>,
    gift_recipient: Option<GiftRecipient>,
}

impl CartItem {
    /// The line's unique key.
    #[must_use]
    pub fn key(&self) -> LineItemKey {
        self.key
    }

    /// The catalog key of the offering behind this line.
    #[must_use]
    pub fn offering(&self) -> OfferingKey {
        self.offering
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The charge schedule for this line.
    #[must_use]
    pub fn charge(&self) -> &ChargeSchedule {
        &self.charge
    }

    /// The displayed price for this line.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the recurring amount cannot be derived.
    pub fn price(&self) -> Result<Money<'static, Currency>, PricingError> {
        self.charge.price()
    }

    /// The currently selected billing interval, if the line is recurring.
    #[must_use]
    pub fn interval(&self) -> Option<BillingInterval> {
        self.charge.interval()
    }

    /// Whether the yearly discount currently applies to this line.
    ///
    /// Derived from the selected interval; there is no separately stored
    /// flag to fall out of sync.
    #[must_use]
    pub fn is_yearly(&self) -> bool {
        self.interval() == Some(BillingInterval::Year)
    }

    /// Whether this line is marked as a gift.
    #[must_use]
    pub fn is_gift(&self) -> bool {
        self.is_gift
    }

    /// Purchaser contact details, if attached.
    #[must_use]
    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Gift delivery details, if attached.
    #[must_use]
    pub fn gift_recipient(&self) -> Option<&GiftRecipient> {
        self.gift_recipient.as_ref()
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart {
    keys: SlotMap<LineItemKey, ()>,
    items: Vec<CartItem>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            keys: SlotMap::with_key(),
            items: Vec::new(),
            currency,
        }
    }

    /// Add an offering from the catalog.
    ///
    /// The charge is resolved from the catalog entry by key; amounts supplied
    /// by callers are never trusted. Recurring offerings default to yearly
    /// billing when no interval is requested; an interval requested for a
    /// one-time offering is ignored.
    ///
    /// # Errors
    ///
    /// - [`CartError::UnknownOffering`]: the key is not in the catalog.
    /// - [`CartError::CurrencyMismatch`]: the offering's currency differs
    ///   from the cart currency.
    /// - [`CartError::Pricing`]: the charge amount is negative.
    pub fn add_offering(
        &mut self,
        catalog: &Catalog,
        offering: OfferingKey,
        interval: Option<BillingInterval>,
    ) -> Result<LineItemKey, CartError> {
        let entry = catalog.get(offering).ok_or(CartError::UnknownOffering)?;

        let charge = match entry.pricing {
            OfferingPricing::OneTime(amount) => ChargeSchedule::OneTime(amount),
            OfferingPricing::Subscription { monthly } => ChargeSchedule::Recurring {
                charge: RecurringCharge::from_monthly(&monthly)?,
                interval: interval.unwrap_or(BillingInterval::Year),
            },
        };

        self.add_item(NewCartItem {
            offering,
            name: entry.name.clone(),
            description: entry.description.clone(),
            charge,
        })
    }

    /// Add a pre-resolved line to the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the charge currency differs from
    ///   the cart currency.
    /// - [`CartError::Pricing`]: the charge amount is negative.
    pub fn add_item(&mut self, item: NewCartItem) -> Result<LineItemKey, CartError> {
        let item_currency = item.charge.currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let ChargeSchedule::OneTime(amount) = item.charge {
            let minor = amount.to_minor_units();

            if minor < 0 {
                return Err(PricingError::NegativeAmount(minor).into());
            }
        }

        let key = self.keys.insert(());

        self.items.push(CartItem {
            key,
            offering: item.offering,
            name: item.name,
            description: item.description,
            charge: item.charge,
            is_gift: false,
            customer: None,
            gift_recipient: None,
        });

        Ok(key)
    }

    /// Remove a line from the cart.
    ///
    /// Removing a key that is not in the cart is a silent no-op, so repeated
    /// removals are safe.
    pub fn remove_item(&mut self, key: LineItemKey) {
        if self.keys.remove(key).is_some() {
            self.items.retain(|item| item.key != key);
        }
    }

    /// Switch the billing interval of a recurring line.
    ///
    /// The displayed price is re-derived from the line's canonical per-month
    /// base, so repeated switches cannot accumulate rounding drift. One-time
    /// lines are left entirely untouched, as is a line already on the
    /// requested interval.
    pub fn set_billing_interval(
        &mut self,
        key: LineItemKey,
        interval: BillingInterval,
    ) -> IntervalOutcome {
        let Some(item) = self.items.iter_mut().find(|item| item.key == key) else {
            return IntervalOutcome::NotFound;
        };

        match &mut item.charge {
            ChargeSchedule::OneTime(_) => IntervalOutcome::OneTimeCharge,
            ChargeSchedule::Recurring {
                interval: current, ..
            } => {
                if *current == interval {
                    IntervalOutcome::Unchanged
                } else {
                    *current = interval;
                    IntervalOutcome::Updated
                }
            }
        }
    }

    /// Mark or unmark a line as a gift.
    ///
    /// Clearing the flag also discards any attached recipient, so a
    /// recipient is only ever present on a gift line. Returns `false` when
    /// the key is not in the cart.
    pub fn set_gift_status(&mut self, key: LineItemKey, is_gift: bool) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.key == key) else {
            return false;
        };

        item.is_gift = is_gift;

        if !is_gift {
            item.gift_recipient = None;
        }

        true
    }

    /// Attach gift delivery details to a line, marking it as a gift.
    ///
    /// Returns `false` when the key is not in the cart.
    pub fn set_gift_recipient(&mut self, key: LineItemKey, recipient: GiftRecipient) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.key == key) else {
            return false;
        };

        item.gift_recipient = Some(recipient);
        item.is_gift = true;

        true
    }

    /// Attach purchaser contact details to a line.
    ///
    /// Returns `false` when the key is not in the cart.
    pub fn set_customer(&mut self, key: LineItemKey, customer: Customer) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.key == key) else {
            return false;
        };

        item.customer = Some(customer);

        true
    }

    /// Empty the cart.
    ///
    /// Invoked once per completed checkout handoff; a cancelled checkout
    /// leaves the cart alone (see [`crate::checkout::settle_checkout`]).
    pub fn clear(&mut self) {
        self.items.clear();
        self.keys.clear();
    }

    /// Calculate the total of the cart.
    ///
    /// Always derived from the current lines, so it cannot be cached out of
    /// step with them. An empty cart totals zero in the cart currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line price cannot be derived or the
    /// amounts cannot be summed.
    pub fn total(&self) -> Result<Money<'static, Currency>, PricingError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        let prices = self
            .items
            .iter()
            .map(CartItem::price)
            .collect::<Result<SmallVec<[Money<'static, Currency>; 8]>, PricingError>>()?;

        total_price(&prices)
    }

    /// Get a line from the cart.
    #[must_use]
    pub fn get_item(&self, key: LineItemKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.key == key)
    }

    /// Iterate over the lines in the cart, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
