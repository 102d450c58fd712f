//! Offerings
//!
//! The storefront catalog. Offerings are keyed independently of their display
//! names, and cart lines always resolve prices from here by key; amounts
//! supplied by callers are never trusted.

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Offering Key
    pub struct OfferingKey;
}

/// How an offering in the catalog is priced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfferingPricing {
    /// A single charge with no recurrence.
    OneTime(Money<'static, Currency>),

    /// A subscription quoted at its per-month price.
    Subscription {
        /// Canonical per-month price.
        monthly: Money<'static, Currency>,
    },
}

/// A purchasable offering from the storefront catalog.
#[derive(Debug, Clone)]
pub struct Offering {
    /// Display name.
    pub name: String,

    /// Display description.
    pub description: String,

    /// Canonical pricing.
    pub pricing: OfferingPricing,
}

/// Read-only catalog of offerings.
#[derive(Debug, Default)]
pub struct Catalog {
    offerings: SlotMap<OfferingKey, Offering>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Catalog {
            offerings: SlotMap::with_key(),
        }
    }

    /// Insert an offering and return its stable key.
    pub fn insert(&mut self, offering: Offering) -> OfferingKey {
        self.offerings.insert(offering)
    }

    /// Look up an offering by key.
    #[must_use]
    pub fn get(&self, key: OfferingKey) -> Option<&Offering> {
        self.offerings.get(key)
    }

    /// Iterate over all offerings.
    pub fn iter(&self) -> impl Iterator<Item = (OfferingKey, &Offering)> {
        self.offerings.iter()
    }

    /// Get the number of offerings in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offerings.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offerings.is_empty()
    }
}
