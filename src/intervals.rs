//! Billing Intervals

use std::fmt;

use serde::{Deserialize, Serialize};

/// The recurrence period of a subscription charge.
///
/// One-time purchases carry no interval at all; their absence is modelled by
/// the charge schedule, never by an extra variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    /// Billed every month at the canonical per-month amount.
    Month,

    /// Billed once a year at the discounted annual total.
    Year,
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingInterval::Month => write!(f, "month"),
            BillingInterval::Year => write!(f, "year"),
        }
    }
}
