//! Contacts
//!
//! Contact and delivery metadata attached to cart lines.

use serde::{Deserialize, Serialize};

/// Contact details for the purchasing customer, collected for offerings that
/// need scheduling information (dated challenge programs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name.
    pub name: String,

    /// Email address.
    pub email: String,
}

/// Delivery details for a gifted subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftRecipient {
    /// Recipient full name.
    pub name: String,

    /// Recipient email address.
    pub email: String,

    /// Personal message included with the gift.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn gift_recipient_message_is_optional_in_yaml() -> TestResult {
        let recipient: GiftRecipient =
            serde_norway::from_str("name: Jamie Ortiz\nemail: jamie@example.com\n")?;

        assert_eq!(recipient.name, "Jamie Ortiz");
        assert_eq!(recipient.message, None);

        Ok(())
    }

    #[test]
    fn customer_round_trips_through_yaml() -> TestResult {
        let customer = Customer {
            name: "Sam Reyes".to_string(),
            email: "sam@example.com".to_string(),
        };

        let serialized = serde_norway::to_string(&customer)?;
        let parsed: Customer = serde_norway::from_str(&serialized)?;

        assert_eq!(parsed, customer);

        Ok(())
    }
}
