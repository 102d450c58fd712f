//! Checkout
//!
//! Boundary to the external payment provider. The cart serializes to a flat
//! list of priced line items; session creation happens entirely outside the
//! cart, which stays untouched until the provider reports a completed
//! handoff. A failed or cancelled session therefore always leaves the cart
//! ready for retry.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cart::{Cart, CartItem},
    intervals::BillingInterval,
    pricing::PricingError,
};

/// Errors raised while preparing or creating a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines to check out.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The payment provider rejected or failed the session request.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Structured failure from the payment provider.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The provider rejected the session request.
    #[error("payment provider rejected the session request: {0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("payment provider unreachable: {0}")]
    Unreachable(String),
}

/// Redirect URLs for the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// URL the provider redirects to after a completed payment.
    pub success_url: String,

    /// URL the provider redirects to when the customer backs out.
    pub cancel_url: String,
}

/// One priced entry submitted to the payment provider, derived from one cart
/// line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Display name.
    pub name: String,

    /// Display description.
    pub description: String,

    /// Amount in minor units.
    pub amount_minor: i64,

    /// ISO alpha currency code.
    pub currency: &'static str,

    /// Recurrence, when the line is a subscription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<BillingInterval>,
}

/// Overall mode for the provider session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// Every line is a one-time charge.
    Payment,

    /// At least one line is a recurring subscription.
    Subscription,
}

/// Request handed to the session creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    /// Session mode.
    pub mode: CheckoutMode,

    /// Priced entries, one per cart line.
    pub line_items: Vec<LineItem>,

    /// Redirect after completed payment.
    pub success_url: String,

    /// Redirect after cancellation.
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Build a request from the cart.
    ///
    /// Reading prices never mutates cart state, so a request that fails
    /// downstream leaves everything retryable.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    /// - [`CheckoutError::Pricing`]: a line price could not be derived.
    pub fn from_cart(cart: &Cart, config: &CheckoutConfig) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let line_items = cart
            .iter()
            .map(line_item)
            .collect::<Result<Vec<_>, PricingError>>()?;

        let mode = if line_items.iter().any(|line| line.interval.is_some()) {
            CheckoutMode::Subscription
        } else {
            CheckoutMode::Payment
        };

        Ok(CheckoutRequest {
            mode,
            line_items,
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }
}

/// Flatten one cart line into a provider line item.
fn line_item(item: &CartItem) -> Result<LineItem, PricingError> {
    let price = item.price()?;

    Ok(LineItem {
        name: item.name().to_string(),
        description: item.description().to_string(),
        amount_minor: price.to_minor_units(),
        currency: price.currency().iso_alpha_code,
        interval: item.interval(),
    })
}

/// A created provider session ready for redirect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    /// Provider session identifier.
    pub session_id: String,

    /// Hosted payment page URL.
    pub url: String,
}

/// External payment collaborator that turns a request into a hosted session.
#[automock]
#[async_trait]
pub trait SessionCreator: Send + Sync {
    /// Create a hosted checkout session for the given request.
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, SessionError>;
}

/// Build the request for the cart and hand it to the session creator.
///
/// The cart is read, never mutated: on any failure the existing contents are
/// preserved so the customer can retry.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`]: the cart has no lines.
/// - [`CheckoutError::Pricing`]: a line price could not be derived.
/// - [`CheckoutError::Session`]: the provider failed the request.
pub async fn begin_checkout(
    cart: &Cart,
    creator: &impl SessionCreator,
    config: &CheckoutConfig,
) -> Result<CheckoutSession, CheckoutError> {
    let request = CheckoutRequest::from_cart(cart, config)?;

    match creator.create_session(request).await {
        Ok(session) => {
            info!(session_id = %session.session_id, "checkout session created");

            Ok(session)
        }
        Err(err) => {
            warn!(error = %err, "checkout session creation failed");

            Err(err.into())
        }
    }
}

/// How the hosted checkout flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The provider confirmed the payment handoff.
    Completed,

    /// The customer backed out of the hosted page.
    Cancelled,
}

/// Apply the end of a checkout flow to the cart.
///
/// The cart is cleared exactly when the flow completed; a cancelled flow
/// preserves the contents for retry.
pub fn settle_checkout(cart: &mut Cart, outcome: CheckoutOutcome) {
    if outcome == CheckoutOutcome::Completed {
        cart.clear();
    }
}
