//! Integration tests for the checkout boundary.
//!
//! The provider is mocked; what matters here is the contract around the cart:
//! session failure must leave the contents retryable, and only a completed
//! flow may empty the cart.

use anyhow::Result;
use rusty_money::{Money, iso::USD};

use cadence::{
    cart::Cart,
    checkout::{
        CheckoutConfig, CheckoutError, CheckoutMode, CheckoutOutcome, CheckoutSession,
        MockSessionCreator, SessionError, begin_checkout, settle_checkout,
    },
    fixtures::Fixture,
    intervals::BillingInterval,
};

fn test_config() -> CheckoutConfig {
    CheckoutConfig {
        success_url: "https://coaching.example.com/checkout/success".to_string(),
        cancel_url: "https://coaching.example.com/cart".to_string(),
    }
}

fn loaded_cart() -> Result<Cart> {
    let fixture = Fixture::from_set("coaching")?;
    let mut cart = Cart::new(fixture.currency()?);

    cart.add_offering(
        fixture.catalog(),
        fixture.offering_key("six-week-shred")?,
        None,
    )?;
    cart.add_offering(
        fixture.catalog(),
        fixture.offering_key("self-led-training")?,
        Some(BillingInterval::Year),
    )?;

    Ok(cart)
}

#[tokio::test]
async fn full_flow_hands_off_and_settles() -> Result<()> {
    let mut cart = loaded_cart()?;

    let mut creator = MockSessionCreator::new();
    creator.expect_create_session().returning(|request| {
        // One subscription line in the cart forces subscription mode.
        assert_eq!(request.mode, CheckoutMode::Subscription);
        assert_eq!(request.line_items.len(), 2);

        Ok(CheckoutSession {
            session_id: "cs_live_42".to_string(),
            url: "https://pay.example.com/cs_live_42".to_string(),
        })
    });

    let session = begin_checkout(&cart, &creator, &test_config()).await?;

    assert_eq!(session.url, "https://pay.example.com/cs_live_42");

    // The handoff itself leaves the cart alone until the provider confirms.
    assert_eq!(cart.len(), 2);

    settle_checkout(&mut cart, CheckoutOutcome::Completed);

    assert!(cart.is_empty());
    assert_eq!(cart.total()?, Money::from_minor(0, USD));

    Ok(())
}

#[tokio::test]
async fn provider_rejection_preserves_the_cart_for_retry() -> Result<()> {
    let cart = loaded_cart()?;
    let total_before = cart.total()?;

    let mut creator = MockSessionCreator::new();
    creator
        .expect_create_session()
        .returning(|_| Err(SessionError::Rejected("invalid api key".to_string())));

    let result = begin_checkout(&cart, &creator, &test_config()).await;

    assert!(matches!(result, Err(CheckoutError::Session(_))));
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total()?, total_before);

    Ok(())
}

#[tokio::test]
async fn cancelled_flow_keeps_the_cart() -> Result<()> {
    let mut cart = loaded_cart()?;

    let mut creator = MockSessionCreator::new();
    creator.expect_create_session().returning(|_| {
        Ok(CheckoutSession {
            session_id: "cs_live_43".to_string(),
            url: "https://pay.example.com/cs_live_43".to_string(),
        })
    });

    begin_checkout(&cart, &creator, &test_config()).await?;

    settle_checkout(&mut cart, CheckoutOutcome::Cancelled);

    assert_eq!(cart.len(), 2);

    Ok(())
}

#[tokio::test]
async fn empty_cart_never_reaches_the_provider() {
    let cart = Cart::new(USD);

    // No expectation is set: a call to the provider would fail the test.
    let creator = MockSessionCreator::new();

    let result = begin_checkout(&cart, &creator, &test_config()).await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
}
