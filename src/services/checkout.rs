//! Multi-step checkout: review → shipping → payment → confirmed.
//!
//! Payment capture itself happens in the provider's hosted widget; this only
//! drives the upstream calls around it.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Address, Cart, PaymentConfirmation, PaymentLine, PaymentRequest, PaymentSession};
use crate::services::AccountClient;

const CURRENCY: &str = "GBP";

/// Wizard position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    Review,
    Shipping,
    Payment,
    Confirmed,
}

/// Checkout wizard state.
pub struct Checkout {
    account: Arc<AccountClient>,
    step: CheckoutStep,
    address: Option<Address>,
    payment: Option<PaymentSession>,
    order_id: Option<String>,
}

impl Checkout {
    pub fn new(account: Arc<AccountClient>) -> Self {
        Self {
            account,
            step: CheckoutStep::Review,
            address: None,
            payment: None,
            order_id: None,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn payment(&self) -> Option<&PaymentSession> {
        self.payment.as_ref()
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<()> {
        if self.step != expected {
            return Err(AppError::validation(format!(
                "checkout is at {:?}, expected {:?}",
                self.step, expected
            )));
        }
        Ok(())
    }

    /// Leave the review step and prefill the saved address.
    pub async fn begin(&mut self, cart: &Cart) -> Result<()> {
        self.expect_step(CheckoutStep::Review)?;
        if cart.is_empty() {
            return Err(AppError::cart("your cart is empty"));
        }
        self.address = self.account.address().await?;
        self.step = CheckoutStep::Shipping;
        Ok(())
    }

    /// Replace the shipping address.
    pub fn set_address(&mut self, address: Address) -> Result<()> {
        self.expect_step(CheckoutStep::Shipping)?;
        if !address.is_complete() {
            return Err(AppError::validation("shipping address is incomplete"));
        }
        self.address = Some(address);
        Ok(())
    }

    /// Build the payment request for `cart`.
    pub fn payment_request(&self, cart: &Cart) -> Result<PaymentRequest> {
        let address = self
            .address
            .clone()
            .filter(Address::is_complete)
            .ok_or_else(|| AppError::validation("shipping address is incomplete"))?;
        let user_id = self
            .account
            .session()
            .credentials()
            .map(|c| c.user_id)
            .ok_or_else(|| AppError::unauthorized("not logged in"))?;

        Ok(PaymentRequest {
            user_id,
            items: cart.items().iter().map(PaymentLine::from).collect(),
            amount: cart.subtotal(),
            currency: CURRENCY.to_string(),
            shipping_address: address,
        })
    }

    /// Create the provider payment session.
    pub async fn start_payment(&mut self, cart: &Cart) -> Result<&PaymentSession> {
        self.expect_step(CheckoutStep::Shipping)?;
        if cart.is_empty() {
            return Err(AppError::cart("your cart is empty"));
        }
        let request = self.payment_request(cart)?;
        let session = self.account.create_payment(&request).await?;
        log::info!("payment {} created for {}", session.reference, request.amount);
        self.step = CheckoutStep::Payment;
        Ok(&*self.payment.insert(session))
    }

    /// Confirm with the upstream once the provider reports success.
    ///
    /// The cart is only cleared when the upstream accepts the confirmation.
    pub async fn confirm(&mut self, cart: &mut Cart) -> Result<PaymentConfirmation> {
        self.expect_step(CheckoutStep::Payment)?;
        let reference = self
            .payment
            .as_ref()
            .map(|p| p.reference.clone())
            .ok_or_else(|| AppError::validation("no payment in progress"))?;

        let confirmation = self.account.confirm_payment(&reference).await?;
        if !confirmation.success {
            return Err(AppError::validation(
                confirmation
                    .message
                    .clone()
                    .unwrap_or_else(|| "payment was not confirmed".to_string()),
            ));
        }

        cart.clear();
        self.order_id = confirmation.order_id.clone();
        self.step = CheckoutStep::Confirmed;
        Ok(confirmation)
    }
}
