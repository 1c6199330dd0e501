//! Bulk purchase for schools and institutions.
//!
//! The buyer verifies a contact with a one-time code, picks a discount tier
//! and places an order. Code requests are rate limited, and verification
//! and purchase both go through the submit guard.

use crate::config::GuardConfig;
use crate::domain::auth::CustomerSession;
use crate::domain::catalog::{BulkTier, CodeDispatch, Order};
use crate::domain::money::Amount;
use crate::domain::ports::{DynOrderRepository, DynPricingProvider, DynVerificationService};
use crate::domain::sanitize;
use crate::domain::validation;
use crate::error::{GateError, Result};
use crate::guard::{RateLimiter, SubmitGuard};
use std::sync::Arc;

pub const INVALID_CONTACT: &str = "Please enter a valid email address or phone number";
pub const INVALID_CODE: &str = "Invalid verification code";
pub const NO_CODE_REQUESTED: &str = "Request a verification code first";
pub const NO_TIER_SELECTED: &str = "Please select a package";

/// A contact is accepted when it parses as an email or a Ghana phone number.
fn normalize_contact(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.contains('@') {
        let email = sanitize::sanitize_email(trimmed);
        return (!email.is_empty()).then_some(email);
    }
    let phone = sanitize::compact_phone(trimmed);
    (!phone.is_empty() && validation::phone(&phone).is_none()).then_some(phone)
}

pub struct BulkCheckout {
    pricing: DynPricingProvider,
    verification: DynVerificationService,
    orders: DynOrderRepository,
    limiter: RateLimiter,
    guard: SubmitGuard,
    tiers: Vec<BulkTier>,
    selected: Option<BulkTier>,
    contact: Option<String>,
    session: Option<CustomerSession>,
}

impl BulkCheckout {
    /// Creates a new `BulkCheckout` instance.
    ///
    /// # Arguments
    ///
    /// * `pricing` - Source of the bulk discount tiers.
    /// * `verification` - Service that sends and checks one-time codes.
    /// * `orders` - Repository the bulk order is placed with.
    /// * `guards` - Rate limit and submit interval settings.
    pub fn new(
        pricing: DynPricingProvider,
        verification: DynVerificationService,
        orders: DynOrderRepository,
        guards: &GuardConfig,
    ) -> Self {
        Self {
            pricing,
            verification,
            orders,
            limiter: RateLimiter::new(guards.rate_limit_max_attempts, guards.rate_limit_window()),
            guard: SubmitGuard::new(guards.submit_interval()),
            tiers: Vec::new(),
            selected: None,
            contact: None,
            session: None,
        }
    }

    /// Fetches the discount tiers and keeps them for [`BulkCheckout::select_tier`].
    pub async fn load_tiers(&mut self) -> Result<&[BulkTier]> {
        self.tiers = self.pricing.bulk_pricing().await?;
        Ok(&self.tiers)
    }

    pub fn session(&self) -> Option<&CustomerSession> {
        self.session.as_ref()
    }

    pub fn is_verified(&self) -> bool {
        self.session.is_some()
    }

    /// Sends a verification code to `contact`, subject to the attempt limit.
    pub async fn request_code(&mut self, contact: &str) -> Result<CodeDispatch> {
        let contact = normalize_contact(contact)
            .ok_or_else(|| GateError::ValidationError(INVALID_CONTACT.to_string()))?;
        self.limiter.check_limit().into_result()?;
        self.limiter.record_attempt();

        let dispatch = self.verification.send_code(&contact).await?;
        tracing::debug!(contact = %contact, "verification requested");
        self.contact = Some(contact);
        self.session = None;
        Ok(dispatch)
    }

    /// Verifies the code sent by [`BulkCheckout::request_code`].
    ///
    /// `Ok(None)` means the submit guard dropped a duplicate submission.
    pub async fn verify(&mut self, code: &str) -> Result<Option<CustomerSession>> {
        let code = code.trim();
        if let Some(message) = validation::required(code).or_else(|| validation::otp(code)) {
            return Err(GateError::ValidationError(message.to_string()));
        }
        let contact = self
            .contact
            .clone()
            .ok_or_else(|| GateError::ValidationError(NO_CODE_REQUESTED.to_string()))?;

        let verification = Arc::clone(&self.verification);
        let code = code.to_string();
        let contact_for_call = contact.clone();
        let Some(outcome) = self
            .guard
            .run(|| async move { verification.verify_code(&contact_for_call, &code).await })
            .await
        else {
            return Ok(None);
        };

        let outcome = outcome?;
        match outcome.token.filter(|_| outcome.success) {
            Some(token) => {
                let session = CustomerSession::new(contact, token);
                tracing::info!(contact = session.contact(), "bulk buyer verified");
                Ok(Some(self.session.insert(session).clone()))
            }
            None => {
                tracing::warn!(contact = %contact, "verification code rejected");
                Err(GateError::ValidationError(INVALID_CODE.to_string()))
            }
        }
    }

    /// Selects the loaded tier for a package size.
    ///
    /// # Arguments
    ///
    /// * `quantity` - Number of checkers in the package, for example `50`.
    pub fn select_tier(&mut self, quantity: u32) -> Result<&BulkTier> {
        let tier = self
            .tiers
            .iter()
            .find(|t| t.quantity == quantity)
            .cloned()
            .ok_or_else(|| GateError::NotFound(format!("package of {quantity} checkers")))?;
        Ok(self.selected.insert(tier))
    }

    pub fn selected(&self) -> Option<&BulkTier> {
        self.selected.as_ref()
    }

    /// `quantity × price_per_unit` of the selected tier.
    pub fn total(&self) -> Option<Amount> {
        self.selected.as_ref().map(BulkTier::total)
    }

    /// Places the order for the selected tier.
    ///
    /// `Ok(None)` means the submit guard dropped a duplicate submission.
    pub async fn purchase(&mut self) -> Result<Option<Order>> {
        let session = self.session.clone().ok_or(GateError::Unauthorized)?;
        let tier = self
            .selected
            .clone()
            .ok_or_else(|| GateError::ValidationError(NO_TIER_SELECTED.to_string()))?;

        let orders = Arc::clone(&self.orders);
        let Some(order) = self
            .guard
            .run(|| async move { orders.place_bulk_order(&session, &tier).await })
            .await
        else {
            return Ok(None);
        };
        order.map(Some)
    }
}
