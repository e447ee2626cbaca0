use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;

use super::blocking::run_blocking;
use super::identity::guest_profile;
use crate::domain::checkout::{price_cart, CheckoutDraft, CheckoutRequest};
use crate::domain::discount::{normalize_code, AppliedDiscount, DiscountCode};
use crate::domain::errors::DomainError;
use crate::domain::identity::{Purchaser, Requester};
use crate::domain::money::{default_tax_rate, is_valid_rate, Totals};
use crate::domain::order::CheckoutReceipt;
use crate::domain::ports::{RateOracle, Store};

#[derive(Debug, Clone)]
pub struct TaxPolicy {
    pub default_rate: BigDecimal,
    pub timeout: Duration,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            default_rate: default_tax_rate(),
            timeout: Duration::from_secs(2),
        }
    }
}

pub struct CheckoutService<S: ?Sized> {
    store: Arc<S>,
    oracle: Arc<dyn RateOracle>,
    tax: TaxPolicy,
}

impl<S: Store + ?Sized> CheckoutService<S> {
    pub fn new(store: Arc<S>, oracle: Arc<dyn RateOracle>, tax: TaxPolicy) -> Self {
        Self { store, oracle, tax }
    }

    /// Never fails: oracle errors, timeouts and out-of-range answers all
    /// fall back to the default rate.
    pub async fn tax_rate(&self, zip: &str) -> BigDecimal {
        match tokio::time::timeout(self.tax.timeout, self.oracle.rate_for(zip)).await {
            Ok(Ok(rate)) if is_valid_rate(&rate) => rate,
            Ok(Ok(rate)) => {
                log::warn!("Rate oracle returned out-of-range rate {rate} for zip {zip}, using default");
                self.tax.default_rate.clone()
            }
            Ok(Err(e)) => {
                log::warn!("Rate oracle failed for zip {zip}: {e}, using default");
                self.tax.default_rate.clone()
            }
            Err(_) => {
                log::warn!(
                    "Rate oracle timed out after {:?} for zip {zip}, using default",
                    self.tax.timeout
                );
                self.tax.default_rate.clone()
            }
        }
    }

    /// Read-only check of a discount code.
    pub async fn validate_discount(&self, code: &str) -> Result<DiscountCode, DomainError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(DomainError::InvalidInput("discount code is required".into()));
        }
        let store = Arc::clone(&self.store);
        let lookup = code.clone();
        let discount = run_blocking(move || store.find_discount(&lookup))
            .await?
            .ok_or(DomainError::DiscountNotFound(code))?;
        discount.redeemable_percent()?;
        Ok(discount)
    }

    pub async fn place_order(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, DomainError> {
        request.validate()?;

        // Validation pass. Nothing is written and no transaction is open.
        let store = Arc::clone(&self.store);
        let lines = request.lines.clone();
        let discount_code = request
            .discount_code
            .as_deref()
            .map(normalize_code)
            .filter(|c| !c.is_empty());
        let (priced, subtotal, discount) = run_blocking(move || {
            let mut ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
            ids.sort_unstable();
            ids.dedup();
            let products = store.load_products(&ids)?;
            let (priced, subtotal) = price_cart(&products, &lines)?;

            let discount = match discount_code {
                Some(code) => {
                    let found = store
                        .find_discount(&code)?
                        .ok_or_else(|| DomainError::DiscountNotFound(code.clone()))?;
                    let percent_off = found.redeemable_percent()?;
                    Some(AppliedDiscount { code, percent_off })
                }
                None => None,
            };
            Ok((priced, subtotal, discount))
        })
        .await?;

        let rate = self.tax_rate(&request.billing.zip).await;
        let totals = Totals::compute(&subtotal, discount.as_ref().map(|d| d.percent_off), &rate);
        totals.ensure_storable()?;
        let purchaser = self.resolve_purchaser(&request).await?;

        let draft = CheckoutDraft {
            purchaser,
            lines: priced,
            discount,
            totals,
            payment_method: request.payment_method.trim().to_string(),
            billing: request.billing,
            client: request.client,
        };

        let store = Arc::clone(&self.store);
        let receipt = run_blocking(move || store.commit_checkout(draft))
            .await
            .inspect_err(|e| match e {
                DomainError::Internal(msg) => log::error!("Checkout commit failed: {msg}"),
                other => log::info!("Checkout rejected during commit: {other}"),
            })?;

        log::info!(
            "Order {} committed for user {} (total {}, guest: {})",
            receipt.order.order_number,
            receipt.order.user_id,
            receipt.totals.total,
            receipt.guest
        );
        Ok(receipt)
    }

    /// A signed-in, active account buys as itself; anyone else gets a guest
    /// shell account keyed by billing e-mail.
    async fn resolve_purchaser(&self, request: &CheckoutRequest) -> Result<Purchaser, DomainError> {
        if let Requester::Authenticated { user_id } = request.requester {
            let store = Arc::clone(&self.store);
            if let Some(id) = run_blocking(move || store.find_active_user(user_id)).await? {
                return Ok(Purchaser::Registered(id));
            }
            log::warn!("Session user {user_id} is missing or inactive, checking out as guest");
        }

        let store = Arc::clone(&self.store);
        let email = request.billing.email.clone();
        if let Some(id) = run_blocking(move || store.find_user_by_email(&email)).await? {
            return Ok(Purchaser::ReturningGuest(id));
        }

        let name = request.billing.name.clone();
        let email = request.billing.email.clone();
        let profile = run_blocking(move || guest_profile(&name, &email)).await?;
        Ok(Purchaser::Guest(profile))
    }
}
