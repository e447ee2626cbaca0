//! Cart validation and the draft handed to the checkout commit.

use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::discount::AppliedDiscount;
use super::errors::DomainError;
use super::identity::{Purchaser, Requester};
use super::money::{line_subtotal, Totals};
use super::product::Product;

/// Column widths of the order and user rows a checkout writes.
const MAX_BILLING_NAME: usize = 100;
const MAX_BILLING_EMAIL: usize = 255;
const MAX_BILLING_ZIP: usize = 20;
const MAX_PAYMENT_METHOD: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,
    pub zip: String,
}

#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub lines: Vec<CartLine>,
    pub payment_method: String,
    pub billing: BillingDetails,
    pub discount_code: Option<String>,
    pub requester: Requester,
    pub client: ClientMeta,
}

impl CheckoutRequest {
    /// Shape checks that need no stored state.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.lines.is_empty() {
            return Err(DomainError::InvalidInput("cart is empty".into()));
        }
        let missing: Vec<&str> = [
            ("billing_name", &self.billing.name),
            ("billing_email", &self.billing.email),
            ("billing_zip", &self.billing.zip),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();
        if !missing.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "missing billing fields: {}",
                missing.join(", ")
            )));
        }
        if !self.billing.email.contains('@') {
            return Err(DomainError::InvalidInput("billing_email is not valid".into()));
        }
        if self.payment_method.trim().is_empty() {
            return Err(DomainError::InvalidInput("paymentMethod is required".into()));
        }
        for (field, value, max) in [
            ("billing_name", &self.billing.name, MAX_BILLING_NAME),
            ("billing_email", &self.billing.email, MAX_BILLING_EMAIL),
            ("billing_zip", &self.billing.zip, MAX_BILLING_ZIP),
            ("paymentMethod", &self.payment_method, MAX_PAYMENT_METHOD),
        ] {
            if value.chars().count() > max {
                return Err(DomainError::InvalidInput(format!(
                    "{field} must be at most {max} characters"
                )));
            }
        }
        Ok(())
    }
}

/// A cart line with its price frozen at validation time.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i64,
    pub title: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

/// Checks every line against the loaded catalog, in cart order, and returns
/// the priced lines with their unrounded sum.
pub fn price_cart(
    products: &[Product],
    lines: &[CartLine],
) -> Result<(Vec<PricedLine>, BigDecimal), DomainError> {
    let by_id: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal = BigDecimal::zero();
    for line in lines {
        let product = by_id
            .get(&line.product_id)
            .filter(|p| p.is_active)
            .ok_or(DomainError::ProductUnavailable {
                product_id: line.product_id,
            })?;
        if line.quantity < 1 {
            return Err(DomainError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
        if product.stock < line.quantity {
            return Err(DomainError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
            });
        }

        subtotal += &product.price * BigDecimal::from(line.quantity);
        priced.push(PricedLine {
            product_id: product.id,
            title: product.title.clone(),
            quantity: line.quantity,
            unit_price: product.price.clone(),
            subtotal: line_subtotal(&product.price, line.quantity),
        });
    }
    Ok((priced, subtotal))
}

/// A fully validated and priced checkout, ready to be committed.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    pub purchaser: Purchaser,
    pub lines: Vec<PricedLine>,
    pub discount: Option<AppliedDiscount>,
    pub totals: Totals,
    pub payment_method: String,
    pub billing: BillingDetails,
    pub client: ClientMeta,
}

impl CheckoutDraft {
    /// Product ids in ascending order, deduplicated. Rows are locked in this
    /// order so that concurrent carts cannot deadlock.
    pub fn lock_order(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Audit snapshot stored on the transaction row.
    pub fn metadata(&self) -> Value {
        let cart: Vec<Value> = self
            .lines
            .iter()
            .map(|l| {
                json!({
                    "product_id": l.product_id,
                    "title": l.title,
                    "quantity": l.quantity,
                    "unit_price": l.unit_price.to_string(),
                    "subtotal": l.subtotal.to_string(),
                })
            })
            .collect();

        json!({
            "cart": cart,
            "subtotal": self.totals.subtotal.to_string(),
            "discount": self.totals.discount.to_string(),
            "discount_code": self.discount.as_ref().map(|d| d.code.clone()),
            "discount_percent": self.discount.as_ref().map(|d| d.percent_off),
            "tax": self.totals.tax.to_string(),
            "tax_rate": self.totals.tax_rate.to_string(),
            "total": self.totals.total.to_string(),
            "payment_method": self.payment_method,
            "guest": self.purchaser.is_guest(),
        })
    }
}

pub fn generate_order_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..10].to_uppercase();
    format!("ORD-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

pub fn generate_transaction_id() -> String {
    format!("TXN-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}
