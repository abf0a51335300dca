use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockflow_core::{DomainError, Money, OrderId, PaymentId};

use crate::order::{Order, OrderError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment amount {actual} does not match order total {expected}")]
    AmountMismatch { expected: Money, actual: Money },

    #[error("payment amount must be positive")]
    ZeroAmount,

    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Payment status lifecycle. Recording always starts at `Pending`; settlement
/// belongs to the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
    BankTransfer,
    PayPal,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::PayPal => "pay_pal",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "pay_pal" | "paypal" => Ok(PaymentMethod::PayPal),
            "cash" => Ok(PaymentMethod::Cash),
            _ => Err(DomainError::validation(format!("unknown payment method: {s}"))),
        }
    }
}

/// Bookkeeping entry for an order's payment (not a real charge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub paid_at: DateTime<Utc>,
    pub method: PaymentMethod,
    pub amount: Money,
    pub status: PaymentStatus,
}

impl Payment {
    /// Record a `Pending` payment for `order`.
    ///
    /// `amount` must equal the order total exactly.
    pub fn record(
        order: &Order,
        method: PaymentMethod,
        amount: Money,
        paid_at: DateTime<Utc>,
    ) -> Result<Self, PaymentError> {
        let expected = order.total()?;
        if amount.is_zero() {
            return Err(PaymentError::ZeroAmount);
        }
        if amount != expected {
            return Err(PaymentError::AmountMismatch {
                expected,
                actual: amount,
            });
        }

        Ok(Self {
            id: PaymentId::new(),
            order_id: order.id_typed(),
            paid_at,
            method,
            amount,
            status: PaymentStatus::Pending,
        })
    }
}
