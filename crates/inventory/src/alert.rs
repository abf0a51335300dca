//! Low-stock alerting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockflow_core::{ProductId, StockAlertId};
use stockflow_events::Event;

use crate::product::{Product, StockEvent};

/// Default low-stock cutoff: a stock change landing below this alerts.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Append-only low-stock notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: StockAlertId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// Decides whether a stock event warrants an alert.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LowStockPolicy {
    threshold: i64,
}

impl LowStockPolicy {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Evaluate a stock event against the threshold.
    ///
    /// `product` is the row after the event was applied; only its name and SKU
    /// feed the message. Events that do not move stock never alert.
    pub fn evaluate(&self, product: &Product, event: &StockEvent) -> Option<StockAlert> {
        let remaining = event.new_quantity()?;
        if remaining >= self.threshold {
            return None;
        }

        Some(StockAlert {
            id: StockAlertId::new(),
            product_id: event.product_id(),
            created_at: event.occurred_at(),
            message: format!(
                "Low stock: {} (SKU {}) has {} units remaining",
                product.name(),
                product.sku(),
                remaining
            ),
        })
    }
}

impl Default for LowStockPolicy {
    fn default() -> Self {
        Self::new(LOW_STOCK_THRESHOLD)
    }
}
