//! Alert Emitter: stages low-stock alerts next to the stock write.

use tracing::debug;

use stockflow_core::StockAlertId;
use stockflow_inventory::{LowStockPolicy, Product, StockEvent};

use crate::store::UnitOfWork;

#[derive(Debug, Default, Clone, Copy)]
pub struct AlertEmitter {
    policy: LowStockPolicy,
}

impl AlertEmitter {
    pub fn new(threshold: i64) -> Self {
        Self {
            policy: LowStockPolicy::new(threshold),
        }
    }

    pub fn threshold(&self) -> i64 {
        self.policy.threshold()
    }

    /// Stage an alert when `event` leaves the row below the threshold.
    ///
    /// Never touches stock and never fails; the alert lives or dies with `uow`.
    pub fn on_stock_changed(
        &self,
        uow: &mut UnitOfWork<'_>,
        product: &Product,
        event: &StockEvent,
    ) -> Option<StockAlertId> {
        let alert = self.policy.evaluate(product, event)?;
        let id = alert.id;
        debug!(
            product_id = %alert.product_id,
            remaining = ?event.new_quantity(),
            "low-stock alert staged"
        );
        uow.stage_alert(alert);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::ledger::StockLedger;
    use crate::testing::seeded;

    #[test]
    fn alert_is_staged_and_committed_with_the_unit() {
        let s = seeded(12, 250);
        let mut uow = s.store.begin();
        let r = StockLedger::new()
            .reserve_and_decrement(&mut uow, s.product_id, 4, Utc::now())
            .unwrap();

        let id = AlertEmitter::default().on_stock_changed(&mut uow, &r.product, &r.event);

        assert!(id.is_some());
        assert_eq!(uow.staged_alerts().len(), 1);
        assert!(s.store.alerts_for_product(s.product_id).unwrap().is_empty());
    }

    #[test]
    fn dropped_unit_discards_the_alert() {
        let s = seeded(12, 250);
        {
            let mut uow = s.store.begin();
            let r = StockLedger::new()
                .reserve_and_decrement(&mut uow, s.product_id, 4, Utc::now())
                .unwrap();
            AlertEmitter::default().on_stock_changed(&mut uow, &r.product, &r.event);
        }
        assert_eq!(s.store.alerts_count().unwrap(), 0);
    }

    #[test]
    fn threshold_comes_from_construction() {
        let s = seeded(40, 250);
        let emitter = AlertEmitter::new(50);
        assert_eq!(emitter.threshold(), 50);

        let mut uow = s.store.begin();
        let r = StockLedger::new()
            .reserve_and_decrement(&mut uow, s.product_id, 1, Utc::now())
            .unwrap();
        assert!(emitter.on_stock_changed(&mut uow, &r.product, &r.event).is_some());
        assert!(AlertEmitter::default().on_stock_changed(&mut uow, &r.product, &r.event).is_none());
    }
}
