//! Canonical scenario fixtures

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::ActorId;
use domain_till::adapters::{InMemoryEntryStore, InMemorySalesSource};
use domain_till::LedgerEntry;

use crate::builders::sale;

/// A seeded end-of-shift reconciliation scenario
///
/// History: float of 1000.00 opened before the window; in-window sales of
/// 225.50 cash ("Efectivo"), 250.00 card and 430.00 credit; 500.00 of manual
/// deposits and 200.00 of withdrawals. Expected cash for the window is
/// therefore 1000.00 + 225.50 + 500.00 - 200.00 = 1525.50.
pub struct ReconciliationScenario {
    pub store: Arc<InMemoryEntryStore>,
    pub sales: Arc<InMemorySalesSource>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub actor: ActorId,
}

/// Builds the canonical shift described on [`ReconciliationScenario`].
pub fn reconciliation_scenario() -> ReconciliationScenario {
    let actor = ActorId::new();
    let opened_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let window_start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
    let mid_morning = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
    let afternoon = Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap();

    let store = InMemoryEntryStore::new();
    store.seed(
        LedgerEntry::start(dec!(1000.00), "Apertura de caja", actor).with_timestamp(opened_at),
    );
    store.seed(
        LedgerEntry::cash_in(dec!(300.00), "Fondo adicional", actor).with_timestamp(mid_morning),
    );
    store.seed(LedgerEntry::cash_in(dec!(200.00), "Cambio", actor).with_timestamp(afternoon));
    store.seed(
        LedgerEntry::cash_out(dec!(200.00), "Pago a proveedor", actor).with_timestamp(afternoon),
    );

    let sales = InMemorySalesSource::new();
    sales.record(sale(dec!(225.50)).paid_with("Efectivo").at(mid_morning).build());
    sales.record(sale(dec!(250.00)).paid_with("Tarjeta").at(mid_morning).build());
    sales.record(sale(dec!(430.00)).paid_with("Crédito").at(afternoon).build());

    ReconciliationScenario {
        store: Arc::new(store),
        sales: Arc::new(sales),
        window_start,
        window_end,
        actor,
    }
}
