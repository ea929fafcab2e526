//! # Live Dashboard
//!
//! Keeps "today" and "this month" sales totals current.
//!
//! ```text
//! ┌────────────────┐  SalesChanged   ┌───────────────────┐  snapshot  ┌──────────┐
//! │ CartSession    │ ──broadcast───► │ dashboard task    │ ──watch──► │ views    │
//! │ (finalize)     │                 │ list_sales()      │            │          │
//! └────────────────┘                 │ + report rollups  │            └──────────┘
//!                                    └───────────────────┘
//! ```
//!
//! Every signal triggers a full reload of the ledger; totals are never
//! patched incrementally.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use pdv_core::report::{daily_total, monthly_total, SaleRecord};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::SalesSource;
use crate::error::ClientResult;
use crate::session::{SalesChanged, SalesNotifier};

/// What the dashboard cards show.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// False until the first load finished (successfully or not).
    pub loaded: bool,
    pub today_total: f64,
    pub month_total: f64,
    pub sales_count: usize,
    /// Message of the last failed reload; previous totals are kept.
    pub error: Option<String>,
}

/// Loads the ledger once and computes a snapshot for `today`.
pub async fn load_snapshot<S>(source: &S, today: NaiveDate) -> ClientResult<DashboardSnapshot>
where
    S: SalesSource + ?Sized,
{
    let sales = source.list_sales().await?;
    let records: Vec<SaleRecord> = sales.iter().map(SaleRecord::from).collect();

    Ok(DashboardSnapshot {
        loaded: true,
        today_total: daily_total(&records, today),
        month_total: monthly_total(&records, today),
        sales_count: records.len(),
        error: None,
    })
}

/// Handle to a running dashboard task. Dropping it stops the task.
pub struct Dashboard {
    rx: watch::Receiver<DashboardSnapshot>,
    task: JoinHandle<()>,
}

impl Dashboard {
    /// Starts the refresh loop: one load now, one per sales notification.
    pub fn spawn<S>(source: Arc<S>, notifier: &SalesNotifier) -> Self
    where
        S: SalesSource + ?Sized + 'static,
    {
        let (tx, rx) = watch::channel(DashboardSnapshot::default());
        // Subscribe before spawning so no notification is missed.
        let events = notifier.subscribe();
        let task = tokio::spawn(run(source, events, tx));

        Dashboard { rx, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.rx.clone()
    }

    pub fn current(&self) -> DashboardSnapshot {
        self.rx.borrow().clone()
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<S>(
    source: Arc<S>,
    mut events: broadcast::Receiver<SalesChanged>,
    tx: watch::Sender<DashboardSnapshot>,
) where
    S: SalesSource + ?Sized,
{
    refresh(source.as_ref(), &tx).await;

    loop {
        match events.recv().await {
            Ok(event) => {
                debug!(sale_id = event.sale_id, "Sales changed; reloading dashboard");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Dashboard lagged behind sales notifications");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }

        refresh(source.as_ref(), &tx).await;
    }
}

async fn refresh<S>(source: &S, tx: &watch::Sender<DashboardSnapshot>)
where
    S: SalesSource + ?Sized,
{
    let today = Local::now().date_naive();

    match load_snapshot(source, today).await {
        Ok(snapshot) => {
            tx.send_replace(snapshot);
        }
        Err(e) => {
            warn!(error = %e, "Dashboard reload failed");
            tx.send_modify(|snapshot| {
                snapshot.loaded = true;
                snapshot.error = Some(e.to_string());
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SaleRecorder;
    use crate::error::ClientError;
    use crate::session::{CartSession, SALE_DATE_FORMAT};
    use async_trait::async_trait;
    use pdv_core::{NewSale, Product, Sale};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryLedger {
        sales: Mutex<Vec<Sale>>,
    }

    #[async_trait]
    impl SalesSource for MemoryLedger {
        async fn list_sales(&self) -> ClientResult<Vec<Sale>> {
            Ok(self.sales.lock().unwrap().clone())
        }
    }

    #[async_trait]
    impl SaleRecorder for MemoryLedger {
        async fn record_sale(&self, sale: &NewSale) -> ClientResult<i64> {
            let mut sales = self.sales.lock().unwrap();
            let id = sales.len() as i64 + 1;
            sales.push(Sale {
                id,
                items: sale.items.clone(),
                total: sale.total,
                payment: sale.payment,
                change: sale.change,
                date: sale.date.clone(),
            });
            Ok(id)
        }
    }

    struct BrokenLedger;

    #[async_trait]
    impl SalesSource for BrokenLedger {
        async fn list_sales(&self) -> ClientResult<Vec<Sale>> {
            Err(ClientError::Status {
                status: 500,
                code: None,
                message: "Database operation failed".to_string(),
            })
        }
    }

    fn sale(id: i64, total: f64, date: &str) -> Sale {
        Sale {
            id,
            items: json!([]),
            total,
            payment: total,
            change: 0.0,
            date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let ledger = MemoryLedger::default();
        ledger.sales.lock().unwrap().extend([
            sale(1, 100.0, "8/9/2025, 3:28:41 p.m."),
            sale(2, 50.0, "1/9/2025, 9:00:00 a.m."),
            sale(3, 20.0, "31/8/2025, 11:59:59 p.m."),
            sale(4, 999.0, "not a date"),
        ]);

        let today = NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();
        let snapshot = load_snapshot(&ledger, today).await.unwrap();

        assert_eq!(snapshot.today_total, 100.0);
        assert_eq!(snapshot.month_total, 150.0);
        assert_eq!(snapshot.sales_count, 4);
        assert!(snapshot.loaded);
    }

    #[tokio::test]
    async fn test_dashboard_refreshes_after_finalize() {
        let ledger = Arc::new(MemoryLedger::default());
        let notifier = SalesNotifier::new();
        let dashboard = Dashboard::spawn(ledger.clone(), &notifier);
        let mut rx = dashboard.subscribe();

        rx.wait_for(|s| s.loaded).await.unwrap();
        assert_eq!(dashboard.current().sales_count, 0);

        let session = CartSession::new(ledger.clone(), notifier.clone());
        session.add(&Product::new(1, "Pan", 12.5, 10), 2).unwrap();
        let now = Local::now().format(SALE_DATE_FORMAT).to_string();
        session.finalize_at(30.0, now).await.unwrap();

        let snapshot = rx.wait_for(|s| s.sales_count == 1).await.unwrap().clone();
        assert_eq!(snapshot.today_total, 25.0);
        assert_eq!(snapshot.month_total, 25.0);
    }

    #[tokio::test]
    async fn test_failed_reload_reports_error() {
        let notifier = SalesNotifier::new();
        let dashboard = Dashboard::spawn(Arc::new(BrokenLedger), &notifier);
        let mut rx = dashboard.subscribe();

        let snapshot = rx.wait_for(|s| s.loaded).await.unwrap().clone();
        assert_eq!(snapshot.today_total, 0.0);
        assert!(snapshot.error.is_some());
    }
}
