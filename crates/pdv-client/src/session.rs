//! # Cart Session
//!
//! The sale screen's state: one [`Cart`] behind a mutex plus the finalize
//! action that turns it into a recorded sale.
//!
//! ## Finalize
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  finalize(payment)                                                      │
//! │       │                                                                 │
//! │       ├── another finalize running? ──► Err(FinalizeInFlight)           │
//! │       │                                                                 │
//! │       ▼  guard held from here until return                              │
//! │  cart.checkout(payment, now)  ──► Err(EmptyCart) if nothing to sell     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  recorder.record_sale(&sale).await                                      │
//! │       │                                                                 │
//! │       ├── Err ──► cart kept as-is, error returned                       │
//! │       ▼                                                                 │
//! │  cart.settle(sold lines) + notifier.notify(sale_id) ──► Ok(sale_id)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use pdv_core::cart::{Cart, CartLine, CartState};
use pdv_core::Product;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::backend::SaleRecorder;
use crate::error::{ClientError, ClientResult};

/// Locale-style timestamp written into `Sale.date` (day first, 12h clock).
pub const SALE_DATE_FORMAT: &str = "%-d/%-m/%Y, %-I:%M:%S %p";

const NOTIFY_CAPACITY: usize = 16;

// =============================================================================
// Notifications
// =============================================================================

/// "The ledger changed" signal, sent after a sale is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesChanged {
    pub sale_id: i64,
}

/// Best-effort fan-out of [`SalesChanged`] to every open view.
///
/// Clones share the same channel.
#[derive(Debug, Clone)]
pub struct SalesNotifier {
    tx: broadcast::Sender<SalesChanged>,
}

impl SalesNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFY_CAPACITY);
        SalesNotifier { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SalesChanged> {
        self.tx.subscribe()
    }

    /// Returns how many subscribers were reached (0 when nobody listens).
    pub fn notify(&self, sale_id: i64) -> usize {
        self.tx.send(SalesChanged { sale_id }).unwrap_or(0)
    }
}

impl Default for SalesNotifier {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Session
// =============================================================================

/// Releases the finalize flag when dropped, whatever the outcome.
struct FinalizeGuard<'a>(&'a AtomicBool);

impl<'a> FinalizeGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> ClientResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::FinalizeInFlight)?;
        Ok(FinalizeGuard(flag))
    }
}

impl Drop for FinalizeGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One sale screen.
pub struct CartSession<R> {
    cart: Mutex<Cart>,
    recorder: R,
    notifier: SalesNotifier,
    finalizing: AtomicBool,
}

impl<R: SaleRecorder> CartSession<R> {
    pub fn new(recorder: R, notifier: SalesNotifier) -> Self {
        CartSession {
            cart: Mutex::new(Cart::new()),
            recorder,
            notifier,
            finalizing: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read access to the cart.
    pub fn with_cart<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&Cart) -> T,
    {
        f(&self.lock())
    }

    pub fn add(&self, product: &Product, quantity: i64) -> ClientResult<()> {
        self.lock().add_line_item(product, quantity)?;
        debug!(product_id = product.id, quantity, "Added to cart");
        Ok(())
    }

    pub fn remove(&self, index: usize) -> ClientResult<CartLine> {
        Ok(self.lock().remove_line_item(index)?)
    }

    pub fn set_quantity(&self, index: usize, quantity: i64) -> ClientResult<()> {
        Ok(self.lock().set_quantity(index, quantity)?)
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines().to_vec()
    }

    pub fn total(&self) -> f64 {
        self.lock().total()
    }

    pub fn change(&self, payment: f64) -> f64 {
        self.lock().change(payment)
    }

    pub fn state(&self) -> CartState {
        self.lock().state()
    }

    pub fn is_finalizing(&self) -> bool {
        self.finalizing.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Records the cart as a sale stamped with the current local time.
    pub async fn finalize(&self, payment: f64) -> ClientResult<i64> {
        let date = Local::now().format(SALE_DATE_FORMAT).to_string();
        self.finalize_at(payment, date).await
    }

    /// Records the cart as a sale with an explicit `date` string.
    pub async fn finalize_at(&self, payment: f64, date: impl Into<String>) -> ClientResult<i64> {
        let _guard = FinalizeGuard::acquire(&self.finalizing)?;

        // The cart stays editable while the write is in flight; only the
        // lines captured here are taken out afterwards.
        let (sale, sold) = {
            let cart = self.lock();
            (cart.checkout(payment, date)?, cart.lines().to_vec())
        };

        let sale_id = match self.recorder.record_sale(&sale).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Finalize failed; cart kept");
                return Err(e);
            }
        };

        self.lock().settle(&sold);
        let reached = self.notifier.notify(sale_id);
        info!(sale_id, total = sale.total, reached, "Sale finalized");

        Ok(sale_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pdv_core::{CoreError, NewSale};
    use std::sync::atomic::AtomicI64;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeRecorder {
        next_id: AtomicI64,
        recorded: Mutex<Vec<NewSale>>,
    }

    #[async_trait]
    impl SaleRecorder for FakeRecorder {
        async fn record_sale(&self, sale: &NewSale) -> ClientResult<i64> {
            // Yield once so concurrent callers interleave.
            tokio::task::yield_now().await;
            self.recorded.lock().unwrap().push(sale.clone());
            Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Holds every write open until the test releases it.
    #[derive(Default)]
    struct GatedRecorder {
        gate: Notify,
        recorded: Mutex<Vec<NewSale>>,
    }

    #[async_trait]
    impl SaleRecorder for GatedRecorder {
        async fn record_sale(&self, sale: &NewSale) -> ClientResult<i64> {
            self.gate.notified().await;
            let mut recorded = self.recorded.lock().unwrap();
            recorded.push(sale.clone());
            Ok(recorded.len() as i64)
        }
    }

    struct FailingRecorder;

    #[async_trait]
    impl SaleRecorder for FailingRecorder {
        async fn record_sale(&self, _sale: &NewSale) -> ClientResult<i64> {
            Err(ClientError::Status {
                status: 500,
                code: Some("DATABASE_ERROR".to_string()),
                message: "Database operation failed".to_string(),
            })
        }
    }

    fn soda() -> Product {
        Product::new(1, "Coca Cola 600ml", 15.0, 50)
    }

    #[tokio::test]
    async fn test_finalize_records_clears_and_notifies() {
        let notifier = SalesNotifier::new();
        let mut rx = notifier.subscribe();
        let session = CartSession::new(FakeRecorder::default(), notifier);

        session.add(&soda(), 2).unwrap();
        session.add(&soda(), 3).unwrap();
        assert_eq!(session.total(), 75.0);

        let id = session.finalize_at(100.0, "8/9/2025, 3:28:41 PM").await.unwrap();

        assert_eq!(id, 1);
        assert_eq!(session.state(), CartState::Empty);
        assert_eq!(rx.recv().await.unwrap(), SalesChanged { sale_id: 1 });

        let recorded = session.recorder.recorded.lock().unwrap();
        assert_eq!(recorded[0].total, 75.0);
        assert_eq!(recorded[0].change, 25.0);
        assert_eq!(recorded[0].items[0]["quantity"], serde_json::json!(5));
    }

    #[tokio::test]
    async fn test_failed_finalize_keeps_cart() {
        let notifier = SalesNotifier::new();
        let mut rx = notifier.subscribe();
        let session = CartSession::new(FailingRecorder, notifier);
        session.add(&soda(), 1).unwrap();

        let err = session.finalize(20.0).await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        assert_eq!(session.lines().len(), 1);
        assert!(!session.is_finalizing());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_finalize_empty_cart() {
        let session = CartSession::new(FakeRecorder::default(), SalesNotifier::new());
        let err = session.finalize(10.0).await.unwrap_err();
        assert!(matches!(err, ClientError::Cart(CoreError::EmptyCart)));
        assert!(!session.is_finalizing());
    }

    #[tokio::test]
    async fn test_concurrent_finalize_is_rejected() {
        let session = CartSession::new(FakeRecorder::default(), SalesNotifier::new());
        session.add(&soda(), 1).unwrap();

        let (first, second) = tokio::join!(session.finalize(15.0), session.finalize(15.0));

        assert_eq!(first.unwrap(), 1);
        assert!(matches!(second, Err(ClientError::FinalizeInFlight)));
        assert_eq!(session.recorder.recorded.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lines_added_during_finalize_survive() {
        let session = CartSession::new(GatedRecorder::default(), SalesNotifier::new());
        let water = Product::new(2, "Agua 1L", 12.0, 20);
        session.add(&soda(), 1).unwrap();

        let scan_while_saving = async {
            assert!(session.is_finalizing());
            session.add(&water, 2).unwrap();
            session.add(&soda(), 1).unwrap();
            session.recorder.gate.notify_one();
        };
        let (sale_id, ()) = tokio::join!(session.finalize_at(15.0, "now"), scan_while_saving);
        assert_eq!(sale_id.unwrap(), 1);

        let recorded = session.recorder.recorded.lock().unwrap();
        assert_eq!(recorded[0].total, 15.0);
        assert_eq!(recorded[0].items.as_array().unwrap().len(), 1);

        let left: Vec<(i64, i64)> = session
            .lines()
            .iter()
            .map(|l| (l.product_id, l.quantity))
            .collect();
        assert_eq!(left, vec![(1, 1), (2, 2)]);
        assert!(!session.is_finalizing());
    }

    #[test]
    fn test_sale_date_format_is_parseable() {
        let stamp = Local::now().format(SALE_DATE_FORMAT).to_string();
        assert!(pdv_core::datetime::parse_sale_date(&stamp).is_ok());
    }
}
