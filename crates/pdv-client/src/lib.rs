//! # pdv-client: Frontend Session Library
//!
//! Everything a sale screen or dashboard needs on the client side of the
//! HTTP boundary.
//!
//! ## Module Organization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          pdv-client                                     │
//! │                                                                         │
//! │   http ─────────► backend traits ◄──────── in-memory fakes (tests)      │
//! │   HttpApi          Catalog / SaleRecorder / SalesSource                 │
//! │                          │                                              │
//! │            ┌─────────────┴──────────────┐                               │
//! │            ▼                            ▼                               │
//! │   session::CartSession  ──notify──►  dashboard::Dashboard               │
//! │   (cart + finalize)                  (today / month totals)             │
//! │                                                                         │
//! │   expenses::ExpenseBook      register::SaleRegister                     │
//! │   (session-only expenses)    (session-only quick sales by category)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pdv_client::{CartSession, Dashboard, HttpApi, SalesNotifier};
//!
//! let api = Arc::new(HttpApi::new("http://localhost:3001"));
//! let notifier = SalesNotifier::new();
//! let dashboard = Dashboard::spawn(api.clone(), &notifier);
//!
//! let session = CartSession::new(api.clone(), notifier);
//! let products = api.list_products().await?;
//! session.add(&products[0], 2)?;
//! let sale_id = session.finalize(100.0).await?;
//! ```

pub mod backend;
pub mod dashboard;
pub mod error;
pub mod expenses;
pub mod http;
pub mod register;
pub mod session;

pub use backend::{Catalog, SaleRecorder, SalesSource};
pub use dashboard::{Dashboard, DashboardSnapshot};
pub use error::{ClientError, ClientResult};
pub use expenses::ExpenseBook;
pub use http::HttpApi;
pub use register::SaleRegister;
pub use session::{CartSession, SalesChanged, SalesNotifier};
