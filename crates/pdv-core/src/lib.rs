//! # pdv-core: Pure Business Logic for PDV
//!
//! This crate holds the sales-ledger and inventory model as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PDV Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Frontend session (pdv-client)                   │   │
//! │  │    Catalog ──► Cart ──► Finalize ──► Dashboard / Reports        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                      apps/api (axum)                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ pdv-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌──────────┐  ┌──────────────────┐  │   │
//! │  │   │  types  │  │  cart   │  │  report  │  │ validation       │  │   │
//! │  │   │ Product │  │  Cart   │  │ rollups  │  │ datetime parsing │  │   │
//! │  │   │  Sale   │  │CartLine │  │ series   │  │                  │  │   │
//! │  │   └─────────┘  └─────────┘  └──────────┘  └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pdv-db (Database Layer)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire and domain types (Product, Sale, Expense, ...)
//! - [`cart`] - The in-progress cart and its derived totals
//! - [`report`] - Daily/monthly/category rollups over the ledger
//! - [`datetime`] - Tolerant parsing of sale timestamps
//! - [`validation`] - Input validation run before any store call
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pdv_core::cart::Cart;
//! use pdv_core::types::Product;
//!
//! let soda = Product::new(1, "Coca Cola 600ml", 15.0, 50);
//!
//! let mut cart = Cart::new();
//! cart.add_line_item(&soda, 2).unwrap();
//! cart.add_line_item(&soda, 1).unwrap();
//!
//! assert_eq!(cart.lines().len(), 1);
//! assert_eq!(cart.total(), 45.0);
//! assert_eq!(cart.change(50.0), 5.0);
//! ```

pub mod cart;
pub mod datetime;
pub mod error;
pub mod report;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use types::*;

/// Metadata key holding a product's stock keeping unit.
pub const METADATA_SKU: &str = "sku";

/// Metadata key holding a product's category.
pub const METADATA_CATEGORY: &str = "category";
