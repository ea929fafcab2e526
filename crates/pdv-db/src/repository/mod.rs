//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │  db.products().update(id, &patch)                               │
//! │       ▼                                                                 │
//! │  ProductRepository                    SaleRepository                    │
//! │  ├── list()                           ├── record(&sale)                 │
//! │  ├── get(id)                          └── list()                        │
//! │  ├── create(&new)                                                       │
//! │  ├── update(id, &patch)                                                 │
//! │  └── delete(id)                                                         │
//! │       │                                                                 │
//! │       ▼  one SQL statement per call                                     │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read into private `*Row` structs (`sqlx::FromRow`) and converted
//! into the pdv-core types; JSON columns are decoded on the way out.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD
//! - [`sale::SaleRepository`] - Append-only sales ledger

pub mod product;
pub mod sale;
