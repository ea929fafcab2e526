//! # Domain Types
//!
//! Wire and domain types shared by the store, the HTTP layer and clients.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Expense      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  nombre         │       │
//! │  │  name           │   │  items (JSON)   │   │  categoria      │       │
//! │  │  price, stock   │   │  total, payment │   │  monto          │       │
//! │  │  metadata (JSON)│   │  change, date   │   │  fecha          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Write models: NewProduct, ProductPatch, NewSale                        │
//! │  Line items:   LineItem (name snapshot, not a live product reference)   │
//! │  Legacy:       LegacySale (flat single-line record, reports only)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary values are `f64`: the store keeps them as SQLite `REAL` and the
//! ledger records whatever the client computed, verbatim.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation;
use crate::{METADATA_CATEGORY, METADATA_SKU};

/// Open key/value mapping stored alongside a product as an opaque blob.
pub type Metadata = Map<String, Value>;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Store-assigned identifier, immutable once created.
    #[ts(type = "number")]
    pub id: i64,

    pub name: String,

    pub price: f64,

    #[ts(type = "number")]
    pub stock: i64,

    /// Conventionally `{ sku, category }`; never validated by the store.
    #[ts(type = "Record<string, unknown> | null")]
    pub metadata: Option<Metadata>,
}

impl Product {
    /// Builds a product without metadata.
    pub fn new(id: i64, name: impl Into<String>, price: f64, stock: i64) -> Self {
        Product {
            id,
            name: name.into(),
            price,
            stock,
            metadata: None,
        }
    }

    /// Returns the product with the given metadata blob.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The `sku` metadata entry, if present and a string.
    pub fn sku(&self) -> Option<&str> {
        self.metadata_str(METADATA_SKU)
    }

    /// The `category` metadata entry, if present and a string.
    pub fn category(&self) -> Option<&str> {
        self.metadata_str(METADATA_CATEGORY)
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}

/// Builds the conventional `{sku, category}` metadata blob.
pub fn product_metadata(sku: &str, category: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(METADATA_SKU.to_string(), Value::String(sku.to_string()));
    metadata.insert(
        METADATA_CATEGORY.to_string(),
        Value::String(category.to_string()),
    );
    metadata
}

/// Case-insensitive name search used for cart suggestions.
///
/// An empty query matches everything, in catalog order.
pub fn search_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Body of `POST /products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    /// Required; kept defaulted here so a missing name surfaces as a
    /// validation error rather than a decode error.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub stock: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "Record<string, unknown> | null")]
    pub metadata: Option<Metadata>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>) -> Self {
        NewProduct {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Checks the fields that must hold before the row is inserted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_product_name(&self.name)?;
        if let Some(price) = self.price {
            validation::validate_price(price)?;
        }
        if let Some(stock) = self.stock {
            validation::validate_stock(stock)?;
        }
        Ok(())
    }
}

/// Body of `PUT /products/{id}`: only present fields are written.
///
/// `metadata` distinguishes "absent" (`None`) from an explicit `null`
/// (`Some(None)`, which clears the blob). A metadata update replaces the
/// whole blob; there is no merge of individual keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub stock: Option<i64>,

    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional, type = "Record<string, unknown> | null")]
    pub metadata: Option<Option<Metadata>>,
}

impl ProductPatch {
    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none() && self.metadata.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validation::validate_product_name(name)?;
        }
        if let Some(price) = self.price {
            validation::validate_price(price)?;
        }
        if let Some(stock) = self.stock {
            validation::validate_stock(stock)?;
        }
        Ok(())
    }
}

/// Maps a present field (including `null`) to `Some`, leaving absence to
/// `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a finalized sale.
///
/// Carries a snapshot of the product name and price; deleting or editing the
/// product later does not touch recorded sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub product_id: Option<i64>,
    pub name: String,
    #[ts(type = "number")]
    pub quantity: i64,
    pub unit_price: f64,
    pub total: f64,
}

/// Body of `POST /sales`.
///
/// `items` is kept as raw JSON: the ledger stores whatever the caller sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    #[serde(default = "empty_items", deserialize_with = "items_or_empty")]
    #[ts(type = "unknown[]")]
    pub items: Value,

    #[serde(default)]
    pub total: f64,

    #[serde(default)]
    pub payment: f64,

    #[serde(default)]
    pub change: f64,

    /// Client-local, human readable timestamp captured at finalize time.
    #[serde(default)]
    pub date: String,
}

fn empty_items() -> Value {
    Value::Array(Vec::new())
}

/// An explicit `null` counts as "no items".
fn items_or_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(|items| !items.is_null())
        .unwrap_or_else(empty_items))
}

impl NewSale {
    /// Only the timestamp is checked; totals are taken on trust.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_sale_date(&self.date)
    }
}

/// A recorded ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "unknown[]")]
    pub items: Value,
    pub total: f64,
    pub payment: f64,
    pub change: f64,
    pub date: String,
}

impl Sale {
    /// Decodes `items` as structured line items.
    pub fn line_items(&self) -> Result<Vec<LineItem>, serde_json::Error> {
        serde_json::from_value(self.items.clone())
    }
}

/// `{ "id": ... }` returned by create endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Created {
    #[ts(type = "number")]
    pub id: i64,
}

/// `{ "ok": true }` returned by update/delete endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ack {
    pub ok: bool,
}

// =============================================================================
// Legacy sale record
// =============================================================================

/// Flat single-line sale record (`producto`, `categoria`, ...).
///
/// Produced by the quick "register sale" form; never written to the store.
/// It is the only shape that carries a category at the sale level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LegacySale {
    #[ts(type = "number")]
    pub id: i64,
    pub producto: String,
    pub categoria: String,
    #[ts(type = "number")]
    pub cantidad: i64,
    pub precio_unitario: f64,
    pub total: f64,
    /// `YYYY-MM-DD`
    pub fecha: String,
}

impl LegacySale {
    /// Validates the form fields in form order and computes
    /// `total = cantidad × precio`. `fecha` is `YYYY-MM-DD`.
    pub fn new(
        id: i64,
        producto: &str,
        categoria: &str,
        cantidad: i64,
        precio_unitario: f64,
        fecha: &str,
    ) -> Result<Self, ValidationError> {
        if producto.trim().is_empty() {
            return Err(ValidationError::required("producto"));
        }
        if categoria.trim().is_empty() {
            return Err(ValidationError::required("categoria"));
        }
        validation::validate_quantity(cantidad)?;
        validation::validate_positive_amount("precioUnitario", precio_unitario)?;
        let fecha = validation::validate_calendar_date("fecha", fecha)?;

        Ok(LegacySale {
            id,
            producto: producto.trim().to_string(),
            categoria: categoria.trim().to_string(),
            cantidad,
            precio_unitario,
            total: cantidad as f64 * precio_unitario,
            fecha: fecha.format("%Y-%m-%d").to_string(),
        })
    }
}

// =============================================================================
// Expense
// =============================================================================

/// Fixed set of expense categories offered by the expense form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExpenseCategory {
    #[serde(rename = "Servicios")]
    Utilities,
    #[serde(rename = "Renta")]
    Rent,
    #[serde(rename = "Sueldos")]
    Payroll,
    #[serde(rename = "Proveedores")]
    Suppliers,
    #[serde(rename = "Mantenimiento")]
    Maintenance,
    #[serde(rename = "Otros")]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Utilities,
        ExpenseCategory::Rent,
        ExpenseCategory::Payroll,
        ExpenseCategory::Suppliers,
        ExpenseCategory::Maintenance,
        ExpenseCategory::Other,
    ];

    /// Label shown in the form and used on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Utilities => "Servicios",
            ExpenseCategory::Rent => "Renta",
            ExpenseCategory::Payroll => "Sueldos",
            ExpenseCategory::Suppliers => "Proveedores",
            ExpenseCategory::Maintenance => "Mantenimiento",
            ExpenseCategory::Other => "Otros",
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "categoria".to_string(),
                allowed: ExpenseCategory::ALL
                    .iter()
                    .map(|c| c.label().to_string())
                    .collect(),
            })
    }
}

/// A business expense. Client-side only; lost when the session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: ExpenseCategory,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "fecha")]
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl Expense {
    pub fn new(
        name: &str,
        category: ExpenseCategory,
        amount: f64,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::required("nombre"));
        }
        validation::validate_positive_amount("monto", amount)?;

        Ok(Expense {
            name: name.trim().to_string(),
            category,
            amount,
            date,
        })
    }

    /// `YYYY-MM` bucket key.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
