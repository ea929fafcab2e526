//! # Reporting Aggregator
//!
//! Read-only rollups over the sales ledger (and the session's expenses).
//! Everything is recomputed from the full record list on every call.
//!
//! ## Record Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     SaleRecord::classify(value)                         │
//! │                                                                         │
//! │  has `items` array?  ──yes──►  Itemized { total?, item totals, date }   │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  has `categoria` and `total`?  ──yes──►  Legacy { categoria, total,     │
//! │        │ no                                       fecha }               │
//! │        ▼                                                                │
//! │  Unrecognized  (contributes 0 everywhere, logged)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only legacy records carry a category. Itemized records are counted as
//! "unavailable" in the category report rather than guessed at.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use ts_rs::TS;

use crate::datetime::parse_sale_date;
use crate::types::{Expense, LegacySale, Sale};

// =============================================================================
// Records
// =============================================================================

/// A ledger entry in its items-array shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemizedRecord {
    pub total: Option<f64>,
    pub item_totals: Vec<f64>,
    pub date: Option<String>,
}

/// A flat, single-line record carrying its own category.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRecord {
    pub categoria: String,
    pub total: f64,
    pub fecha: Option<String>,
}

/// One sale record as seen by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum SaleRecord {
    Itemized(ItemizedRecord),
    Legacy(LegacyRecord),
    Unrecognized,
}

impl SaleRecord {
    /// Detects the shape of a raw record. The items-array check wins.
    pub fn classify(value: &Value) -> SaleRecord {
        let Some(obj) = value.as_object() else {
            warn!("Skipping non-object sale record");
            return SaleRecord::Unrecognized;
        };

        if let Some(items) = obj.get("items").and_then(Value::as_array) {
            return SaleRecord::Itemized(ItemizedRecord {
                total: obj.get("total").and_then(Value::as_f64),
                item_totals: items
                    .iter()
                    .map(|item| item.get("total").and_then(Value::as_f64).unwrap_or(0.0))
                    .collect(),
                date: string_field(value, "date"),
            });
        }

        if let (Some(categoria), Some(total)) = (obj.get("categoria"), obj.get("total")) {
            return SaleRecord::Legacy(LegacyRecord {
                categoria: match categoria {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                total: total.as_f64().unwrap_or(0.0),
                fecha: string_field(value, "fecha"),
            });
        }

        warn!(id = ?obj.get("id"), "Unrecognized sale record shape");
        SaleRecord::Unrecognized
    }

    /// Classifies every record of a raw list.
    pub fn classify_all(values: &[Value]) -> Vec<SaleRecord> {
        values.iter().map(SaleRecord::classify).collect()
    }

    /// Record amount: `total` when present, else the sum of line totals.
    pub fn amount(&self) -> f64 {
        match self {
            SaleRecord::Itemized(r) => r.total.unwrap_or_else(|| r.item_totals.iter().sum()),
            SaleRecord::Legacy(r) => r.total,
            SaleRecord::Unrecognized => 0.0,
        }
    }

    /// The raw date string (`date` for itemized, `fecha` for legacy).
    pub fn date_str(&self) -> Option<&str> {
        match self {
            SaleRecord::Itemized(r) => r.date.as_deref(),
            SaleRecord::Legacy(r) => r.fecha.as_deref(),
            SaleRecord::Unrecognized => None,
        }
    }

    /// Parsed timestamp; unparseable dates are logged and yield `None`.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.date_str()?;
        match parse_sale_date(raw) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(error = %e, "Sale date excluded from time buckets");
                None
            }
        }
    }

    /// `YYYY-MM` bucket key.
    pub fn month_key(&self) -> Option<String> {
        month_key(self.date_str()?)
    }
}

impl From<&Sale> for SaleRecord {
    fn from(sale: &Sale) -> Self {
        SaleRecord::Itemized(ItemizedRecord {
            total: Some(sale.total),
            item_totals: sale
                .items
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .map(|i| i.get("total").and_then(Value::as_f64).unwrap_or(0.0))
                        .collect()
                })
                .unwrap_or_default(),
            date: Some(sale.date.clone()),
        })
    }
}

impl From<&LegacySale> for SaleRecord {
    fn from(sale: &LegacySale) -> Self {
        SaleRecord::Legacy(LegacyRecord {
            categoria: sale.categoria.clone(),
            total: sale.total,
            fecha: Some(sale.fecha.clone()),
        })
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `YYYY-MM` for a date string: the leading seven characters when they
/// already look like a month, otherwise the month of the parsed timestamp.
pub fn month_key(date: &str) -> Option<String> {
    let date = date.trim();
    if let Some(prefix) = date.get(..7) {
        let bytes = prefix.as_bytes();
        let looks_like_month = bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if looks_like_month {
            return Some(prefix.to_string());
        }
    }

    match parse_sale_date(date) {
        Ok(ts) => Some(ts.format("%Y-%m").to_string()),
        Err(e) => {
            warn!(error = %e, "Record excluded from monthly buckets");
            None
        }
    }
}

// =============================================================================
// Time-window totals
// =============================================================================

/// Sum of amounts whose timestamp falls on `today` (local calendar day).
pub fn daily_total(records: &[SaleRecord], today: NaiveDate) -> f64 {
    records
        .iter()
        .filter(|r| r.timestamp().is_some_and(|ts| ts.date() == today))
        .map(SaleRecord::amount)
        .sum()
}

/// Sum of amounts whose timestamp falls in the month of `today`.
pub fn monthly_total(records: &[SaleRecord], today: NaiveDate) -> f64 {
    records
        .iter()
        .filter(|r| {
            r.timestamp()
                .is_some_and(|ts| ts.year() == today.year() && ts.month() == today.month())
        })
        .map(SaleRecord::amount)
        .sum()
}

// =============================================================================
// Category report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryTotal {
    pub categoria: String,
    pub total: f64,
    #[ts(type = "number")]
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryReport {
    /// In order of first appearance.
    pub categories: Vec<CategoryTotal>,
    /// Itemized records, which carry no category.
    #[ts(type = "number")]
    pub unavailable: usize,
}

/// Groups legacy records by `categoria`.
pub fn category_report(records: &[SaleRecord]) -> CategoryReport {
    let mut report = CategoryReport::default();

    for record in records {
        match record {
            SaleRecord::Legacy(r) => {
                match report.categories.iter_mut().find(|c| c.categoria == r.categoria) {
                    Some(entry) => {
                        entry.total += r.total;
                        entry.count += 1;
                    }
                    None => report.categories.push(CategoryTotal {
                        categoria: r.categoria.clone(),
                        total: r.total,
                        count: 1,
                    }),
                }
            }
            SaleRecord::Itemized(_) => report.unavailable += 1,
            SaleRecord::Unrecognized => {}
        }
    }

    report
}

// =============================================================================
// Monthly series / summary
// =============================================================================

/// One bar group of the monthly chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub mes: String,
    pub ventas: f64,
    pub gastos: f64,
    pub ganancia: f64,
}

/// Sales vs. expenses per month, ascending over every month present in
/// either list.
pub fn monthly_series(records: &[SaleRecord], expenses: &[Expense]) -> Vec<MonthlyPoint> {
    let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for record in records {
        if matches!(record, SaleRecord::Unrecognized) {
            continue;
        }
        if let Some(key) = record.month_key() {
            buckets.entry(key).or_default().0 += record.amount();
        }
    }

    for expense in expenses {
        buckets.entry(expense.month_key()).or_default().1 += expense.amount;
    }

    buckets
        .into_iter()
        .map(|(mes, (ventas, gastos))| MonthlyPoint {
            mes,
            ventas,
            gastos,
            ganancia: ventas - gastos,
        })
        .collect()
}

/// The results summary card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Summary {
    pub total_sales: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    #[ts(type = "number")]
    pub transactions: usize,
}

pub fn summarize(records: &[SaleRecord], expenses: &[Expense]) -> Summary {
    let total_sales: f64 = records.iter().map(SaleRecord::amount).sum();
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();

    Summary {
        total_sales,
        total_expenses,
        net_profit: total_sales - total_expenses,
        transactions: records
            .iter()
            .filter(|r| !matches!(r, SaleRecord::Unrecognized))
            .count(),
    }
}
