//! Session-scoped expense book.
//!
//! Expenses are never sent to the API; they live as long as the session and
//! feed the monthly chart and the results summary.

use pdv_core::report::{monthly_series, summarize, MonthlyPoint, SaleRecord, Summary};
use pdv_core::validation::{validate_calendar_date, validate_positive_amount};
use pdv_core::{Expense, ExpenseCategory, ValidationError};
use tracing::debug;

/// Registered expenses, newest first.
#[derive(Debug, Clone, Default)]
pub struct ExpenseBook {
    expenses: Vec<Expense>,
}

impl ExpenseBook {
    pub fn new() -> Self {
        ExpenseBook::default()
    }

    /// Validates the raw form fields and registers the expense.
    ///
    /// Checks run in form order: name, category, amount, date.
    pub fn register(
        &mut self,
        nombre: &str,
        categoria: &str,
        monto: f64,
        fecha: &str,
    ) -> Result<&Expense, ValidationError> {
        if nombre.trim().is_empty() {
            return Err(ValidationError::required("nombre"));
        }
        if categoria.trim().is_empty() {
            return Err(ValidationError::required("categoria"));
        }
        let category: ExpenseCategory = categoria.parse()?;
        validate_positive_amount("monto", monto)?;
        let date = validate_calendar_date("fecha", fecha)?;
        let expense = Expense::new(nombre, category, monto, date)?;

        debug!(category = %expense.category, amount = expense.amount, "Expense registered");
        self.expenses.insert(0, expense);
        Ok(&self.expenses[0])
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Total per category, in [`ExpenseCategory::ALL`] order, skipping
    /// categories with no expenses.
    pub fn totals_by_category(&self) -> Vec<(ExpenseCategory, f64)> {
        ExpenseCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let amounts: Vec<f64> = self
                    .expenses
                    .iter()
                    .filter(|e| e.category == category)
                    .map(|e| e.amount)
                    .collect();
                (!amounts.is_empty()).then(|| (category, amounts.iter().sum::<f64>()))
            })
            .collect()
    }

    /// Sales vs. these expenses per month.
    pub fn monthly_series(&self, records: &[SaleRecord]) -> Vec<MonthlyPoint> {
        monthly_series(records, &self.expenses)
    }

    /// Results summary card for `records` against these expenses.
    pub fn summary(&self, records: &[SaleRecord]) -> Summary {
        summarize(records, &self.expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_validates_in_form_order() {
        let mut book = ExpenseBook::new();

        assert_eq!(
            book.register("", "", 0.0, "").unwrap_err(),
            ValidationError::required("nombre")
        );
        assert_eq!(
            book.register("Luz", "", 0.0, "").unwrap_err(),
            ValidationError::required("categoria")
        );
        assert!(matches!(
            book.register("Luz", "Viajes", 10.0, "2025-09-01").unwrap_err(),
            ValidationError::NotAllowed { .. }
        ));
        assert!(matches!(
            book.register("Luz", "Servicios", 0.0, "").unwrap_err(),
            ValidationError::MustBePositive { .. }
        ));
        assert_eq!(
            book.register("Luz", "Servicios", 300.0, "").unwrap_err(),
            ValidationError::required("fecha")
        );
        assert!(book.is_empty());
    }

    #[test]
    fn test_register_prepends() {
        let mut book = ExpenseBook::new();
        book.register("Luz", "Servicios", 300.0, "2025-09-01").unwrap();
        book.register("Renta local", "renta", 4000.0, "2025-09-02").unwrap();

        assert_eq!(book.len(), 2);
        assert_eq!(book.expenses()[0].name, "Renta local");
        assert_eq!(book.total(), 4300.0);
        assert_eq!(
            book.totals_by_category(),
            vec![(ExpenseCategory::Utilities, 300.0), (ExpenseCategory::Rent, 4000.0)]
        );
    }

    #[test]
    fn test_monthly_series_and_summary() {
        let mut book = ExpenseBook::new();
        book.register("Renta", "Renta", 300.0, "2025-09-01").unwrap();

        let records = SaleRecord::classify_all(&[
            json!({ "items": [], "total": 1000.0, "date": "5/9/2025, 10:00:00 a.m." }),
        ]);

        let series = book.monthly_series(&records);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].ganancia, 700.0);

        let summary = book.summary(&records);
        assert_eq!(summary.net_profit, 700.0);
        assert_eq!(summary.transactions, 1);
    }
}
