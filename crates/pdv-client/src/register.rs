//! Quick single-line sale register.
//!
//! Produces [`LegacySale`] records (`producto`, `categoria`, ...) kept in the
//! session only. They are the one record shape that carries a category, so
//! the category report is built from them.

use pdv_core::report::{category_report, CategoryReport, SaleRecord};
use pdv_core::{LegacySale, ValidationError};
use tracing::debug;

/// Registered quick sales, newest first.
#[derive(Debug, Clone, Default)]
pub struct SaleRegister {
    sales: Vec<LegacySale>,
    last_id: i64,
}

impl SaleRegister {
    pub fn new() -> Self {
        SaleRegister::default()
    }

    /// Validates the form and registers the sale (`total = cantidad × precio`).
    ///
    /// Fields are checked in form order: producto, categoria, cantidad,
    /// precio, fecha.
    pub fn register(
        &mut self,
        producto: &str,
        categoria: &str,
        cantidad: i64,
        precio_unitario: f64,
        fecha: &str,
    ) -> Result<&LegacySale, ValidationError> {
        let sale = LegacySale::new(
            self.last_id + 1,
            producto,
            categoria,
            cantidad,
            precio_unitario,
            fecha,
        )?;

        self.last_id = sale.id;
        debug!(id = sale.id, categoria = %sale.categoria, total = sale.total, "Quick sale registered");
        self.sales.insert(0, sale);
        Ok(&self.sales[0])
    }

    pub fn sales(&self) -> &[LegacySale] {
        &self.sales
    }

    /// The register as aggregator records.
    pub fn records(&self) -> Vec<SaleRecord> {
        self.sales.iter().map(SaleRecord::from).collect()
    }

    pub fn category_report(&self) -> CategoryReport {
        category_report(&self.records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_category_report() {
        let mut register = SaleRegister::new();
        register.register("Coca Cola", "Bebidas", 2, 15.0, "2025-09-01").unwrap();
        register.register("Sabritas", "Snacks", 1, 18.0, "2025-09-01").unwrap();
        register.register("Agua", "Bebidas", 3, 12.0, "2025-09-02").unwrap();

        assert_eq!(register.sales()[0].producto, "Agua");
        assert_eq!(register.sales()[0].id, 3);

        let report = register.category_report();
        assert_eq!(report.unavailable, 0);
        assert_eq!(report.categories[0].categoria, "Bebidas");
        assert_eq!(report.categories[0].total, 66.0);
        assert_eq!(report.categories[0].count, 2);
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let mut register = SaleRegister::new();
        assert!(register.register("", "Bebidas", 1, 1.0, "2025-09-01").is_err());
        assert!(register.register("Pan", "Abarrotes", 1, 1.0, "ayer").is_err());
        assert!(register.register("Pan", "Abarrotes", 1, 0.0, "2025-09-01").is_err());
        assert!(register.sales().is_empty());
    }

    #[test]
    fn test_register_reports_first_bad_field_in_form_order() {
        let mut register = SaleRegister::new();
        assert_eq!(
            register.register("", "Bebidas", 1, 1.0, "ayer").unwrap_err(),
            ValidationError::required("producto")
        );
        assert!(matches!(
            register.register("Pan", "Abarrotes", 0, 1.0, "").unwrap_err(),
            ValidationError::MustBePositive { .. }
        ));
        assert!(matches!(
            register.register("Pan", "Abarrotes", 1, 1.0, "ayer").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }
}
