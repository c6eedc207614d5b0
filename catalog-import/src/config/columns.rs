//! Column-name dictionary
//!
//! Maps each product field to the exact header text used in the sheet.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMap {
    pub brand: String,
    pub sku: String,
    pub description: String,
    pub unit: String,
    pub barcode: String,
    /// Document identity column, only used by the Firestore import
    pub id: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            brand: "Marca".to_string(),
            sku: "Código (SKU)".to_string(),
            description: "Descrição".to_string(),
            unit: "Unidade".to_string(),
            barcode: "GTIN/EAN".to_string(),
            id: "ID".to_string(),
        }
    }
}

impl ColumnMap {
    /// Columns read by the Realtime Database import
    pub fn realtime_columns(&self) -> Vec<&str> {
        vec![
            self.brand.as_str(),
            self.sku.as_str(),
            self.description.as_str(),
            self.unit.as_str(),
            self.barcode.as_str(),
        ]
    }

    /// Columns read by the Firestore import
    pub fn firestore_columns(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.sku.as_str(),
            self.description.as_str(),
            self.unit.as_str(),
            self.barcode.as_str(),
            self.brand.as_str(),
        ]
    }
}
