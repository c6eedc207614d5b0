//! Map spreadsheet rows to product records
//!
//! Every field is read through the configured column name, missing cells
//! read as empty and all text is trimmed. A row missing an identifying
//! field is skipped, never written.

use std::fmt;

use serde_json::{Map, Value};

use crate::api::{Document, FieldValue, StorePath};
use crate::config::ColumnMap;
use crate::source::RawRow;

/// Stored field names
pub mod fields {
    pub const DESCRIPTION: &str = "descricao";
    pub const UNIT: &str = "unidade";
    /// Barcode under a Realtime Database product node
    pub const BARCODE_NODE: &str = "codBar";
    /// Barcode on a Firestore product document
    pub const BARCODE_DOC: &str = "gtin";
    pub const SKU: &str = "sku";
    pub const BRAND: &str = "marca";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// Why a row was not written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipReason {
    pub row_index: usize,
    /// Identifying fields that were empty, by column name
    pub missing: Vec<String>,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing {}", self.missing.join(" and "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
    Valid(T),
    Skipped(SkipReason),
}

impl<T> RowOutcome<T> {
    #[cfg(test)]
    pub fn valid(self) -> Option<T> {
        match self {
            RowOutcome::Valid(record) => Some(record),
            RowOutcome::Skipped(_) => None,
        }
    }
}

/// Field update for one product node in the Realtime Database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPatch {
    pub row_index: usize,
    /// Brand, lower-cased so the same brand always lands in one bucket
    pub brand_key: String,
    /// SKU exactly as in the sheet (trimmed)
    pub sku_key: String,
    pub description: String,
    pub unit: String,
    pub barcode: String,
}

impl ProductPatch {
    pub fn path(&self) -> StorePath {
        StorePath::new([self.brand_key.as_str(), self.sku_key.as_str()])
    }

    /// Only the fields this import owns; stock and status fields stored
    /// next to them are never part of the payload.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(fields::DESCRIPTION.into(), Value::String(self.description.clone()));
        payload.insert(fields::UNIT.into(), Value::String(self.unit.clone()));
        payload.insert(fields::BARCODE_NODE.into(), Value::String(self.barcode.clone()));
        payload
    }
}

/// Merge upsert for one product document in Firestore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDocument {
    pub row_index: usize,
    pub id: String,
    pub sku: String,
    pub description: String,
    pub unit: String,
    pub barcode: String,
    /// Original case; `None` when the cell is blank
    pub brand: Option<String>,
}

impl ProductDocument {
    pub fn fields(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(fields::SKU.into(), FieldValue::from(self.sku.as_str()));
        doc.insert(fields::DESCRIPTION.into(), FieldValue::from(self.description.as_str()));
        doc.insert(fields::UNIT.into(), FieldValue::from(self.unit.as_str()));
        doc.insert(fields::BARCODE_DOC.into(), FieldValue::from(self.barcode.as_str()));
        if let Some(brand) = &self.brand {
            doc.insert(fields::BRAND.into(), FieldValue::from(brand.as_str()));
        }
        doc.insert(fields::UPDATED_AT.into(), FieldValue::ServerTimestamp);
        doc
    }
}

fn require(row: &RawRow, required: &[(&str, &str)]) -> Result<(), SkipReason> {
    let missing: Vec<String> = required
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(column, _)| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SkipReason {
            row_index: row.index(),
            missing,
        })
    }
}

/// Map a row for the Realtime Database import (brand and SKU required)
pub fn map_patch_row(row: &RawRow, columns: &ColumnMap) -> RowOutcome<ProductPatch> {
    let brand = row.text(&columns.brand);
    let sku = row.text(&columns.sku);

    if let Err(reason) = require(
        row,
        &[(columns.brand.as_str(), brand.as_str()), (columns.sku.as_str(), sku.as_str())],
    ) {
        return RowOutcome::Skipped(reason);
    }

    RowOutcome::Valid(ProductPatch {
        row_index: row.index(),
        brand_key: brand.to_lowercase(),
        sku_key: sku,
        description: row.text(&columns.description),
        unit: row.text(&columns.unit),
        barcode: row.text(&columns.barcode),
    })
}

/// Map a row for the Firestore import (id and SKU required)
pub fn map_document_row(row: &RawRow, columns: &ColumnMap) -> RowOutcome<ProductDocument> {
    let id = row.text(&columns.id);
    let sku = row.text(&columns.sku);

    if let Err(reason) = require(
        row,
        &[(columns.id.as_str(), id.as_str()), (columns.sku.as_str(), sku.as_str())],
    ) {
        return RowOutcome::Skipped(reason);
    }

    let brand = row.text(&columns.brand);

    RowOutcome::Valid(ProductDocument {
        row_index: row.index(),
        id,
        sku,
        description: row.text(&columns.description),
        unit: row.text(&columns.unit),
        barcode: row.text(&columns.barcode),
        brand: (!brand.is_empty()).then_some(brand),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CellValue;
    use serde_json::json;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::from_pairs(1, pairs.iter().copied())
    }

    #[test]
    fn test_patch_end_to_end_example() {
        let row = row(&[
            ("Marca", "Golgran"),
            ("Código (SKU)", "44-1"),
            ("Descrição", "Resina X"),
            ("Unidade", "un"),
            ("GTIN/EAN", "7891234567890"),
        ]);

        let patch = map_patch_row(&row, &ColumnMap::default()).valid().unwrap();
        assert_eq!(patch.path().to_string(), "golgran/44-1");
        assert_eq!(
            Value::Object(patch.payload()),
            json!({ "descricao": "Resina X", "unidade": "un", "codBar": "7891234567890" })
        );
    }

    #[test]
    fn test_brand_case_normalization() {
        for brand in ["GOLGRAN", " Golgran ", "golgran"] {
            let row = row(&[("Marca", brand), ("Código (SKU)", "1")]);
            let patch = map_patch_row(&row, &ColumnMap::default()).valid().unwrap();
            assert_eq!(patch.brand_key, "golgran");
        }
    }

    #[test]
    fn test_sku_keeps_case_but_is_trimmed() {
        let row = row(&[("Marca", "3M"), ("Código (SKU)", "  AbC-9 ")]);
        let patch = map_patch_row(&row, &ColumnMap::default()).valid().unwrap();
        assert_eq!(patch.sku_key, "AbC-9");
        assert_eq!(patch.brand_key, "3m");
    }

    #[test]
    fn test_numeric_cells_render_as_text() {
        let row = RawRow::from_pairs(
            4,
            [
                ("Marca", CellValue::from("Golgran")),
                ("Código (SKU)", CellValue::Float(441.0)),
                ("GTIN/EAN", CellValue::Float(7891234567890.0)),
            ],
        );
        let patch = map_patch_row(&row, &ColumnMap::default()).valid().unwrap();
        assert_eq!(patch.sku_key, "441");
        assert_eq!(patch.barcode, "7891234567890");
        assert_eq!(patch.row_index, 4);
        assert_eq!(patch.description, "");
    }

    #[test]
    fn test_patch_requires_brand_and_sku() {
        let outcome = map_patch_row(
            &row(&[("Marca", "   "), ("Código (SKU)", "")]),
            &ColumnMap::default(),
        );
        match outcome {
            RowOutcome::Skipped(reason) => {
                assert_eq!(reason.missing, vec!["Marca", "Código (SKU)"]);
                assert_eq!(reason.to_string(), "missing Marca and Código (SKU)");
            }
            RowOutcome::Valid(_) => panic!("row without brand or SKU must be skipped"),
        }

        let outcome = map_patch_row(&row(&[("Código (SKU)", "44-1")]), &ColumnMap::default());
        assert!(matches!(outcome, RowOutcome::Skipped(ref r) if r.missing == vec!["Marca"]));
    }

    #[test]
    fn test_document_end_to_end_example() {
        let row = row(&[
            ("ID", "p001"),
            ("Código (SKU)", "44-1"),
            ("Descrição", "Resina X"),
            ("Unidade", "un"),
            ("GTIN/EAN", "7891234567890"),
        ]);

        let doc = map_document_row(&row, &ColumnMap::default()).valid().unwrap();
        assert_eq!(doc.id, "p001");

        let fields = doc.fields();
        assert_eq!(
            fields.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["descricao", "gtin", "sku", "unidade", "updatedAt"]
        );
        assert_eq!(fields["sku"], FieldValue::from("44-1"));
        assert_eq!(fields["updatedAt"], FieldValue::ServerTimestamp);
        assert!(!fields.contains_key("marca"));
    }

    #[test]
    fn test_document_brand_kept_in_original_case() {
        let row = row(&[("ID", "p1"), ("Código (SKU)", "1"), ("Marca", " GolGran ")]);
        let doc = map_document_row(&row, &ColumnMap::default()).valid().unwrap();
        assert_eq!(doc.brand.as_deref(), Some("GolGran"));
        assert_eq!(doc.fields()["marca"], FieldValue::from("GolGran"));
    }

    #[test]
    fn test_document_requires_id_and_sku() {
        let outcome = map_document_row(
            &row(&[("ID", " "), ("Código (SKU)", "44-1"), ("Marca", "Golgran")]),
            &ColumnMap::default(),
        );
        assert!(matches!(outcome, RowOutcome::Skipped(ref r) if r.missing == vec!["ID"]));

        for sku in ["", "   "] {
            let outcome = map_document_row(
                &row(&[("ID", "p001"), ("Código (SKU)", sku), ("Marca", "Golgran")]),
                &ColumnMap::default(),
            );
            assert!(
                matches!(outcome, RowOutcome::Skipped(ref r) if r.missing == vec!["Código (SKU)"])
            );
        }

        let outcome = map_document_row(&row(&[("Marca", "Golgran")]), &ColumnMap::default());
        assert!(
            matches!(outcome, RowOutcome::Skipped(ref r) if r.missing == vec!["ID", "Código (SKU)"])
        );
    }

    #[test]
    fn test_numeric_zero_sku_is_skipped() {
        let row = RawRow::from_pairs(
            4,
            [
                ("Marca", CellValue::from("Golgran")),
                ("Código (SKU)", CellValue::Int(0)),
                ("ID", CellValue::from("p004")),
            ],
        );

        let outcome = map_patch_row(&row, &ColumnMap::default());
        assert!(matches!(outcome, RowOutcome::Skipped(ref r) if r.missing == vec!["Código (SKU)"]));

        let outcome = map_document_row(&row, &ColumnMap::default());
        assert!(matches!(outcome, RowOutcome::Skipped(ref r) if r.row_index == 4));
    }

    #[test]
    fn test_custom_column_names() {
        let columns = ColumnMap {
            brand: "Brand".into(),
            sku: "SKU".into(),
            ..ColumnMap::default()
        };
        let row = row(&[("Brand", "ACME"), ("SKU", "x1")]);
        let patch = map_patch_row(&row, &columns).valid().unwrap();
        assert_eq!(patch.path().to_string(), "acme/x1");
    }
}
