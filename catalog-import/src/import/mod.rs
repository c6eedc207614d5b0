//! Spreadsheet import pipelines
//!
//! Both pipelines make one forward pass:
//! rows are read, mapped and validated, written, and counted.
//!
//! - Realtime Database: one partial update per row at `<brand>/<sku>`
//! - Firestore: merge upserts keyed by document id, committed in atomic batches
//!
//! The Realtime pipeline lower-cases the brand for the path; the Firestore
//! pipeline keeps every value in its original case.

pub mod dispatch;
pub mod mapper;
pub mod queue;
pub mod report;

pub use mapper::{ProductDocument, ProductPatch, RowOutcome, SkipReason};
pub use report::{Pipeline, RunReport, RunSummary};

use anyhow::Result;
use colored::*;

use crate::api::{DocumentStore, PathStore};
use crate::config::{ColumnMap, ImportConfig};
use crate::source::{SheetRows, SourceError, read_sheet};

/// Read the configured sheet and echo what was found
///
/// Fails with [`SourceError::Empty`] when the sheet has no data rows.
pub fn load_source(config: &ImportConfig, expected: &[&str]) -> Result<SheetRows, SourceError> {
    println!(
        "Reading sheet: {}",
        config.source_path.display().to_string().cyan()
    );

    let sheet = read_sheet(&config.source_path, config.sheet.as_deref())?.require_rows()?;

    println!(
        "Sheet: {} | {} product rows",
        sheet.sheet_name.bold(),
        sheet.len()
    );
    println!("Detected columns: {:?}", sheet.headers);

    let missing = sheet.missing_columns(expected.iter().copied());
    if !missing.is_empty() {
        log::warn!("configured columns not found in sheet: {:?}", missing);
        println!(
            "{} configured columns not found in the header row: {:?}",
            "Warning:".yellow().bold(),
            missing
        );
        println!("Adjust [columns] in the config file if the sheet uses different names.");
    }
    println!();

    Ok(sheet)
}

/// Import `config.source_path` into a Realtime Database
pub async fn run_realtime_import(config: &ImportConfig, store: &dyn PathStore) -> Result<RunSummary> {
    let sheet = load_source(config, &config.column_map.realtime_columns())?;
    Ok(import_patches(&sheet, &config.column_map, store).await)
}

/// Write every valid row of `sheet` as a partial update, in row order
pub async fn import_patches(
    sheet: &SheetRows,
    columns: &ColumnMap,
    store: &dyn PathStore,
) -> RunSummary {
    let outcomes = sheet
        .rows
        .iter()
        .map(|row| mapper::map_patch_row(row, columns))
        .collect();

    let mut report = RunReport::new(sheet.len());
    dispatch::dispatch_patches(outcomes, store, &mut report).await;
    report.finish()
}

/// Import `config.source_path` into a Firestore collection
pub async fn run_firestore_import(
    config: &ImportConfig,
    store: &dyn DocumentStore,
) -> Result<RunSummary> {
    config.validate()?;
    let sheet = load_source(config, &config.column_map.firestore_columns())?;
    Ok(import_documents(&sheet, config, store).await)
}

/// Upsert every valid row of `sheet` into `config.collection_name` in batches
pub async fn import_documents(
    sheet: &SheetRows,
    config: &ImportConfig,
    store: &dyn DocumentStore,
) -> RunSummary {
    let mut report = RunReport::new(sheet.len());
    let mut documents = Vec::new();

    for row in &sheet.rows {
        match mapper::map_document_row(row, &config.column_map) {
            RowOutcome::Valid(doc) => documents.push(doc),
            RowOutcome::Skipped(reason) => report.row_skipped(&reason),
        }
    }

    let batches = dispatch::build_batches(
        documents,
        &config.collection_name,
        config.batch_size,
        store.max_batch_size(),
    );
    dispatch::dispatch_batches(batches, store, &mut report).await;
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryDocumentStore, MemoryPathStore};
    use crate::source::RawRow;
    use rust_xlsxwriter::Workbook;
    use serde_json::json;

    fn sheet(rows: Vec<RawRow>) -> SheetRows {
        SheetRows {
            sheet_name: "Produtos".to_string(),
            headers: Vec::new(),
            rows,
        }
    }

    fn product_row(index: usize, brand: &str, sku: &str, barcode: &str) -> RawRow {
        RawRow::from_pairs(
            index,
            [
                ("Marca", brand),
                ("Código (SKU)", sku),
                ("Descrição", "Resina X"),
                ("Unidade", "un"),
                ("GTIN/EAN", barcode),
            ],
        )
    }

    fn document_rows(n: usize) -> Vec<RawRow> {
        (1..=n)
            .map(|i| {
                RawRow::from_pairs(
                    i,
                    [
                        ("ID", format!("p{:04}", i)),
                        ("Código (SKU)", format!("{}-1", i)),
                        ("Descrição", "Broca".to_string()),
                    ],
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_realtime_field_isolation() {
        let store = MemoryPathStore::with_data(json!({
            "golgran": {
                "44-1": { "estoque": 7, "statusContagem": "ok", "descricao": "velha" }
            }
        }));

        let rows = sheet(vec![product_row(1, "GOLGRAN", "44-1", "7891234567890")]);
        let summary = import_patches(&rows, &ColumnMap::default(), &store).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(
            store.get("golgran/44-1").unwrap(),
            json!({
                "estoque": 7,
                "statusContagem": "ok",
                "descricao": "Resina X",
                "unidade": "un",
                "codBar": "7891234567890"
            })
        );
    }

    #[tokio::test]
    async fn test_realtime_skips_and_failures_do_not_abort() {
        let store = MemoryPathStore::new().fail_on("golgran/2");
        let rows = sheet(vec![
            product_row(1, "Golgran", "1", ""),
            product_row(2, "", "9", ""),
            product_row(3, "Golgran", "2", ""),
            product_row(4, "Golgran", "  ", ""),
            product_row(5, "Golgran", "3", "789"),
        ]);

        let summary = import_patches(&rows, &ColumnMap::default(), &store).await;

        assert_eq!(
            summary,
            RunSummary {
                total_rows: 5,
                skipped: 2,
                succeeded: 2,
                failed: 1,
                batches_total: 0,
                batches_failed: 0,
            }
        );
        assert_eq!(store.write_count(), 2);
        assert!(store.get("golgran/1").is_some());
        assert!(store.get("golgran/2").is_none());
        assert_eq!(store.get("golgran/3/codBar").unwrap(), json!("789"));
    }

    #[tokio::test]
    async fn test_realtime_writes_one_at_a_time() {
        let store = MemoryPathStore::new();
        let rows = sheet((1..=20).map(|i| product_row(i, "acme", &i.to_string(), "")).collect());

        import_patches(&rows, &ColumnMap::default(), &store).await;

        assert_eq!(store.write_count(), 20);
        assert_eq!(store.peak_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_realtime_idempotent() {
        let store = MemoryPathStore::new();
        let rows = sheet(vec![
            product_row(1, "Golgran", "44-1", "1"),
            product_row(2, "golgran", "44-2", "2"),
        ]);

        import_patches(&rows, &ColumnMap::default(), &store).await;
        let first = store.snapshot();
        import_patches(&rows, &ColumnMap::default(), &store).await;

        assert_eq!(store.snapshot(), first);
    }

    #[tokio::test]
    async fn test_firestore_end_to_end_document() {
        let store = MemoryDocumentStore::new();
        store.seed(
            "produtos",
            "p001",
            json!({ "estoque": 4, "sku": "antigo" }).as_object().cloned().unwrap(),
        );

        let rows = sheet(vec![RawRow::from_pairs(
            1,
            [
                ("ID", "p001"),
                ("Código (SKU)", "44-1"),
                ("Descrição", "Resina X"),
                ("Unidade", "un"),
                ("GTIN/EAN", "7891234567890"),
            ],
        )]);

        let config = ImportConfig::new("produtos.xlsx");
        let summary = import_documents(&rows, &config, &store).await;
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.batches_total, 1);

        let doc = store.document("produtos", "p001").unwrap();
        assert_eq!(doc["estoque"], json!(4));
        assert_eq!(doc["sku"], json!("44-1"));
        assert_eq!(doc["descricao"], json!("Resina X"));
        assert_eq!(doc["unidade"], json!("un"));
        assert_eq!(doc["gtin"], json!("7891234567890"));
        assert!(doc["updatedAt"].is_string());
        assert!(!doc.contains_key("marca"));
    }

    #[tokio::test]
    async fn test_firestore_batches_and_partial_failure() {
        let store = MemoryDocumentStore::new().fail_commit(2);
        let mut rows = document_rows(1201);
        rows.push(RawRow::from_pairs(1202, [("ID", ""), ("Código (SKU)", "x")]));

        let config = ImportConfig::new("produtos.xlsx");
        let summary = import_documents(&sheet(rows), &config, &store).await;

        assert_eq!(store.commit_count(), 3);
        assert_eq!(store.peak_in_flight(), 1);
        assert_eq!(
            summary,
            RunSummary {
                total_rows: 1202,
                skipped: 1,
                succeeded: 701,
                failed: 500,
                batches_total: 3,
                batches_failed: 1,
            }
        );
        // Batch 2 held rows 501..=1000; batch 3 was still committed
        assert_eq!(store.document_count("produtos"), 701);
        assert!(store.document("produtos", "p0500").is_some());
        assert!(store.document("produtos", "p0501").is_none());
        assert!(store.document("produtos", "p1201").is_some());
    }

    #[tokio::test]
    async fn test_firestore_custom_collection_and_batch_size() {
        let store = MemoryDocumentStore::new();
        let mut config = ImportConfig::new("produtos.xlsx");
        config.collection_name = "catalogo".to_string();
        config.batch_size = 4;

        let summary = import_documents(&sheet(document_rows(10)), &config, &store).await;

        assert_eq!(summary.batches_total, 3);
        assert_eq!(store.commit_count(), 3);
        assert_eq!(store.document_count("catalogo"), 10);
        assert_eq!(store.document_count("produtos"), 0);
    }

    #[tokio::test]
    async fn test_firestore_idempotent_fields() {
        let store = MemoryDocumentStore::new();
        let config = ImportConfig::new("produtos.xlsx");
        let rows = sheet(document_rows(3));

        import_documents(&rows, &config, &store).await;
        let mut first = store.document("produtos", "p0002").unwrap();
        import_documents(&rows, &config, &store).await;
        let mut second = store.document("produtos", "p0002").unwrap();

        first.remove("updatedAt");
        second.remove("updatedAt");
        assert_eq!(first, second);
        assert_eq!(store.document_count("produtos"), 3);
    }

    #[tokio::test]
    async fn test_run_realtime_import_from_xlsx() {
        let path = std::env::temp_dir().join(format!("catalog-import-{}.xlsx", uuid::Uuid::new_v4()));
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col, header) in ["Marca", "Código (SKU)", "Descrição", "Unidade", "GTIN/EAN"]
            .iter()
            .enumerate()
        {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        worksheet.write_string(1, 0, "Golgran").unwrap();
        worksheet.write_string(1, 1, "44-1").unwrap();
        worksheet.write_string(1, 2, "Resina X").unwrap();
        worksheet.write_string(1, 3, "un").unwrap();
        worksheet.write_number(1, 4, 7891234567890.0).unwrap();
        workbook.save(&path).unwrap();

        let store = MemoryPathStore::new();
        let summary = run_realtime_import(&ImportConfig::new(&path), &store).await;
        std::fs::remove_file(&path).ok();

        let summary = summary.unwrap();
        assert_eq!(summary.total_rows, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(
            store.get("golgran/44-1").unwrap(),
            json!({ "descricao": "Resina X", "unidade": "un", "codBar": "7891234567890" })
        );
    }

    #[tokio::test]
    async fn test_empty_sheet_is_fatal() {
        let path = std::env::temp_dir().join(format!("catalog-import-{}.csv", uuid::Uuid::new_v4()));
        std::fs::write(&path, "ID,Código (SKU)\n").unwrap();

        let store = MemoryDocumentStore::new();
        let result = run_firestore_import(&ImportConfig::new(&path), &store).await;
        std::fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Empty { .. })
        ));
        assert_eq!(store.commit_count(), 0);
    }
}
