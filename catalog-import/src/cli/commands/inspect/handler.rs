//! Show what a sheet looks like to the importer without writing anything

use anyhow::Result;
use colored::*;
use std::path::Path;

use super::InspectArgs;
use crate::config::{ColumnMap, FileConfig};
use crate::source::{SheetRows, read_sheet};

pub fn handle_inspect_command(args: InspectArgs, config_path: Option<&Path>) -> Result<()> {
    let file_config = FileConfig::load(config_path)?;
    let config = args.source.import_config(&file_config);

    let sheet = read_sheet(&config.source_path, config.sheet.as_deref())?;

    println!("File:  {}", config.source_path.display().to_string().cyan());
    println!("Sheet: {} | {} product rows", sheet.sheet_name.bold(), sheet.len());
    println!();
    println!("Columns:");
    for (i, header) in sheet.headers.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, header);
    }
    println!();

    println!("Column map:");
    for (field, column, found) in column_checks(&sheet, &config.column_map) {
        let status = if found { "found".green() } else { "missing".red() };
        println!("  {:<12} {:<20} {}", field, format!("\"{}\"", column), status);
    }

    Ok(())
}

/// `(field, configured column, present in header row)` for every mapped field
fn column_checks<'a>(sheet: &SheetRows, columns: &'a ColumnMap) -> Vec<(&'static str, &'a str, bool)> {
    [
        ("brand", columns.brand.as_str()),
        ("sku", columns.sku.as_str()),
        ("description", columns.description.as_str()),
        ("unit", columns.unit.as_str()),
        ("barcode", columns.barcode.as_str()),
        ("id", columns.id.as_str()),
    ]
    .into_iter()
    .map(|(field, column)| (field, column, sheet.headers.iter().any(|h| h == column)))
    .collect()
}
