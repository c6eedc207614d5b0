//! Read the rows of one sheet
//!
//! The first row is the header row. Data rows become [`RawRow`]s keyed by
//! header name; rows whose cells are all empty are dropped, and the
//! remaining rows are numbered from 1 in sheet order.
//!
//! Header naming:
//! - blank headers become `__EMPTY`, `__EMPTY_1`, ...
//! - repeated headers get `_1`, `_2`, ... suffixes in order of appearance

use std::collections::{HashMap, HashSet};
use std::path::Path;

use calamine::{Reader, open_workbook_auto};

use super::{CellValue, SourceError};

/// One data row of a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    index: usize,
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new(index: usize, cells: HashMap<String, CellValue>) -> Self {
        Self { index, cells }
    }

    /// Build a row from `(header, value)` pairs
    #[cfg(test)]
    pub fn from_pairs<K, V, I>(index: usize, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { index, cells }
    }

    /// 1-based position among the sheet's data rows
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Cell text under `column`, trimmed
    ///
    /// Empty when the column is absent or the cell is unset (see
    /// [`CellValue::is_unset`]).
    pub fn text(&self, column: &str) -> String {
        self.cells
            .get(column)
            .filter(|cell| !cell.is_unset())
            .map(|cell| cell.to_text().trim().to_string())
            .unwrap_or_default()
    }
}

/// Rows loaded from one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRows {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SheetRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fail with [`SourceError::Empty`] when there are no data rows
    pub fn require_rows(self) -> Result<Self, SourceError> {
        if self.is_empty() {
            return Err(SourceError::Empty {
                sheet: self.sheet_name,
            });
        }
        Ok(self)
    }

    /// Of the given column names, those that no header matches exactly
    pub fn missing_columns<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        columns
            .into_iter()
            .filter(|c| !self.headers.iter().any(|h| h == c))
            .map(|c| c.to_string())
            .collect()
    }
}

/// Read one sheet of `path`
///
/// `.csv` files are read with the `csv` crate and named after the file stem;
/// every other extension goes through calamine (xlsx, xlsm, xlsb, xls, ods).
/// Without `sheet`, the first sheet of the workbook is used.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<SheetRows, SourceError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let (sheet_name, grid) = if is_csv {
        read_csv_grid(path)?
    } else {
        read_workbook_grid(path, sheet)?
    };

    Ok(build_sheet(sheet_name, grid))
}

fn read_workbook_grid(
    path: &Path,
    sheet: Option<&str>,
) -> Result<(String, Vec<Vec<CellValue>>), SourceError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| SourceError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(SourceError::SheetNotFound {
                    sheet: name.to_string(),
                    available: sheet_names,
                });
            }
            name.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| SourceError::NoSheets {
                path: path.to_path_buf(),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SourceError::Read {
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(CellValue::from_data).collect())
        .collect();

    Ok((sheet_name, grid))
}

fn read_csv_grid(path: &Path) -> Result<(String, Vec<Vec<CellValue>>), SourceError> {
    let sheet_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("csv")
        .to_string();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SourceError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SourceError::Read {
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;
        grid.push(record.iter().map(CellValue::from_field).collect());
    }

    Ok((sheet_name, grid))
}

/// Turn a cell grid (header row first) into keyed rows
fn build_sheet(sheet_name: String, grid: Vec<Vec<CellValue>>) -> SheetRows {
    let mut grid = grid.into_iter();

    let headers = match grid.next() {
        Some(header_row) => normalize_headers(header_row.iter().map(|c| c.to_text())),
        None => Vec::new(),
    };

    let rows = grid
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .enumerate()
        .map(|(i, cells)| {
            let mut map = HashMap::new();
            for (col, header) in headers.iter().enumerate() {
                let cell = cells.get(col).cloned().unwrap_or(CellValue::Empty);
                map.insert(header.clone(), cell);
            }
            RawRow::new(i + 1, map)
        })
        .collect();

    SheetRows {
        sheet_name,
        headers,
        rows,
    }
}

fn normalize_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut used = HashSet::new();
    let mut headers = Vec::new();

    for header in raw {
        let base = if header.is_empty() {
            "__EMPTY".to_string()
        } else {
            header
        };

        let mut name = base.clone();
        let mut suffix = 0;
        while used.contains(&name) {
            suffix += 1;
            name = format!("{}_{}", base, suffix);
        }

        used.insert(name.clone());
        headers.push(name);
    }

    headers
}
