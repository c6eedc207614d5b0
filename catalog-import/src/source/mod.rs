//! Spreadsheet row source
//!
//! Loads one sheet of a workbook (or a CSV file) into an ordered list of
//! rows keyed by column header, the shape the import pipelines consume.

mod cell;
mod error;
mod reader;

pub use cell::CellValue;
pub use error::SourceError;
pub use reader::{RawRow, SheetRows, read_sheet};
