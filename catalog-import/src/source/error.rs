use std::path::PathBuf;

/// Failure to produce rows from a source file
#[derive(Debug)]
pub enum SourceError {
    /// The file could not be opened or is not a readable spreadsheet
    Open { path: PathBuf, message: String },
    /// The workbook contains no sheets at all
    NoSheets { path: PathBuf },
    /// The requested sheet does not exist
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },
    /// A sheet was found but its contents could not be read
    Read { sheet: String, message: String },
    /// The sheet has a header row (or nothing) but no data rows
    Empty { sheet: String },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Open { path, message } => {
                write!(f, "Failed to open {}: {}", path.display(), message)
            }
            SourceError::NoSheets { path } => {
                write!(f, "{} contains no sheets", path.display())
            }
            SourceError::SheetNotFound { sheet, available } => {
                write!(
                    f,
                    "Sheet '{}' not found (available: {})",
                    sheet,
                    available.join(", ")
                )
            }
            SourceError::Read { sheet, message } => {
                write!(f, "Failed to read sheet '{}': {}", sheet, message)
            }
            SourceError::Empty { sheet } => {
                write!(f, "No rows found in sheet '{}'", sheet)
            }
        }
    }
}

impl std::error::Error for SourceError {}
