use std::fmt;

use crate::adapters::SourceInfo;

/// Result alias that carries the custom [`TableError`] type.
pub type Result<T> = std::result::Result<T, TableError>;

/// Common error type for the core crate.
///
/// Configuration and conflict errors are raised by the builder and are final
/// for that build attempt. Access errors are raised when reading a finished
/// table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Column name cannot be empty")]
    EmptyColumnName,

    #[error("Column '{name}' already exists")]
    DuplicateColumn { name: String },

    #[error("Row selector is already set; build the table before setting another one")]
    RowSelectorAlreadySet,

    #[error("Row selector must be set before building")]
    MissingRowSelector,

    #[error("At least one column must be added before building")]
    NoColumns,

    #[error("Builder has already produced a table; set a new row selector to reuse it")]
    BuilderConsumed,

    /// More than one distinct multi-sample source feeds the table's columns.
    #[error(
        "Cannot build TableView: multiple multi-sample sources detected ({}). \
         Entity expansion is undefined when two independently multi-valued sources \
         must be interleaved. Please ensure only one multi-sample source contributes \
         expansion.",
        SourceList(.sources)
    )]
    MultipleMultiSampleSources { sources: Vec<SourceInfo> },

    #[error("Column '{name}' not found in table")]
    UnknownColumn { name: String },

    #[error("Type mismatch for column '{column}': expected {expected}, column holds {actual}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Row {row} is out of range for column '{column}' ({row_count} rows)")]
    RowOutOfRange {
        column: String,
        row: usize,
        row_count: usize,
    },

    #[error("Invalid sampling configuration: {0}")]
    InvalidSampling(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl TableError {
    /// Names of the offending sources when this is an expansion conflict.
    pub fn conflicting_sources(&self) -> Option<&[SourceInfo]> {
        match self {
            Self::MultipleMultiSampleSources { sources } => Some(sources),
            _ => None,
        }
    }
}

struct SourceList<'a>(&'a [SourceInfo]);

impl fmt::Display for SourceList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, source) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}' [{}]", source.name, source.id)?;
        }
        Ok(())
    }
}
