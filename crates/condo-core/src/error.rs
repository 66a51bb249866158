use std::path::PathBuf;
use std::process::ExitStatus;

/// Alias for `Result<T, CondoError>`.
pub type CondoResult<T> = Result<T, CondoError>;

/// Errors that can occur when loading, editing, or saving a condo.
#[derive(Debug, thiserror::Error)]
pub enum CondoError {
    /// An entity was built with neither an item nor a properties section.
    #[error("entity has neither an item nor a properties section")]
    EmptyEntity,

    /// An operation needs the item section, but the entity only has properties.
    #[error("cannot {operation} on properties-only object \"{name}\"")]
    MissingItem {
        /// Name of the properties-only entity.
        name: String,
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// A spatial selector was handed an entity that has no world position.
    #[error("object \"{0}\" has no position; filter to items before spatial selection")]
    MissingPosition(String),

    /// No entity in the save carries a group tag.
    #[error("save contains no grouped objects")]
    NoGroups,

    /// An aggregate (such as a centroid) was requested over an empty selection.
    #[error("selection is empty")]
    EmptySelection,

    /// The JSON document does not have the shape the converter produces.
    #[error("malformed save document: {0}")]
    MalformedDocument(String),

    /// A selector expression or pattern could not be parsed.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// A connection record is missing one of its required fields.
    #[error("invalid item connection: {0}")]
    InvalidConnection(String),

    /// The external save converter exited unsuccessfully.
    #[error("converter failed ({status}): {command}")]
    ConverterFailed {
        /// Exit status reported by the converter process.
        status: ExitStatus,
        /// The command line that was run.
        command: String,
    },

    /// The external save converter binary could not be started.
    #[error("converter not found at {}", .0.display())]
    ConverterNotFound(PathBuf),

    /// Reading or writing a file failed.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// The file that was being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CondoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
