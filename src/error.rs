use crate::engine::catalog::QualifiedColumn;
use std::env::VarError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(value: E) -> Self {
        Error(Box::new(value.into()))
    }
}

#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// A table name outside the fixed schema reached us through the string
    /// boundary (CLI input or JSON).
    #[error("Unknown table: `{0}`")]
    UnknownTable(String),
    /// An editor operation used an index that no longer points at a clause.
    #[error("No {list} clause at position {index} (the list has {len})")]
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },
    /// Filters and aggregations default to the first selected column, so they
    /// cannot be added while nothing is selected.
    #[error("No columns are selected, select at least one first")]
    EmptySelection,
    /// A clause still points at a column that is no longer selected. Toggling
    /// tables does not rewrite clauses, so this is caught when the draft is
    /// normalized.
    #[error("`{0}` is referenced by a clause but no longer selected")]
    DanglingColumnReference(QualifiedColumn),
    /// A column was toggled on even though no active table exposes it.
    #[error("`{0}` is not exposed by any active table")]
    ForeignColumn(QualifiedColumn),
    /// The execution service answered with a non-success status.
    #[error("Query execution failed with status {status}:\n{body}")]
    RequestFailed { status: u16, body: String },
    /// The execution service could not be reached at all.
    #[error("Could not reach the execution service:\n{0}")]
    TransportError(String),
    #[error("Internal error:\n{0}")]
    InternalError(#[from] InternalError),
    #[error("Could not find environment variable: \n{0}")]
    EnvVarError(#[from] VarError),
    #[error("IO error:\n{0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error:\n{0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Error reading data from stdin")]
    DialogueError(#[from] dialoguer::Error),
}

#[derive(Error, Debug)]
pub struct InternalError(pub String);

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error {
    pub fn into_inner(self) -> ErrorKind {
        *self.0
    }
}
