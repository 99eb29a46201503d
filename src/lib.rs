pub mod cache;
pub mod context;
mod engine;
mod error;

/// Building and normalizing report drafts.
pub mod report {
    pub use crate::engine::catalog::{all_tables, columns_of, QualifiedColumn, TableName};
    pub use crate::engine::{
        normalize, AggregateKind, AggregationClause, AggregationEdit, AggregationKeying,
        AggregationSpec, FilterClause, FilterEdit, LogicOp, NormalizeOptions, Operator,
        QueryRequest, ReportDraft,
    };
}

/// Talking to the execution service.
pub mod gateway {
    pub use crate::engine::{
        CellValue, Dispatcher, ExecutionGateway, HttpGateway, Row, SubmissionOutcome,
        DEFAULT_BASE_URL, EXECUTE_PATH,
    };
}

/// The local stand-in execution service.
pub mod sandbox {
    pub use crate::engine::sandbox::{execute_request, router, serve};
}

pub use engine::{render_draft, render_rows};
pub use error::{Error, ErrorKind, InternalError};
