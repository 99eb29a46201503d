pub mod catalog;
mod dispatch;
mod draft;
mod gateway;
mod normalize;
mod rendering;
mod rows;
/// A small local stand-in for the real execution service.
pub mod sandbox;

pub use dispatch::{Dispatcher, SubmissionOutcome};
pub use draft::{AggregationClause, AggregationEdit, FilterClause, FilterEdit, ReportDraft};
pub use gateway::{ExecutionGateway, HttpGateway, DEFAULT_BASE_URL, EXECUTE_PATH};
pub use normalize::{normalize, AggregationKeying, AggregationSpec, NormalizeOptions, QueryRequest};
pub use rendering::{render_draft, render_rows};
pub use rows::{CellValue, Row};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// How a filter clause chains to the one before it.
///
/// The first clause in a list carries one of these too, even though nothing
/// precedes it. It is stored and transmitted anyway; the execution service
/// ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LesserThan,
    #[serde(rename = "like")]
    Like,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Count,
    Avg,
    Sum,
    Min,
    Max,
}

impl LogicOp {
    pub const ALL: [LogicOp; 2] = [LogicOp::And, LogicOp::Or];
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::GreaterThan,
        Operator::LesserThan,
        Operator::Like,
    ];

    /// The longer spelling the dashboard used in its operator dropdown.
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Equals => "igual (=)",
            Operator::NotEquals => "diferente (!=)",
            Operator::GreaterThan => "maior (>)",
            Operator::LesserThan => "menor (<)",
            Operator::Like => "parecido (LIKE)",
        }
    }
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 5] = [
        AggregateKind::Count,
        AggregateKind::Avg,
        AggregateKind::Sum,
        AggregateKind::Min,
        AggregateKind::Max,
    ];
}

impl Display for LogicOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicOp::And => write!(f, "AND"),
            LogicOp::Or => write!(f, "OR"),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LesserThan => "<",
            Operator::Like => "like",
        };

        write!(f, "{symbol}")
    }
}

impl Display for AggregateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AggregateKind::Count => "count",
            AggregateKind::Avg => "avg",
            AggregateKind::Sum => "sum",
            AggregateKind::Min => "min",
            AggregateKind::Max => "max",
        };

        write!(f, "{name}")
    }
}
