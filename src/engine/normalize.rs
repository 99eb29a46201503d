//! Projects a [ReportDraft] into the canonical request the execution service
//! accepts. Pure, the draft is only read.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::catalog::{QualifiedColumn, TableName};
use crate::engine::draft::{FilterClause, ReportDraft};
use crate::engine::AggregateKind;
use crate::error::ErrorKind;
use crate::Error;

/// The wire key the dashboard has always used when it collapsed every
/// aggregation into one slot. Services built against that behavior expect
/// this exact key.
const SINGLE_SLOT_KEY: &str = "agg.campo";

/// How aggregation clauses are keyed in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationKeying {
    /// One entry per clause, keyed by the qualified column name. Every
    /// aggregation survives normalization.
    #[default]
    ByColumn,
    /// Every clause overwrites the same constant key, so only the last one
    /// survives. This reproduces the historical dashboard request for
    /// services that expect a single slot.
    SingleSlot,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub aggregation_keying: AggregationKeying,
}

/// An aggregation as the wire carries it: a `[kind, column]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSpec(pub AggregateKind, pub QualifiedColumn);

/// The normalized, transport-ready description of the report to execute.
/// This is the only artifact that crosses the boundary to the execution
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub tables: Vec<TableName>,
    pub columns: Vec<QualifiedColumn>,
    pub aggregations: BTreeMap<String, AggregationSpec>,
    pub filters: Vec<FilterClause>,
    pub limit: u32,
    pub order_by: String,
}

/// Builds the request for a draft.
///
/// Filter clauses are carried over 1:1 (their `logic` serializes in its
/// lower-case wire spelling). Limit and order-by pass through unchanged.
///
/// Clauses referencing a column that is no longer selected fail the whole
/// normalization: table toggles do not rewrite clauses, and emitting a
/// request the service cannot resolve helps nobody.
pub fn normalize(draft: &ReportDraft, options: NormalizeOptions) -> Result<QueryRequest, Error> {
    for filter in draft.filters() {
        require_selected(draft, &filter.column)?;
    }
    for aggregation in draft.aggregations() {
        require_selected(draft, &aggregation.column)?;
    }

    let mut aggregations = BTreeMap::new();
    for clause in draft.aggregations() {
        let key = match options.aggregation_keying {
            AggregationKeying::ByColumn => clause.column.as_str().to_string(),
            AggregationKeying::SingleSlot => SINGLE_SLOT_KEY.to_string(),
        };

        aggregations.insert(key, AggregationSpec(clause.kind, clause.column.clone()));
    }

    Ok(QueryRequest {
        tables: draft.active_tables().to_vec(),
        columns: draft.selected_columns().to_vec(),
        aggregations,
        filters: draft.filters().to_vec(),
        limit: draft.limit().get(),
        order_by: draft.order_by().to_string(),
    })
}

fn require_selected(draft: &ReportDraft, column: &QualifiedColumn) -> Result<(), Error> {
    if draft.selected_columns().contains(column) {
        return Ok(());
    }

    Err(ErrorKind::DanglingColumnReference(column.clone()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::draft::{AggregationEdit, FilterEdit};
    use crate::engine::{LogicOp, Operator};
    use serde_json::json;

    fn draft_with_aggregations() -> ReportDraft {
        let mut draft = ReportDraft::new();

        // the first clause keeps its defaults: count over produto.codigo
        draft.add_aggregation().unwrap();

        draft.add_aggregation().unwrap();
        draft
            .update_aggregation(1, AggregationEdit::Kind(AggregateKind::Avg))
            .unwrap();
        draft
            .update_aggregation(1, AggregationEdit::Column("produto.nutriscore".into()))
            .unwrap();

        draft
    }

    #[test]
    fn by_column_keying_preserves_every_aggregation() {
        let draft = draft_with_aggregations();

        let request = normalize(&draft, NormalizeOptions::default()).unwrap();

        assert_eq!(request.aggregations.len(), 2);
        assert_eq!(
            request.aggregations["produto.codigo"],
            AggregationSpec(AggregateKind::Count, "produto.codigo".into()),
        );
        assert_eq!(
            request.aggregations["produto.nutriscore"],
            AggregationSpec(AggregateKind::Avg, "produto.nutriscore".into()),
        );
    }

    #[test]
    fn single_slot_keying_keeps_only_the_last_clause() {
        let draft = draft_with_aggregations();
        let options = NormalizeOptions {
            aggregation_keying: AggregationKeying::SingleSlot,
        };

        let request = normalize(&draft, options).unwrap();

        assert_eq!(request.aggregations.len(), 1);
        assert_eq!(
            request.aggregations[SINGLE_SLOT_KEY],
            AggregationSpec(AggregateKind::Avg, "produto.nutriscore".into()),
        );
    }

    #[test]
    fn filters_limit_and_order_pass_through() {
        let mut draft = ReportDraft::new();
        draft.add_filter().unwrap();
        draft
            .update_filter(0, FilterEdit::Value("7891".to_string()))
            .unwrap();
        draft.set_limit(25.try_into().unwrap());
        draft.set_order_by("produto.nome".to_string());

        let request = normalize(&draft, NormalizeOptions::default()).unwrap();

        assert_eq!(request.filters, draft.filters());
        assert_eq!(request.limit, 25);
        assert_eq!(request.order_by, "produto.nome");
        assert_eq!(request.tables, vec![TableName::Produto]);
    }

    #[test]
    fn a_dangling_filter_column_fails_normalization() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Marca);
        draft.add_filter().unwrap();
        draft
            .update_filter(0, FilterEdit::Column("marca.nome".into()))
            .unwrap();

        // marca.nome leaves the selection, the clause stays behind
        draft.toggle_table(TableName::Marca);

        let error = normalize(&draft, NormalizeOptions::default()).unwrap_err();
        assert!(matches!(
            error.into_inner(),
            ErrorKind::DanglingColumnReference(column) if column == "marca.nome"
        ));
    }

    #[test]
    fn a_dangling_aggregation_column_fails_normalization() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Categoria);
        draft.add_aggregation().unwrap();
        draft
            .update_aggregation(0, AggregationEdit::Column("categoria.nome".into()))
            .unwrap();

        draft.toggle_table(TableName::Categoria);

        let error = normalize(&draft, NormalizeOptions::default()).unwrap_err();
        assert!(matches!(
            error.into_inner(),
            ErrorKind::DanglingColumnReference(column) if column == "categoria.nome"
        ));
    }

    #[test]
    fn the_wire_format_matches_what_the_service_expects() {
        let mut draft = ReportDraft::new();
        draft.add_filter().unwrap();
        draft
            .update_filter(0, FilterEdit::Operator(Operator::Like))
            .unwrap();
        draft
            .update_filter(0, FilterEdit::Value("arroz".to_string()))
            .unwrap();
        draft.add_aggregation().unwrap();

        let request = normalize(&draft, NormalizeOptions::default()).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["tables"], json!(["produto"]));
        assert_eq!(body["columns"][0], json!("produto.codigo"));
        assert_eq!(
            body["filters"][0],
            json!({
                "logic": "and",
                "column": "produto.codigo",
                "operator": "like",
                "value": "arroz",
            })
        );
        assert_eq!(
            body["aggregations"]["produto.codigo"],
            json!(["count", "produto.codigo"])
        );
        assert_eq!(body["limit"], json!(100));
        assert_eq!(body["orderBy"], json!(""));
    }

    #[test]
    fn the_first_filters_connective_is_still_transmitted() {
        let mut draft = ReportDraft::new();
        draft.add_filter().unwrap();
        draft.update_filter(0, FilterEdit::Logic(LogicOp::Or)).unwrap();

        let request = normalize(&draft, NormalizeOptions::default()).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["filters"][0]["logic"], json!("or"));
    }
}
