//! The mutable draft of a report: which tables and columns are in play, the
//! filter and aggregation clauses, the row cap and ordering.
//!
//! All mutation goes through the methods here; the normalizer only ever reads
//! a draft. There is no global instance, callers own their drafts.
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::engine::catalog::{columns_of, QualifiedColumn, TableName};
use crate::engine::{AggregateKind, LogicOp, Operator};
use crate::error::ErrorKind;
use crate::Error;

/// The dashboard's historical default row cap.
const DEFAULT_LIMIT: u32 = 100;

/// One predicate with its logical connective, target column, comparison
/// operator and literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub logic: LogicOp,
    pub column: QualifiedColumn,
    pub operator: Operator,
    pub value: String,
}

/// One summarization request to be computed over the result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationClause {
    pub kind: AggregateKind,
    pub column: QualifiedColumn,
}

/// A single-field edit to a filter clause.
#[derive(Debug, Clone)]
pub enum FilterEdit {
    Logic(LogicOp),
    Column(QualifiedColumn),
    Operator(Operator),
    Value(String),
}

/// A single-field edit to an aggregation clause.
#[derive(Debug, Clone)]
pub enum AggregationEdit {
    Kind(AggregateKind),
    Column(QualifiedColumn),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    /// Insertion order matters: deactivating a table rebuilds the column
    /// list by walking this in order.
    active_tables: Vec<TableName>,
    selected_columns: Vec<QualifiedColumn>,
    filters: Vec<FilterClause>,
    aggregations: Vec<AggregationClause>,
    limit: NonZeroU32,
    order_by: String,
}

impl ReportDraft {
    /// A fresh draft starts anchored on `produto` with all of its columns.
    pub fn new() -> Self {
        ReportDraft {
            active_tables: vec![TableName::Produto],
            selected_columns: columns_of(TableName::Produto).to_vec(),
            filters: Vec::new(),
            aggregations: Vec::new(),
            limit: NonZeroU32::new(DEFAULT_LIMIT).expect("the default limit is not zero"),
            order_by: String::new(),
        }
    }

    /// Activates or deactivates a table, keeping the column selection
    /// consistent with what the remaining tables expose.
    ///
    /// `produto` is the anchor entity: activating it resets the draft to just
    /// `produto`, and while it is active any number of other tables can pile
    /// on. Without it only a single table's flat view is meaningful, so
    /// activating a non-`produto` table then replaces whatever else was
    /// active.
    ///
    /// Filters and aggregations are deliberately left alone; clauses whose
    /// column drops out of the selection are caught at normalization time.
    pub fn toggle_table(&mut self, table: TableName) {
        let is_active = self.active_tables.contains(&table);

        if is_active {
            self.active_tables.retain(|active| *active != table);

            // Rebuild from the catalog in activation order. Hand-picked
            // column choices do not survive a deactivation.
            self.selected_columns = self
                .active_tables
                .iter()
                .flat_map(|remaining| columns_of(*remaining).iter().cloned())
                .collect();
        } else if table == TableName::Produto {
            self.active_tables = vec![TableName::Produto];
            self.selected_columns = columns_of(TableName::Produto).to_vec();
        } else if self.active_tables.contains(&TableName::Produto) {
            self.active_tables.push(table);
            self.selected_columns
                .extend(columns_of(table).iter().cloned());
        } else {
            self.active_tables = vec![table];
            self.selected_columns = columns_of(table).to_vec();
        }
    }

    /// Deselects a column, or selects it again by appending it at the end.
    ///
    /// Columns no active table exposes are rejected; selecting one would
    /// produce a column that can never be rendered or validated.
    pub fn toggle_column(&mut self, column: QualifiedColumn) -> Result<(), Error> {
        if self.selected_columns.contains(&column) {
            self.selected_columns.retain(|selected| *selected != column);
            return Ok(());
        }

        let is_exposed = self
            .active_tables
            .iter()
            .any(|table| columns_of(*table).contains(&column));

        if !is_exposed {
            return Err(ErrorKind::ForeignColumn(column).into());
        }

        self.selected_columns.push(column);
        Ok(())
    }

    /// All the columns the active tables expose, in activation order. This is
    /// what a column picker should offer.
    pub fn selectable_columns(&self) -> Vec<QualifiedColumn> {
        self.active_tables
            .iter()
            .flat_map(|table| columns_of(*table).iter().cloned())
            .collect()
    }

    pub fn add_filter(&mut self) -> Result<(), Error> {
        let first_column = self
            .selected_columns
            .first()
            .ok_or(ErrorKind::EmptySelection)?;

        self.filters.push(FilterClause {
            logic: LogicOp::And,
            column: first_column.clone(),
            operator: Operator::Equals,
            value: String::new(),
        });

        Ok(())
    }

    pub fn update_filter(&mut self, index: usize, edit: FilterEdit) -> Result<(), Error> {
        let len = self.filters.len();
        let clause = self
            .filters
            .get_mut(index)
            .ok_or(ErrorKind::IndexOutOfRange {
                list: "filter",
                index,
                len,
            })?;

        match edit {
            FilterEdit::Logic(logic) => clause.logic = logic,
            FilterEdit::Column(column) => clause.column = column,
            FilterEdit::Operator(operator) => clause.operator = operator,
            FilterEdit::Value(value) => clause.value = value,
        }

        Ok(())
    }

    pub fn remove_filter(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.filters.len() {
            return Err(ErrorKind::IndexOutOfRange {
                list: "filter",
                index,
                len: self.filters.len(),
            }
            .into());
        }

        self.filters.remove(index);
        Ok(())
    }

    pub fn add_aggregation(&mut self) -> Result<(), Error> {
        let first_column = self
            .selected_columns
            .first()
            .ok_or(ErrorKind::EmptySelection)?;

        self.aggregations.push(AggregationClause {
            kind: AggregateKind::Count,
            column: first_column.clone(),
        });

        Ok(())
    }

    pub fn update_aggregation(&mut self, index: usize, edit: AggregationEdit) -> Result<(), Error> {
        let len = self.aggregations.len();
        let clause = self
            .aggregations
            .get_mut(index)
            .ok_or(ErrorKind::IndexOutOfRange {
                list: "aggregation",
                index,
                len,
            })?;

        match edit {
            AggregationEdit::Kind(kind) => clause.kind = kind,
            AggregationEdit::Column(column) => clause.column = column,
        }

        Ok(())
    }

    pub fn remove_aggregation(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.aggregations.len() {
            return Err(ErrorKind::IndexOutOfRange {
                list: "aggregation",
                index,
                len: self.aggregations.len(),
            }
            .into());
        }

        self.aggregations.remove(index);
        Ok(())
    }

    pub fn set_limit(&mut self, limit: NonZeroU32) {
        self.limit = limit;
    }

    pub fn set_order_by(&mut self, order_by: String) {
        self.order_by = order_by;
    }

    pub fn active_tables(&self) -> &[TableName] {
        &self.active_tables
    }

    pub fn selected_columns(&self) -> &[QualifiedColumn] {
        &self.selected_columns
    }

    pub fn filters(&self) -> &[FilterClause] {
        &self.filters
    }

    pub fn aggregations(&self) -> &[AggregationClause] {
        &self.aggregations
    }

    pub fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    pub fn order_by(&self) -> &str {
        &self.order_by
    }
}

impl Default for ReportDraft {
    fn default() -> Self {
        ReportDraft::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog::all_tables;

    fn columns(names: &[&str]) -> Vec<QualifiedColumn> {
        names.iter().map(|name| (*name).into()).collect()
    }

    #[test]
    fn activating_marca_keeps_produto_and_appends_its_columns() {
        let mut draft = ReportDraft::new();

        draft.toggle_table(TableName::Marca);

        assert_eq!(
            draft.active_tables(),
            &[TableName::Produto, TableName::Marca]
        );
        assert_eq!(
            draft.selected_columns(),
            columns(&[
                "produto.codigo",
                "produto.nome",
                "produto.nutriscore",
                "produto.novascore",
                "produto.ecoscore",
                "marca.nome",
            ])
            .as_slice(),
        );
    }

    #[test]
    fn tables_accumulate_while_produto_is_active() {
        let mut draft = ReportDraft::new();

        draft.toggle_table(TableName::Marca);
        draft.toggle_table(TableName::Categoria);

        assert_eq!(
            draft.active_tables(),
            &[TableName::Produto, TableName::Marca, TableName::Categoria]
        );
        assert_eq!(
            draft.selected_columns(),
            columns(&[
                "produto.codigo",
                "produto.nome",
                "produto.nutriscore",
                "produto.novascore",
                "produto.ecoscore",
                "marca.nome",
                "categoria.nome",
            ])
            .as_slice(),
        );
    }

    #[test]
    fn deactivating_a_table_purges_only_its_columns_in_order() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Marca);
        draft.toggle_table(TableName::Categoria);

        draft.toggle_table(TableName::Marca);

        assert_eq!(
            draft.active_tables(),
            &[TableName::Produto, TableName::Categoria]
        );
        assert_eq!(
            draft.selected_columns(),
            columns(&[
                "produto.codigo",
                "produto.nome",
                "produto.nutriscore",
                "produto.novascore",
                "produto.ecoscore",
                "categoria.nome",
            ])
            .as_slice(),
        );
    }

    #[test]
    fn deactivating_produto_leaves_the_bare_table_view() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Categoria);

        draft.toggle_table(TableName::Produto);

        assert_eq!(draft.active_tables(), &[TableName::Categoria]);
        assert_eq!(
            draft.selected_columns(),
            columns(&["categoria.nome"]).as_slice()
        );
    }

    #[test]
    fn activating_produto_resets_any_exclusive_selection() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Produto);
        draft.toggle_table(TableName::Marca);
        assert_eq!(draft.active_tables(), &[TableName::Marca]);

        draft.toggle_table(TableName::Produto);

        assert_eq!(draft.active_tables(), &[TableName::Produto]);
        assert_eq!(
            draft.selected_columns(),
            columns_of(TableName::Produto).to_vec().as_slice()
        );
    }

    #[test]
    fn a_non_produto_table_replaces_another_when_produto_is_inactive() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Produto);
        draft.toggle_table(TableName::Marca);

        draft.toggle_table(TableName::Tag);

        assert_eq!(draft.active_tables(), &[TableName::Tag]);
        assert_eq!(
            draft.selected_columns(),
            columns(&["tag.nome", "tag.tipo"]).as_slice()
        );
    }

    #[test]
    fn deactivating_the_last_table_leaves_the_draft_empty() {
        let mut draft = ReportDraft::new();

        draft.toggle_table(TableName::Produto);

        assert!(draft.active_tables().is_empty());
        assert!(draft.selected_columns().is_empty());
    }

    /// Runs every toggle sequence of length three and checks what each step
    /// must leave behind: every selected column is exposed by some active
    /// table, activating without the `produto` anchor is exclusive, and
    /// activating `produto` resets the draft to just `produto`.
    #[test]
    fn toggle_sequences_preserve_activation_and_column_invariants() {
        for first in all_tables() {
            for second in all_tables() {
                for third in all_tables() {
                    let mut draft = ReportDraft::new();

                    for toggle in [first, second, third] {
                        let was_active = draft.active_tables().contains(&toggle);
                        let had_produto =
                            draft.active_tables().contains(&TableName::Produto);

                        draft.toggle_table(toggle);

                        for column in draft.selected_columns() {
                            assert!(
                                draft
                                    .active_tables()
                                    .iter()
                                    .any(|table| columns_of(*table).contains(column)),
                                "{column} has no active table after {first:?} {second:?} {third:?}",
                            );
                        }

                        if !was_active && toggle == TableName::Produto {
                            assert_eq!(draft.active_tables(), &[TableName::Produto]);
                        }

                        if !was_active && toggle != TableName::Produto && !had_produto {
                            assert_eq!(draft.active_tables(), &[toggle]);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn an_append_and_remove_pair_restores_the_draft() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Marca);
        let before = draft.clone();

        draft.toggle_table(TableName::Categoria);
        draft.toggle_table(TableName::Categoria);

        assert_eq!(draft, before);
    }

    #[test]
    fn a_remove_and_append_pair_restores_a_catalog_shaped_draft() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Marca);
        let before = draft.clone();

        draft.toggle_table(TableName::Marca);
        draft.toggle_table(TableName::Marca);

        assert_eq!(draft, before);
    }

    #[test]
    fn toggling_a_column_off_and_back_on_appends_it_at_the_end() {
        let mut draft = ReportDraft::new();
        let column: QualifiedColumn = "produto.codigo".into();

        draft.toggle_column(column.clone()).unwrap();
        assert!(!draft.selected_columns().contains(&column));

        draft.toggle_column(column.clone()).unwrap();
        assert_eq!(draft.selected_columns().last(), Some(&column));
    }

    #[test]
    fn columns_of_inactive_tables_cannot_be_selected() {
        let mut draft = ReportDraft::new();

        let error = draft.toggle_column("tag.nome".into()).unwrap_err();

        assert!(matches!(
            error.into_inner(),
            ErrorKind::ForeignColumn(column) if column == "tag.nome"
        ));
    }

    #[test]
    fn new_filters_default_to_the_first_selected_column() {
        let mut draft = ReportDraft::new();

        draft.add_filter().unwrap();

        assert_eq!(
            draft.filters(),
            &[FilterClause {
                logic: LogicOp::And,
                column: "produto.codigo".into(),
                operator: Operator::Equals,
                value: String::new(),
            }]
        );
    }

    #[test]
    fn clauses_cannot_be_added_to_an_empty_selection() {
        let mut draft = ReportDraft::new();
        draft.toggle_table(TableName::Produto);

        assert!(matches!(
            draft.add_filter().unwrap_err().into_inner(),
            ErrorKind::EmptySelection
        ));
        assert!(matches!(
            draft.add_aggregation().unwrap_err().into_inner(),
            ErrorKind::EmptySelection
        ));
    }

    #[test]
    fn removing_a_filter_shifts_later_clauses_down() {
        let mut draft = ReportDraft::new();
        for value in ["a", "b", "c"] {
            draft.add_filter().unwrap();
            let last = draft.filters().len() - 1;
            draft
                .update_filter(last, FilterEdit::Value(value.to_string()))
                .unwrap();
        }

        draft.remove_filter(1).unwrap();

        let values: Vec<_> = draft
            .filters()
            .iter()
            .map(|clause| clause.value.as_str())
            .collect();
        assert_eq!(values, ["a", "c"]);
    }

    #[test]
    fn editor_operations_reject_stale_indices() {
        let mut draft = ReportDraft::new();
        draft.add_filter().unwrap();

        let error = draft
            .update_filter(1, FilterEdit::Logic(LogicOp::Or))
            .unwrap_err();
        assert!(matches!(
            error.into_inner(),
            ErrorKind::IndexOutOfRange {
                list: "filter",
                index: 1,
                len: 1,
            }
        ));

        let error = draft.remove_aggregation(0).unwrap_err();
        assert!(matches!(
            error.into_inner(),
            ErrorKind::IndexOutOfRange {
                list: "aggregation",
                index: 0,
                len: 0,
            }
        ));
    }

    #[test]
    fn filter_edits_replace_a_single_field() {
        let mut draft = ReportDraft::new();
        draft.add_filter().unwrap();

        draft.update_filter(0, FilterEdit::Logic(LogicOp::Or)).unwrap();
        draft
            .update_filter(0, FilterEdit::Operator(Operator::Like))
            .unwrap();
        draft
            .update_filter(0, FilterEdit::Value("arroz".to_string()))
            .unwrap();

        assert_eq!(
            draft.filters(),
            &[FilterClause {
                logic: LogicOp::Or,
                column: "produto.codigo".into(),
                operator: Operator::Like,
                value: "arroz".to_string(),
            }]
        );
    }
}
