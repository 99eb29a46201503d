//! Turns drafts and result sets into terminal output.
use colored::Colorize;

use crate::engine::catalog::QualifiedColumn;
use crate::engine::draft::ReportDraft;
use crate::engine::rows::Row;

/// A one-screen summary of the draft, shown between edits in the compose
/// loop.
pub fn render_draft(draft: &ReportDraft) -> String {
    let mut out = String::new();

    let tables = draft
        .active_tables()
        .iter()
        .map(|table| table.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("{} {}\n", "Tables:".bold(), tables));

    let columns = draft
        .selected_columns()
        .iter()
        .map(QualifiedColumn::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("{} {}\n", "Columns:".bold(), columns));

    if !draft.filters().is_empty() {
        out.push_str(&format!("{}\n", "Filters:".bold()));
        for (index, clause) in draft.filters().iter().enumerate() {
            out.push_str(&format!(
                "  {index}: {logic} {column} {operator} \"{value}\"\n",
                logic = clause.logic,
                column = clause.column,
                operator = clause.operator,
                value = clause.value,
            ));
        }
    }

    if !draft.aggregations().is_empty() {
        out.push_str(&format!("{}\n", "Aggregations:".bold()));
        for (index, clause) in draft.aggregations().iter().enumerate() {
            out.push_str(&format!(
                "  {index}: {kind}({column})\n",
                kind = clause.kind,
                column = clause.column,
            ));
        }
    }

    out.push_str(&format!(
        "{} {limit}    {} {order}\n",
        "Limit:".bold(),
        "Order by:".bold(),
        limit = draft.limit(),
        order = if draft.order_by().is_empty() {
            "(none)"
        } else {
            draft.order_by()
        },
    ));

    out
}

/// Renders rows as an aligned table under the selected columns.
///
/// Cells are looked up by the lower-cased qualified name, which is how the
/// service keys them. Missing keys render the same as nulls.
pub fn render_rows(columns: &[QualifiedColumn], rows: &[Row]) -> String {
    if rows.is_empty() {
        return "Nenhum dado encontrado para os critérios selecionados.\n".to_string();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    row.get(&column.row_key())
                        .map(ToString::to_string)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let widest_cell = cells
                .iter()
                .map(|row| row[index].chars().count())
                .max()
                .unwrap_or(0);

            widest_cell.max(column.as_str().chars().count())
        })
        .collect();

    let mut out = String::new();

    for (index, column) in columns.iter().enumerate() {
        let padded = pad(column.as_str(), widths[index]);
        out.push_str(&format!("{} ", padded.bold()));
    }
    out.push('\n');

    for row in &cells {
        for (index, cell) in row.iter().enumerate() {
            out.push_str(&pad(cell, widths[index]));
            out.push(' ');
        }
        out.push('\n');
    }

    out
}

// Pads by character count, not byte length, so accented column values line up.
fn pad(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count());
    format!("{text}{}", " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rows::CellValue;
    use std::collections::BTreeMap;

    fn row(entries: &[(&str, CellValue)]) -> Row {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect::<BTreeMap<_, _>>()
    }

    #[test]
    fn an_empty_result_set_renders_the_no_data_line() {
        let rendered = render_rows(&["produto.nome".into()], &[]);

        assert!(rendered.contains("Nenhum dado encontrado"));
    }

    #[test]
    fn cells_line_up_under_their_columns() {
        colored::control::set_override(false);

        let columns: Vec<QualifiedColumn> =
            vec!["produto.nome".into(), "ingrediente.vegano".into()];
        let rows = vec![
            row(&[
                ("produto.nome", "Arroz Integral".into()),
                ("ingrediente.vegano", true.into()),
            ]),
            row(&[("produto.nome", "Leite".into()), ("ingrediente.vegano", false.into())]),
        ];

        let rendered = render_rows(&columns, &rows);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "produto.nome   ingrediente.vegano ");
        assert_eq!(lines[1], "Arroz Integral Sim                ");
        assert_eq!(lines[2], "Leite          Não                ");
    }

    #[test]
    fn missing_keys_render_as_empty_cells() {
        colored::control::set_override(false);

        let columns: Vec<QualifiedColumn> = vec!["marca.nome".into()];
        let rows = vec![row(&[])];

        let rendered = render_rows(&columns, &rows);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[1].trim(), "");
    }
}
