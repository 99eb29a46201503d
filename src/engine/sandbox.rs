//! A local stand-in for the real execution service.
//!
//! The real backend flattens the product database and answers
//! `POST /product/get-result-filtered`. This module serves the same contract
//! over a small in-memory dataset so the compose loop can be exercised with
//! nothing else running. It is a development convenience, not a query engine:
//! the evaluation below is the simplest thing that honors the request shape.
use axum::routing::post;
use axum::{Json, Router};
use log::info;
use std::cmp::Ordering;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::engine::normalize::{AggregationSpec, QueryRequest};
use crate::engine::rows::{CellValue, Row};
use crate::engine::{AggregateKind, FilterClause, LogicOp, Operator};
use crate::Error;

pub fn router() -> Router {
    Router::new()
        .route("/product/get-result-filtered", post(get_result_filtered))
        // permissive on purpose, this only ever runs on a dev machine
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn serve(listener: TcpListener) -> Result<(), Error> {
    info!(
        "Sandbox execution service listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, router()).await?;

    Ok(())
}

async fn get_result_filtered(Json(request): Json<QueryRequest>) -> Json<Vec<Row>> {
    Json(execute_request(&request))
}

/// Filters, orders, caps and projects the sample dataset; aggregations, when
/// present, collapse the matches into a single row keyed like the request's
/// aggregation map.
pub fn execute_request(request: &QueryRequest) -> Vec<Row> {
    let mut matches: Vec<Row> = sample_rows()
        .into_iter()
        .filter(|row| matches_filters(row, request))
        .collect();

    if !request.aggregations.is_empty() {
        let mut aggregated = Row::new();
        for (key, spec) in &request.aggregations {
            aggregated.insert(key.clone(), aggregate(&matches, spec));
        }

        return vec![aggregated];
    }

    if !request.order_by.is_empty() {
        let key = request.order_by.to_lowercase();
        matches.sort_by(|left, right| compare_cells(left.get(&key), right.get(&key)));
    }

    matches.truncate(request.limit as usize);

    matches
        .into_iter()
        .map(|row| project(row, request))
        .collect()
}

fn matches_filters(row: &Row, request: &QueryRequest) -> bool {
    let mut clauses = request.filters.iter();

    let Some(first) = clauses.next() else {
        return true;
    };

    // left fold in clause order; the first connective has nothing to its
    // left and is ignored, like the service ignores it
    let mut verdict = matches_clause(row, first);
    for clause in clauses {
        let this_one = matches_clause(row, clause);

        verdict = match clause.logic {
            LogicOp::And => verdict && this_one,
            LogicOp::Or => verdict || this_one,
        };
    }

    verdict
}

fn matches_clause(row: &Row, clause: &FilterClause) -> bool {
    let cell = row.get(&clause.column.row_key()).unwrap_or(&CellValue::Null);

    match clause.operator {
        Operator::Equals => cells_equal(cell, &clause.value),
        Operator::NotEquals => !cells_equal(cell, &clause.value),
        Operator::GreaterThan => {
            compare_to_literal(cell, &clause.value) == Some(Ordering::Greater)
        }
        Operator::LesserThan => compare_to_literal(cell, &clause.value) == Some(Ordering::Less),
        Operator::Like => cell
            .to_string()
            .to_lowercase()
            .contains(&clause.value.to_lowercase()),
    }
}

fn cells_equal(cell: &CellValue, literal: &str) -> bool {
    if let (Some(number), Ok(wanted)) = (as_number(cell), literal.parse::<f64>()) {
        return number == wanted;
    }

    cell.to_string() == literal
}

/// Numbers compare numerically when both sides parse, anything else falls
/// back to string order (which is what makes `nutriscore > "b"` work).
fn compare_to_literal(cell: &CellValue, literal: &str) -> Option<Ordering> {
    if cell.is_null() {
        return None;
    }

    if let (Some(number), Ok(wanted)) = (as_number(cell), literal.parse::<f64>()) {
        return number.partial_cmp(&wanted);
    }

    Some(cell.to_string().cmp(&literal.to_string()))
}

fn compare_cells(left: Option<&CellValue>, right: Option<&CellValue>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        // rows without the column sink to the bottom
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            if let (Some(left), Some(right)) = (as_number(left), as_number(right)) {
                left.partial_cmp(&right).unwrap_or(Ordering::Equal)
            } else {
                left.to_string().cmp(&right.to_string())
            }
        }
    }
}

fn as_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => text.parse().ok(),
        _ => None,
    }
}

fn aggregate(rows: &[Row], spec: &AggregationSpec) -> CellValue {
    let AggregationSpec(kind, column) = spec;
    let key = column.row_key();

    let cells: Vec<&CellValue> = rows
        .iter()
        .filter_map(|row| row.get(&key))
        .filter(|cell| !cell.is_null())
        .collect();

    if *kind == AggregateKind::Count {
        return CellValue::Number(cells.len() as f64);
    }

    let numbers: Vec<f64> = cells.iter().copied().filter_map(as_number).collect();

    match kind {
        AggregateKind::Count => unreachable!("handled above"),
        AggregateKind::Sum => CellValue::Number(numbers.iter().sum()),
        AggregateKind::Avg => {
            if numbers.is_empty() {
                CellValue::Null
            } else {
                CellValue::Number(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
        }
        AggregateKind::Min | AggregateKind::Max => extreme(*kind, &cells, &numbers),
    }
}

fn extreme(kind: AggregateKind, cells: &[&CellValue], numbers: &[f64]) -> CellValue {
    if !numbers.is_empty() {
        let folded = numbers.iter().copied().fold(numbers[0], |best, next| {
            if kind == AggregateKind::Min {
                best.min(next)
            } else {
                best.max(next)
            }
        });

        return CellValue::Number(folded);
    }

    let mut texts: Vec<String> = cells.iter().map(|cell| cell.to_string()).collect();
    texts.sort();

    let picked = if kind == AggregateKind::Min {
        texts.first()
    } else {
        texts.last()
    };

    picked
        .map(|text| CellValue::Text(text.clone()))
        .unwrap_or(CellValue::Null)
}

fn project(row: Row, request: &QueryRequest) -> Row {
    let wanted: Vec<String> = request
        .columns
        .iter()
        .map(|column| column.row_key())
        .collect();

    row.into_iter()
        .filter(|(key, _)| wanted.contains(key))
        .collect()
}

fn sample_rows() -> Vec<Row> {
    let row = |cells: Vec<(&str, CellValue)>| -> Row {
        cells
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    };

    vec![
        row(vec![
            ("produto.codigo", "7891000100103".into()),
            ("produto.nome", "Arroz Integral".into()),
            ("produto.nutriscore", "a".into()),
            ("produto.novascore", 1.0.into()),
            ("produto.ecoscore", "b".into()),
            ("categoria.nome", "Grãos".into()),
            ("marca.nome", "Camil".into()),
            ("ingrediente.nome", "arroz integral".into()),
            ("ingrediente.vegano", true.into()),
            ("ingrediente.vegetariano", true.into()),
            ("nutriente.nome", "fibra".into()),
            ("nutriente.unidade", "g".into()),
            ("tag.nome", "integral".into()),
            ("tag.tipo", "dieta".into()),
        ]),
        row(vec![
            ("produto.codigo", "7891000053508".into()),
            ("produto.nome", "Leite Condensado".into()),
            ("produto.nutriscore", "e".into()),
            ("produto.novascore", 4.0.into()),
            ("produto.ecoscore", "d".into()),
            ("categoria.nome", "Laticínios".into()),
            ("marca.nome", "Moça".into()),
            ("ingrediente.nome", "leite integral".into()),
            ("ingrediente.vegano", false.into()),
            ("ingrediente.vegetariano", true.into()),
            ("nutriente.nome", "açúcares".into()),
            ("nutriente.unidade", "g".into()),
            ("tag.nome", "doce".into()),
            ("tag.tipo", "sabor".into()),
        ]),
        row(vec![
            ("produto.codigo", "7894900011517".into()),
            ("produto.nome", "Refrigerante Cola".into()),
            ("produto.nutriscore", "e".into()),
            ("produto.novascore", 4.0.into()),
            ("produto.ecoscore", "c".into()),
            ("categoria.nome", "Bebidas".into()),
            ("marca.nome", "Coca-Cola".into()),
            ("ingrediente.nome", "água gaseificada".into()),
            ("ingrediente.vegano", true.into()),
            ("ingrediente.vegetariano", true.into()),
            ("nutriente.nome", "açúcares".into()),
            ("nutriente.unidade", "g".into()),
            ("tag.nome", "gelado".into()),
            ("tag.tipo", "consumo".into()),
        ]),
        row(vec![
            ("produto.codigo", "7896004400014".into()),
            ("produto.nome", "Feijão Preto".into()),
            ("produto.nutriscore", "a".into()),
            ("produto.novascore", 1.0.into()),
            ("produto.ecoscore", "a".into()),
            ("categoria.nome", "Grãos".into()),
            ("marca.nome", "Kicaldo".into()),
            ("ingrediente.nome", "feijão preto".into()),
            ("ingrediente.vegano", true.into()),
            ("ingrediente.vegetariano", true.into()),
            ("nutriente.nome", "proteína".into()),
            ("nutriente.unidade", "g".into()),
            ("tag.nome", "básico".into()),
            ("tag.tipo", "despensa".into()),
        ]),
        row(vec![
            ("produto.codigo", "7892840812736".into()),
            ("produto.nome", "Biscoito Recheado".into()),
            ("produto.nutriscore", "d".into()),
            ("produto.novascore", 4.0.into()),
            ("produto.ecoscore", "c".into()),
            ("categoria.nome", "Biscoitos".into()),
            ("marca.nome", CellValue::Null),
            ("ingrediente.nome", "farinha de trigo".into()),
            ("ingrediente.vegano", false.into()),
            ("ingrediente.vegetariano", true.into()),
            ("nutriente.nome", "gorduras".into()),
            ("nutriente.unidade", "g".into()),
            ("tag.nome", "lanche".into()),
            ("tag.tipo", "consumo".into()),
        ]),
        row(vec![
            ("produto.codigo", "7891080400088".into()),
            ("produto.nome", "Azeite Extra Virgem".into()),
            ("produto.nutriscore", "c".into()),
            ("produto.novascore", 2.0.into()),
            ("produto.ecoscore", "b".into()),
            ("categoria.nome", "Óleos".into()),
            ("marca.nome", "Gallo".into()),
            ("ingrediente.nome", "azeite de oliva".into()),
            ("ingrediente.vegano", true.into()),
            ("ingrediente.vegetariano", true.into()),
            ("nutriente.nome", "gorduras".into()),
            ("nutriente.unidade", "g".into()),
            ("tag.nome", "importado".into()),
            ("tag.tipo", "origem".into()),
        ]),
    ]
}
