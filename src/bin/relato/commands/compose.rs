//! The interactive session: mutate the draft until it says what the user
//! means, then submit it and print the rows.
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{FuzzySelect, Input, Select};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use relato::context::Context;
use relato::gateway::{Dispatcher, HttpGateway, SubmissionOutcome};
use relato::report::{
    all_tables, normalize, AggregateKind, AggregationEdit, FilterEdit, LogicOp, NormalizeOptions,
    Operator, ReportDraft,
};
use relato::{render_draft, render_rows, Error};

const MENU: [&str; 10] = [
    "Toggle table",
    "Toggle column",
    "Add filter",
    "Edit filter",
    "Remove filter",
    "Add aggregation",
    "Remove aggregation",
    "Set limit / order",
    "Run report",
    "Quit",
];

pub fn run() -> Result<(), Error> {
    let context = Context::current_or_default()?;

    println!(
        "Composing against {}",
        context.gateway.to_string().bold().green()
    );

    // The submission is the only async thing in the loop, but it has to be
    // real async so a future UI can keep editing while a query runs.
    let tokio = Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()
        .expect("Cannot build tokio runtime");

    let dispatcher = Dispatcher::new(Arc::new(HttpGateway::new(&context.gateway.base_url)));
    let mut draft = ReportDraft::new();

    loop {
        println!();
        print!("{}", render_draft(&draft));

        let action = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What next?")
            .items(&MENU)
            .default(0)
            .interact()?;

        let step = match MENU[action] {
            "Toggle table" => toggle_table(&mut draft),
            "Toggle column" => toggle_column(&mut draft),
            "Add filter" => add_filter(&mut draft),
            "Edit filter" => edit_filter(&mut draft),
            "Remove filter" => remove_filter(&mut draft),
            "Add aggregation" => add_aggregation(&mut draft),
            "Remove aggregation" => remove_aggregation(&mut draft),
            "Set limit / order" => set_limit_and_order(&mut draft),
            "Run report" => {
                run_report(&tokio, &dispatcher, &draft);
                Ok(())
            }
            _ => break,
        };

        // Draft errors are recoverable, the session keeps going.
        if let Err(error) = step {
            println!("{}", error.to_string().red());
        }
    }

    Ok(())
}

fn toggle_table(draft: &mut ReportDraft) -> Result<(), Error> {
    let tables = all_tables();
    let items: Vec<String> = tables
        .iter()
        .map(|table| {
            let marker = if draft.active_tables().contains(table) {
                "[x]"
            } else {
                "[ ]"
            };

            format!("{marker} {table}")
        })
        .collect();

    let picked = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Toggle which table?")
        .items(&items)
        .default(0)
        .interact()?;

    draft.toggle_table(tables[picked]);
    Ok(())
}

fn toggle_column(draft: &mut ReportDraft) -> Result<(), Error> {
    let columns = draft.selectable_columns();
    if columns.is_empty() {
        println!("{}", "No active tables, activate one first.".red());
        return Ok(());
    }

    let items: Vec<String> = columns
        .iter()
        .map(|column| {
            let marker = if draft.selected_columns().contains(column) {
                "[x]"
            } else {
                "[ ]"
            };

            format!("{marker} {column}")
        })
        .collect();

    let picked = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Toggle which column?")
        .items(&items)
        .default(0)
        .interact()?;

    draft.toggle_column(columns[picked].clone())
}

fn add_filter(draft: &mut ReportDraft) -> Result<(), Error> {
    draft.add_filter()?;

    edit_filter_fields(draft, draft.filters().len() - 1)
}

fn edit_filter(draft: &mut ReportDraft) -> Result<(), Error> {
    let Some(index) = pick_filter(draft, "Edit which filter?")? else {
        return Ok(());
    };

    edit_filter_fields(draft, index)
}

fn remove_filter(draft: &mut ReportDraft) -> Result<(), Error> {
    let Some(index) = pick_filter(draft, "Remove which filter?")? else {
        return Ok(());
    };

    draft.remove_filter(index)
}

fn pick_filter(draft: &ReportDraft, prompt: &str) -> Result<Option<usize>, Error> {
    if draft.filters().is_empty() {
        println!("{}", "There are no filters yet.".red());
        return Ok(None);
    }

    let items: Vec<String> = draft
        .filters()
        .iter()
        .map(|clause| {
            format!(
                "{} {} {} \"{}\"",
                clause.logic, clause.column, clause.operator, clause.value
            )
        })
        .collect();

    let picked = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    Ok(Some(picked))
}

fn edit_filter_fields(draft: &mut ReportDraft, index: usize) -> Result<(), Error> {
    let logic = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Connective")
        .items(&LogicOp::ALL)
        .default(0)
        .interact()?;
    draft.update_filter(index, FilterEdit::Logic(LogicOp::ALL[logic]))?;

    let columns = draft.selected_columns().to_vec();
    let column = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Column")
        .items(&columns)
        .default(0)
        .interact()?;
    draft.update_filter(index, FilterEdit::Column(columns[column].clone()))?;

    let labels: Vec<&str> = Operator::ALL.iter().map(Operator::label).collect();
    let operator = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Operator")
        .items(&labels)
        .default(0)
        .interact()?;
    draft.update_filter(index, FilterEdit::Operator(Operator::ALL[operator]))?;

    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Value")
        .allow_empty(true)
        .interact_text()?;
    draft.update_filter(index, FilterEdit::Value(value))
}

fn add_aggregation(draft: &mut ReportDraft) -> Result<(), Error> {
    draft.add_aggregation()?;
    let index = draft.aggregations().len() - 1;

    let kind = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Aggregate how?")
        .items(&AggregateKind::ALL)
        .default(0)
        .interact()?;
    draft.update_aggregation(index, AggregationEdit::Kind(AggregateKind::ALL[kind]))?;

    let columns = draft.selected_columns().to_vec();
    let column = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Over which column?")
        .items(&columns)
        .default(0)
        .interact()?;
    draft.update_aggregation(index, AggregationEdit::Column(columns[column].clone()))
}

fn remove_aggregation(draft: &mut ReportDraft) -> Result<(), Error> {
    if draft.aggregations().is_empty() {
        println!("{}", "There are no aggregations yet.".red());
        return Ok(());
    }

    let items: Vec<String> = draft
        .aggregations()
        .iter()
        .map(|clause| format!("{}({})", clause.kind, clause.column))
        .collect();

    let picked = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Remove which aggregation?")
        .items(&items)
        .default(0)
        .interact()?;

    draft.remove_aggregation(picked)
}

fn set_limit_and_order(draft: &mut ReportDraft) -> Result<(), Error> {
    let limit: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("LIMIT")
        .default(draft.limit().get())
        .validate_with(|input: &u32| {
            if *input == 0 {
                Err("the limit must be positive")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    draft.set_limit(NonZeroU32::new(limit).expect("validated right above"));

    let order_by: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("ORDER BY (empty for none)")
        .allow_empty(true)
        .interact_text()?;
    draft.set_order_by(order_by);

    Ok(())
}

fn run_report(tokio: &Runtime, dispatcher: &Dispatcher, draft: &ReportDraft) {
    if draft.active_tables().is_empty() {
        println!("{}", "Activate at least one table first.".red());
        return;
    }

    let request = match normalize(draft, NormalizeOptions::default()) {
        Ok(request) => request,
        Err(error) => {
            println!("{}", error.to_string().red());
            return;
        }
    };

    // submit() spawns, so it has to run inside the runtime
    let outcome = tokio.block_on(async { dispatcher.submit(request).await });

    match outcome {
        Ok(SubmissionOutcome::Rows(rows)) => {
            print!("{}", render_rows(draft.selected_columns(), &rows));
        }
        // submissions are sequential here, nothing can supersede them
        Ok(SubmissionOutcome::Superseded) => {}
        Ok(SubmissionOutcome::Failed(error)) => println!("{}", error.to_string().red()),
        Err(join_error) => println!("{}", join_error.to_string().red()),
    }
}
