mod args;
mod commands;

use crate::args::ContextParams;
use args::{Args, Command};
use clap::Parser;
use relato::cache;
use relato::context::{Context, ContextName};
use relato::report::{all_tables, columns_of};

fn main() {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Command::CreateContext(context) => create_context(context).unwrap(),
        Command::UseContext { name } => use_context(name).unwrap(),
        Command::ListContexts => list_contexts().unwrap(),
        Command::Tables => print_tables(),
        Command::Compose => commands::compose::run().unwrap(),
        Command::Sandbox { port } => commands::sandbox::run(port),
    }
}

fn create_context(params: ContextParams) -> Result<(), relato::Error> {
    let use_it = params.use_it;
    let new_context: Context = params.into();

    cache::write(&new_context)?;

    println!("Create new context \x1b[1m{}\x1b[0m.", new_context.name);

    if use_it {
        use_context(new_context.name.into())?;
    } else {
        println!(
            "Switch to it by running \x1b[1mrelato use-context {}\x1b[0m.",
            new_context.name
        );
    }

    Ok(())
}

fn use_context(name: String) -> Result<(), relato::Error> {
    let context_name: ContextName = name.into();

    cache::write(&context_name)?;

    println!("Switched to context \x1b[1m{}\x1b[0m.", context_name);

    Ok(())
}

fn list_contexts() -> Result<(), relato::Error> {
    use colored::Colorize;

    let current_context = ContextName::current()?;
    let known_contexts: Vec<Context> = cache::read_all()?;

    println!("Available contexts:");
    for context in &known_contexts {
        println!(
            "{}{}: {}",
            if current_context == context.name {
                " * ".bold()
            } else {
                "   ".into()
            },
            context.name.to_string().bold(),
            context.gateway,
        )
    }

    Ok(())
}

fn print_tables() {
    use colored::Colorize;

    for table in all_tables() {
        println!("{}", table.to_string().bold());

        for column in columns_of(table) {
            println!("    {column}");
        }
    }
}
