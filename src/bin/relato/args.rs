use clap::{Parser, Subcommand};
use relato::context::{Context, GatewayParams};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Creates a context.
    ///
    /// Contexts allow the relato command to switch between different
    /// execution services.
    CreateContext(ContextParams),
    /// Selects an existing context.
    UseContext { name: String },
    /// List available contexts.
    ListContexts,
    /// Prints the reporting schema: every table and the columns it exposes.
    Tables,
    /// Interactively assembles a report and runs it against the current
    /// context.
    Compose,
    /// Runs a local execution service over a small sample dataset, for
    /// composing reports without the real backend.
    Sandbox {
        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
    },
}

#[derive(clap::Args, Debug)]
pub struct ContextParams {
    /// You can reuse your context by referencing this name
    name: String,

    /// Base URL of the execution service, e.g. http://127.0.0.1:5000/
    #[arg(long = "url")]
    base_url: String,

    /// Use the new context
    #[arg(long = "use")]
    pub use_it: bool,
}

impl From<ContextParams> for Context {
    fn from(value: ContextParams) -> Self {
        Context {
            name: value.name.into(),
            gateway: GatewayParams {
                base_url: value.base_url,
            },
        }
    }
}
