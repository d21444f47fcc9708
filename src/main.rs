use clap::{Parser, Subcommand};
use relgraph::error::Result;

mod cli;

#[derive(Parser)]
#[command(name = "relgraph")]
#[command(version = "0.1.0")]
#[command(about = "Generate GraphQL schemas from ORM models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an example configuration (and optionally example data)
    Init {
        /// Output config file path (if not specified, outputs to stdout)
        #[arg(long)]
        output: Option<String>,

        /// Output path for example JSON rows
        #[arg(long)]
        data: Option<String>,
    },

    /// Print the generated schema as SDL
    Sdl {
        /// Config file path
        #[arg(long, default_value = "relgraph.toml")]
        config: String,

        /// Leave out the root query fields
        #[arg(long)]
        no_query_fields: bool,
    },

    /// Execute a GraphQL query against rows from a JSON file
    Query {
        /// Config file path
        #[arg(long, default_value = "relgraph.toml")]
        config: String,

        /// JSON data file of table name to rows
        #[arg(long)]
        data: String,

        /// GraphQL query document
        query: String,
    },

    /// Validate a JSON payload against a generated input type
    Validate {
        /// Config file path
        #[arg(long, default_value = "relgraph.toml")]
        config: String,

        /// Input type name (e.g. EmployeeCreateInput)
        #[arg(long)]
        input: String,

        /// JSON object payload
        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output, data } => {
            cli::init::run(output, data).await?;
        }
        Commands::Sdl { config, no_query_fields } => {
            cli::sdl::run(config, !no_query_fields).await?;
        }
        Commands::Query { config, data, query } => {
            cli::query::run(config, data, query).await?;
        }
        Commands::Validate { config, input, payload } => {
            cli::validate::run(config, input, payload).await?;
        }
    }

    Ok(())
}
