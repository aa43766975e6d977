mod cmd;
mod output;
mod settings;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, query::QuerySubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "neem",
    about = "Record, load and query NEEMs in a KnowRob knowledge base",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./neem.yaml if present)
    #[arg(long, global = true, env = "NEEM_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the rosprolog service, overriding the config file
    #[arg(long, global = true, env = "NEEM_REASONER_URL")]
    reasoner_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the REST interface
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a raw Prolog goal against the reasoner
    Query {
        #[command(subcommand)]
        subcommand: QuerySubcommand,
    },

    /// Load a recorded NEEM directory into the knowledge base
    Load {
        /// NEEM directory as seen by the reasoner
        path: String,
    },

    /// List the actions in the knowledge base
    Actions {
        /// Only actions of this type, e.g. soma:'Pouring'
        #[arg(long = "type", value_name = "TYPE")]
        action_type: Option<String>,
    },

    /// List the states in the knowledge base
    States,

    /// List the canned NEEM-data queries, or run one by name
    Data {
        /// Query name (omit to list all)
        name: Option<String>,
    },

    /// Clear the reasoner's belief state
    Clear,

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = settings::resolve_config(cli.config.as_deref(), cli.reasoner_url.as_deref())
        .and_then(|mut config| match cli.command {
            Commands::Serve { host, port } => {
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }
                cmd::serve::run(&config)
            }
            Commands::Query { subcommand } => cmd::query::run(&config, subcommand, cli.json),
            Commands::Load { path } => cmd::neem::load(&config, &path, cli.json),
            Commands::Actions { action_type } => {
                cmd::neem::actions(&config, action_type.as_deref(), cli.json)
            }
            Commands::States => cmd::neem::states(&config, cli.json),
            Commands::Data { name } => cmd::data::run(&config, name.as_deref(), cli.json),
            Commands::Clear => cmd::neem::clear(&config, cli.json),
            Commands::Config { subcommand } => cmd::config::run(&config, subcommand, cli.json),
        });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
