//! Todo CLI
//!
//! Runs the todo HTTP server and offers maintenance commands for its
//! commit log.
//!
//! # Commands
//!
//! - `serve` - Run the HTTP API
//! - `list` - Print the items stored in a log file
//! - `compact` - Rewrite a log file down to its live items
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use todo_core::SortDirection;
use todo_server::{init_logging, LoggingConfig};

/// Todo list server and tools.
#[derive(Parser)]
#[command(name = "todo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to bind to (overrides the config file)
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Commit log file (overrides the config file)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Directory of static assets to serve
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Allow cross-origin requests
        #[arg(long)]
        cors: bool,
    },

    /// Print the items stored in a commit log
    List {
        /// Commit log file
        #[arg(short, long)]
        data: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Sort direction by order value
        #[arg(short, long, value_enum, default_value_t = SortArg::Desc)]
        sort: SortArg,
    },

    /// Rewrite a commit log down to its live items
    Compact {
        /// Commit log file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Show version information
    Version,
}

/// Output format for `list`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per item.
    Text,
    /// A JSON array.
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortDirection {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortDirection::Asc,
            SortArg::Desc => SortDirection::Desc,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            bind,
            data,
            assets,
            cors,
        } => {
            let overrides = commands::serve::Overrides {
                bind,
                data,
                assets,
                cors,
            };
            let config = commands::serve::load_config(config.as_deref(), overrides)?;
            init_logging(&config.logging, cli.verbose);
            commands::serve::run(config)?;
        }
        Commands::List { data, format, sort } => {
            init_logging(&LoggingConfig::default(), cli.verbose);
            commands::list::run(&data, format, sort.into())?;
        }
        Commands::Compact { data } => {
            init_logging(&LoggingConfig::default(), cli.verbose);
            commands::compact::run(&data)?;
        }
        Commands::Version => {
            println!("todo v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
