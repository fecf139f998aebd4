//! Tome CLI - Document ingestion and versioned knowledge store.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tome - Document ingestion and versioned knowledge store
#[derive(Parser)]
#[command(name = "tome")]
#[command(version)]
#[command(about = "Document ingestion and versioned knowledge store", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Tome (create config and store)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Ingest a file or directory
    Ingest {
        /// Path to file or directory to ingest
        path: String,

        /// Show what would be ingested without actually ingesting
        #[arg(long)]
        dry_run: bool,
    },

    /// Watch configured directories for document changes
    #[command(subcommand)]
    Watch(WatchCommands),

    /// List stored documents
    List,

    /// Full-text search over stored chunks
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Remove a document and all its versions
    Remove {
        /// Source path or doc id of the document
        target: String,
    },

    /// Show store statistics
    Status,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Add a directory to watch
    AddWatch {
        /// Directory path
        path: String,
    },
}

#[derive(Subcommand)]
enum WatchCommands {
    /// Start watching (foreground, Ctrl+C to stop)
    Start,

    /// Show watch configuration and status
    Status,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tome=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tome=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::AddWatch { path } => commands::config::add_watch(&path),
        },
        Commands::Ingest { path, dry_run } => commands::ingest::run(&path, dry_run),
        Commands::Watch(cmd) => match cmd {
            WatchCommands::Start => commands::watch::run(),
            WatchCommands::Status => commands::watch::status(),
        },
        Commands::List => commands::list::run(),
        Commands::Search { query, limit } => commands::search::run(&query, limit),
        Commands::Remove { target } => commands::remove::run(&target),
        Commands::Status => commands::status::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
