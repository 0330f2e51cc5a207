//! Plume CLI
//!
//! Command-line interface for Plume - block-based local-first notes.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use plume_core::{KeywordTagger, Store};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "plume")]
#[command(about = "Plume - local-first block-based notes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new document
    #[command(alias = "add")]
    Create {
        /// Initial content
        content: String,
        /// Tags to add
        #[arg(short, long)]
        tag: Vec<String>,
    },
    /// List documents
    #[command(alias = "ls")]
    List {
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Include archived documents
        #[arg(long)]
        all: bool,
        /// Show only archived documents
        #[arg(long, conflicts_with = "all")]
        archived: bool,
    },
    /// Show document details
    Show {
        /// Document ID (full UUID or prefix)
        id: String,
    },
    /// Replace the content of a document's first block
    Edit {
        /// Document ID (full UUID or prefix)
        id: String,
        /// New content
        content: String,
    },
    /// Delete a document
    #[command(alias = "rm")]
    Delete {
        /// Document ID (full UUID or prefix)
        id: String,
    },
    /// Archive a document (kept on disk, hidden from default list)
    Archive {
        /// Document ID (full UUID or prefix)
        id: String,
    },
    /// Restore an archived document
    Unarchive {
        /// Document ID (full UUID or prefix)
        id: String,
    },
    /// Add tags to a document
    Tag {
        /// Document ID (full UUID or prefix)
        id: String,
        /// Tags to add
        tags: Vec<String>,
    },
    /// List all tags
    Tags,
    /// Show store status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, author)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return commands::config::handle(command.clone(), &output);
    }

    let store = Store::open(Arc::new(KeywordTagger))?;

    match cli.command {
        Commands::Create { content, tag } => {
            commands::doc::create(&store, content, tag, &output).await
        }
        Commands::List { tag, all, archived } => {
            commands::doc::list(&store, tag, all, archived, &output).await
        }
        Commands::Show { id } => commands::doc::show(&store, id, &output).await,
        Commands::Edit { id, content } => commands::doc::edit(&store, id, content, &output).await,
        Commands::Delete { id } => commands::doc::delete(&store, id, &output).await,
        Commands::Archive { id } => commands::doc::archive(&store, id, &output).await,
        Commands::Unarchive { id } => commands::doc::unarchive(&store, id, &output).await,
        Commands::Tag { id, tags } => commands::doc::tag(&store, id, tags, &output).await,
        Commands::Tags => commands::tag::list(&store, &output).await,
        Commands::Status => commands::status::show(&store, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}
