//! Shelf CLI
//!
//! Command-line interface for Shelf - personal library tracking.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use shelf_core::{Catalog, Config, SearchField, StorageError, DEFAULT_GENRE};

mod commands;
mod logging;
mod output;
mod prompt;

use commands::book::{AddArgs, Target};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - Personal library tracker")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book to the library
    Add {
        /// Book title
        title: String,
        /// Author name
        author: String,
        /// Publication year
        #[arg(short, long, allow_negative_numbers = true)]
        year: i32,
        /// Genre (Fiction, Non-Fiction, Science, Technology, History, Romance, Poetry)
        #[arg(short, long, default_value = DEFAULT_GENRE)]
        genre: String,
        /// Mark the book as already read
        #[arg(short, long)]
        read: bool,
    },
    /// List all books (default)
    #[command(alias = "ls")]
    List,
    /// Show book details
    Show {
        /// Book ID (full UUID or prefix)
        id: String,
    },
    /// Remove a book
    #[command(alias = "rm")]
    Remove {
        /// Book ID (full UUID or prefix)
        #[arg(required_unless_present = "position", conflicts_with = "position")]
        id: Option<String>,
        /// Position as shown by `shelf list`
        #[arg(short, long)]
        position: Option<usize>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Toggle a book between read and unread
    Toggle {
        /// Book ID (full UUID or prefix)
        #[arg(required_unless_present = "position", conflicts_with = "position")]
        id: Option<String>,
        /// Position as shown by `shelf list`
        #[arg(short, long)]
        position: Option<usize>,
    },
    /// Search books by title, author or genre
    Search {
        /// Text to look for (case-insensitive)
        term: String,
        /// Field to search
        #[arg(short, long, value_enum, default_value_t = SearchBy::Title)]
        by: SearchBy,
    },
    /// Show library statistics
    Stats,
    /// Show storage location and counts
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
        /// Configuration key (data_dir, library_file, min_year, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SearchBy {
    Title,
    Author,
    Genre,
}

impl From<SearchBy> for SearchField {
    fn from(by: SearchBy) -> Self {
        match by {
            SearchBy::Title => SearchField::Title,
            SearchBy::Author => SearchField::Author,
            SearchBy::Genre => SearchField::Genre,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let hint = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<StorageError>())
                .and_then(StorageError::recovery_suggestion);
            if let Some(hint) = hint {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work even when the config file can't be used for a library
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(&config, cli.verbose);

    let mut catalog = Catalog::open(&config);
    for warning in catalog.warnings() {
        output.warn(warning);
    }

    match cli.command.unwrap_or(Commands::List) {
        Commands::Add {
            title,
            author,
            year,
            genre,
            read,
        } => {
            let args = AddArgs {
                title,
                author,
                year,
                genre,
                read,
            };
            commands::book::add(&mut catalog, &config, args, &output)
        }
        Commands::List => commands::book::list(&catalog, &output),
        Commands::Show { id } => commands::book::show(&catalog, id, &output),
        Commands::Remove { id, position, yes } => {
            let target = Target::from_args(id, position)?;
            commands::book::remove(&mut catalog, target, yes, &output)
        }
        Commands::Toggle { id, position } => {
            let target = Target::from_args(id, position)?;
            commands::book::toggle(&mut catalog, target, &output)
        }
        Commands::Search { term, by } => {
            commands::book::search(&catalog, term, by.into(), &output)
        }
        Commands::Stats => commands::stats::show(&catalog, &output),
        Commands::Status => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            commands::status::show(&catalog, &config, &effective_path, &output)
        }
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
