//! Changelists CLI - cl command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod diff_utils;
mod locks;
mod logging;
mod util;

/// Changelists - group working tree changes and shelve them as patches
#[derive(Parser)]
#[command(name = "cl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase stderr log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a changelist workspace at the top of the git repository
    Init,
    /// Show changelists and their files
    Status {
        /// Print flat paths instead of a folder tree
        #[arg(long)]
        flat: bool,
    },
    /// Reconcile changelists with the working tree
    Refresh,
    /// Manage changelists
    #[command(subcommand)]
    Changelist(ChangelistCommands),
    /// Move files into a changelist
    Move {
        /// Files to move
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Target changelist (id, id prefix, or name)
        #[arg(long)]
        to: String,
    },
    /// Shelve the changes of a changelist (default: the active one)
    Shelve {
        /// Changelist to shelve (id, id prefix, or name)
        changelist: Option<String>,
        /// Shelf name (default: shelf.default_name)
        #[arg(short, long)]
        name: Option<String>,
        /// Shelf description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Apply a shelf to the working tree
    Unshelve {
        /// Shelf (id, id prefix, or name)
        shelf: String,
        /// Changelist receiving the files (default: the active one)
        #[arg(long)]
        into: Option<String>,
        /// Delete the shelf once applied
        #[arg(long)]
        remove: bool,
    },
    /// Manage shelves
    #[command(subcommand)]
    Shelf(ShelfCommands),
    /// View and edit workspace configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ChangelistCommands {
    /// List changelists
    List,
    /// Create a changelist
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Make the new changelist active
        #[arg(long)]
        activate: bool,
    },
    /// Delete a changelist; its files move to the active one
    Delete {
        changelist: String,
    },
    /// Make a changelist the active one
    Activate {
        changelist: String,
    },
    /// Rename a changelist
    Rename {
        changelist: String,
        name: String,
    },
    /// Set or clear a changelist description
    Describe {
        changelist: String,
        /// New description (omit to clear)
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum ShelfCommands {
    /// List shelves, newest first
    List,
    /// Show a shelf and its patch
    Show {
        shelf: String,
        /// Print file list only
        #[arg(long)]
        stat: bool,
    },
    /// Delete a shelf and its patch file
    Delete {
        shelf: String,
    },
    /// Write a shelf's patch to a file
    Export {
        shelf: String,
        target: PathBuf,
    },
    /// Register a patch file as a new shelf
    Import {
        source: PathBuf,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a configuration value
    Get {
        /// Dotted key (e.g. reconcile.auto_stage)
        key: String,
    },
    /// Set a configuration value
    Set {
        key: String,
        value: String,
    },
    /// Print the config file path
    Path,
    /// Print an annotated example config
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // File logging only once a workspace exists
    let logs_dir = util::find_workspace().ok().map(|layout| layout.logs_dir());
    let _log_guard = logging::init(cli.verbose, logs_dir.as_deref());

    match cli.command {
        Commands::Init => cmd::init::run().await,
        Commands::Status { flat } => cmd::status::run(flat).await,
        Commands::Refresh => cmd::refresh::run().await,
        Commands::Changelist(changelist_cmd) => match changelist_cmd {
            ChangelistCommands::List => cmd::changelist::run_list().await,
            ChangelistCommands::Create {
                name,
                description,
                activate,
            } => cmd::changelist::run_create(&name, description, activate).await,
            ChangelistCommands::Delete { changelist } => {
                cmd::changelist::run_delete(&changelist).await
            }
            ChangelistCommands::Activate { changelist } => {
                cmd::changelist::run_activate(&changelist).await
            }
            ChangelistCommands::Rename { changelist, name } => {
                cmd::changelist::run_rename(&changelist, &name).await
            }
            ChangelistCommands::Describe {
                changelist,
                description,
            } => cmd::changelist::run_describe(&changelist, description).await,
        },
        Commands::Move { paths, to } => cmd::move_files::run(&paths, &to).await,
        Commands::Shelve {
            changelist,
            name,
            description,
        } => cmd::shelve::run(changelist.as_deref(), name.as_deref(), description).await,
        Commands::Unshelve {
            shelf,
            into,
            remove,
        } => cmd::unshelve::run(&shelf, into.as_deref(), remove).await,
        Commands::Shelf(shelf_cmd) => match shelf_cmd {
            ShelfCommands::List => cmd::shelf::run_list().await,
            ShelfCommands::Show { shelf, stat } => cmd::shelf::run_show(&shelf, stat).await,
            ShelfCommands::Delete { shelf } => cmd::shelf::run_delete(&shelf).await,
            ShelfCommands::Export { shelf, target } => {
                cmd::shelf::run_export(&shelf, &target).await
            }
            ShelfCommands::Import {
                source,
                name,
                description,
            } => cmd::shelf::run_import(&source, &name, description).await,
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list().await,
            ConfigCommands::Get { key } => cmd::config::run_get(&key).await,
            ConfigCommands::Set { key, value } => cmd::config::run_set(&key, &value).await,
            ConfigCommands::Path => cmd::config::run_path().await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
