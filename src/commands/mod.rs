pub mod add;
pub mod config;
pub mod cp;
pub mod edit;
pub mod events;
pub mod init;
pub mod list;
pub mod mv;
pub mod rm;

use crate::libs::error::Error;
use crate::libs::messages::Message;
use crate::libs::project::ProjectTree;
use crate::{msg_bail_anyhow, msg_warning};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Create a project, or a subproject inside an existing one")]
    Init(init::InitArgs),
    #[command(about = "Create a task", arg_required_else_help = true)]
    Add(add::AddArgs),
    #[command(about = "List tasks matching a filter")]
    List(list::ListArgs),
    #[command(about = "Edit a task in your editor", arg_required_else_help = true)]
    Edit(edit::EditArgs),
    #[command(about = "Copy tasks into another project", arg_required_else_help = true)]
    Cp(cp::CpArgs),
    #[command(about = "Move tasks into another project", arg_required_else_help = true)]
    Mv(mv::MvArgs),
    #[command(about = "Delete tasks", arg_required_else_help = true)]
    Rm(rm::RmArgs),
    #[command(about = "Show tasks that fall on the calendar")]
    Events(events::EventsArgs),
    #[command(about = "Set up username, email and editor")]
    Config,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    /// Project directory to work in
    #[arg(short = 'C', long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(&cli.root, args),
            Commands::Add(args) => add::cmd(&cli.root, args),
            Commands::List(args) => list::cmd(&cli.root, args),
            Commands::Edit(args) => edit::cmd(&cli.root, args),
            Commands::Cp(args) => cp::cmd(&cli.root, args),
            Commands::Mv(args) => mv::cmd(&cli.root, args),
            Commands::Rm(args) => rm::cmd(&cli.root, args),
            Commands::Events(args) => events::cmd(&cli.root, args),
            Commands::Config => config::cmd(),
        }
    }
}

/// Loads the project at `root`. Entries that fail to load are reported and
/// the rest of the tree is used.
pub(crate) fn load_project(root: &Path) -> Result<ProjectTree> {
    match ProjectTree::load_from_disk(root) {
        Ok(Some(tree)) => Ok(tree),
        Ok(None) => msg_bail_anyhow!(Message::ProjectNotFound(root.display().to_string())),
        Err(Error::AggregateLoad { failures, partial, .. }) => {
            msg_warning!(Message::ProjectLoadedWithErrors(failures.len()));
            for failure in &failures {
                msg_warning!(Message::ProjectLoadFailure(
                    failure.path.display().to_string(),
                    failure.error.to_string()
                ));
            }
            Ok(*partial)
        }
        Err(error) => Err(error.into()),
    }
}
