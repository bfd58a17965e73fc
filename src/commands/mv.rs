use super::{cp::copy_tasks, load_project, rm::remove_tasks};
use crate::{libs::messages::Message, msg_success};
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct MvArgs {
    /// Ids of the tasks to move
    #[arg(required = true)]
    ids: Vec<String>,

    /// Destination project directory, relative to the root
    #[arg(short, long)]
    to: PathBuf,
}

/// Copies the tasks, then deletes the originals once every copy is on disk.
pub fn cmd(root: &Path, mv_args: MvArgs) -> Result<()> {
    let mut tree = load_project(root)?;
    let moved = copy_tasks(&tree, &root.join(&mv_args.to), &mv_args.ids)?;
    remove_tasks(&mut tree, &mv_args.ids)?;

    for (from, to) in moved {
        msg_success!(Message::TaskMoved(from, to));
    }
    Ok(())
}
