//! Copies tasks into another project.
//!
//! Copies are new tasks: they get the destination's next id, the current
//! user as creator and today as creation date. Everything else, including
//! the description and custom attributes, is carried over.

use super::load_project;
use crate::{
    libs::{config::Config, messages::Message, project::ProjectTree},
    msg_bail_anyhow, msg_error_anyhow, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CpArgs {
    /// Ids of the tasks to copy
    #[arg(required = true)]
    ids: Vec<String>,

    /// Destination project directory, relative to the root
    #[arg(short, long)]
    to: PathBuf,
}

/// Copies `ids` from `source` into the project at `dest`. Returns pairs of
/// (source id, new id).
pub(crate) fn copy_tasks(source: &ProjectTree, dest: &Path, ids: &[String]) -> Result<Vec<(String, String)>> {
    let creator = Config::read()?
        .username()
        .ok_or_else(|| msg_error_anyhow!(Message::ConfigUsernameMissing))?;

    let mut tasks = Vec::new();
    for id in ids {
        match source.node_for_task(id).and_then(|node| node.task(id)) {
            Some(task) => tasks.push((id, task)),
            None => msg_bail_anyhow!(Message::TaskNotFound(id.clone())),
        }
    }

    let mut dest_tree = load_project(dest)?;
    let mut copied = Vec::new();
    for (id, task) in tasks {
        let new_id = dest_tree.copy_task(task, &creator)?;
        copied.push((id.clone(), new_id));
    }
    Ok(copied)
}

pub fn cmd(root: &Path, cp_args: CpArgs) -> Result<()> {
    let tree = load_project(root)?;
    for (from, to) in copy_tasks(&tree, &root.join(&cp_args.to), &cp_args.ids)? {
        msg_success!(Message::TaskCopied(from, to));
    }
    Ok(())
}
