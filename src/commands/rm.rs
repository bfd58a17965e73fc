use super::load_project;
use crate::{
    libs::{messages::Message, project::ProjectTree},
    msg_bail_anyhow, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::Path;

#[derive(Debug, Args)]
pub struct RmArgs {
    /// Ids of the tasks to delete
    #[arg(required = true)]
    ids: Vec<String>,
}

/// Deletes every task in `ids`, or none of them if one is unknown.
pub(crate) fn remove_tasks(tree: &mut ProjectTree, ids: &[String]) -> Result<()> {
    if let Some(missing) = ids.iter().find(|id| tree.node_for_task(id).is_none()) {
        msg_bail_anyhow!(Message::TaskNotFound(missing.clone()));
    }
    for id in ids {
        if let Some(node) = tree.node_for_task_mut(id) {
            node.remove_task(id)?;
        }
    }
    Ok(())
}

pub fn cmd(root: &Path, rm_args: RmArgs) -> Result<()> {
    let mut tree = load_project(root)?;
    remove_tasks(&mut tree, &rm_args.ids)?;
    for id in rm_args.ids {
        msg_success!(Message::TaskRemoved(id));
    }
    Ok(())
}
