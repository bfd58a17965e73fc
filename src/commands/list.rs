use super::load_project;
use crate::{
    libs::{filter::Filter, messages::Message, view::View},
    msg_error_anyhow, msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;
use std::path::Path;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter expression, e.g. `t.stage == "todo" and "urgent" in t.tags`
    filter: Option<String>,

    /// Show task counts per project instead of the tasks
    #[arg(short, long)]
    summary: bool,

    /// Include projects without matching tasks
    #[arg(short, long)]
    all: bool,
}

pub fn cmd(root: &Path, list_args: ListArgs) -> Result<()> {
    let filter = Filter::parse(list_args.filter.as_deref().unwrap_or_default())
        .map_err(|e| msg_error_anyhow!(Message::FilterInvalid(e.to_string())))?;
    let tree = load_project(root)?;

    let nodes: Vec<_> = tree
        .filtered_tasks(&filter)
        .into_iter()
        .filter(|node| list_args.all || !node.tasks.is_empty())
        .collect();

    if nodes.iter().all(|node| node.tasks.is_empty()) && !list_args.summary {
        msg_info!(Message::TasksNotFound);
        return Ok(());
    }

    if list_args.summary {
        View::projects(&nodes);
        return Ok(());
    }

    let mut total = 0;
    for node in &nodes {
        msg_print!(Message::ProjectHeader(node.project.name().to_string()));
        View::tasks(&node.tasks);
        total += node.tasks.len();
    }
    msg_print!(Message::TasksFoundCount(total), true);
    Ok(())
}
