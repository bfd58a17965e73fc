use super::load_project;
use crate::{
    libs::{config::Config, editor::Editor, error::Error, messages::Message},
    msg_bail_anyhow, msg_error, msg_error_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::Path;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Id of the task, e.g. DEMO_3
    id: String,

    /// Editor command, overrides the configured one
    #[arg(short, long)]
    editor: Option<String>,
}

pub fn cmd(root: &Path, edit_args: EditArgs) -> Result<()> {
    let config = Config::read()?;
    let editor = Editor::resolve(edit_args.editor.as_deref().or(config.editor.as_deref()))
        .map_err(|_| msg_error_anyhow!(Message::EditorNotConfigured))?;

    let mut tree = load_project(root)?;
    let Some(node) = tree.node_for_task_mut(&edit_args.id) else {
        msg_bail_anyhow!(Message::TaskNotFound(edit_args.id));
    };

    match node.edit_task(&edit_args.id, &editor) {
        Ok(true) => msg_success!(Message::TaskUpdated(edit_args.id)),
        Ok(false) => msg_info!(Message::TaskUnchanged(edit_args.id)),
        Err(Error::EditRejected { id, backup, source }) => {
            msg_error!(Message::TaskEditRejected(id, backup.display().to_string()));
            msg_bail_anyhow!(Message::TaskEditRejectedReason(source.to_string()));
        }
        Err(error) => return Err(error.into()),
    }
    Ok(())
}
