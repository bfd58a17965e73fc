//! Project initialization command.
//!
//! Without a path the root directory becomes a project. With a path inside
//! an existing project, the new directory is registered as a subproject of
//! it and inherits nothing but its location.

use super::load_project;
use crate::{
    libs::{
        config::Config,
        messages::Message,
        project::ProjectTree,
        settings::PROJECT_FILE_NAME,
        templates::ProjectTemplate,
    },
    msg_bail_anyhow, msg_error_anyhow, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory of the new project, relative to the root
    path: Option<PathBuf>,

    /// Built-in settings template
    #[arg(short, long, value_enum, default_value_t = ProjectTemplate::Default)]
    template: ProjectTemplate,

    /// Settings template file, used instead of --template
    #[arg(long)]
    template_file: Option<PathBuf>,

    /// Project owner, defaults to the configured username
    #[arg(short, long)]
    owner: Option<String>,

    /// Overwrite existing project settings
    #[arg(short, long)]
    force: bool,
}

pub fn cmd(root: &Path, init_args: InitArgs) -> Result<()> {
    let path = match &init_args.path {
        Some(path) => root.join(path),
        None => root.to_path_buf(),
    };
    if path.join(PROJECT_FILE_NAME).exists() && !init_args.force {
        msg_bail_anyhow!(Message::ProjectAlreadyExists(path.display().to_string()));
    }

    let owner = match init_args.owner {
        Some(owner) => owner,
        None => Config::read()?
            .username()
            .ok_or_else(|| msg_error_anyhow!(Message::ConfigUsernameMissing))?,
    };
    let template = match &init_args.template_file {
        Some(file) => fs::read_to_string(file)?,
        None => init_args.template.text().to_string(),
    };

    let parent = init_args
        .path
        .as_ref()
        .and(path.parent())
        .filter(|parent| parent.join(PROJECT_FILE_NAME).exists());
    let name = path.file_name().map(|name| name.to_string_lossy().into_owned());

    match (parent, name) {
        (Some(parent), Some(name)) if !init_args.force => {
            let mut tree = load_project(parent)?;
            let child = tree.add_project(&name, &owner, Some(&template))?;
            msg_success!(Message::SubprojectCreated(child.name().to_string()));
        }
        _ => {
            let tree = ProjectTree::init_on_disk(&path, &owner, Some(&template), init_args.force)?;
            msg_success!(Message::ProjectInitialized(tree.path().display().to_string()));
        }
    }
    Ok(())
}
