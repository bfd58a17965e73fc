use super::load_project;
use crate::{
    libs::{attributes::{parse_tags, AttributeMap}, config::Config, messages::Message, project::ProjectTree},
    msg_error_anyhow, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::Path;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task title
    title: Option<String>,

    /// Task description
    #[arg(short, long)]
    description: Option<String>,

    /// Attribute as key=value, repeatable
    #[arg(short, long = "attr", value_name = "KEY=VALUE")]
    attributes: Vec<String>,

    /// Subproject to add the task to, as a path like `backend/api`
    #[arg(short, long)]
    project: Option<String>,

    /// Ask for the title and description
    #[arg(short, long)]
    interactive: bool,
}

fn parse_attributes(pairs: &[String]) -> Result<AttributeMap> {
    let mut attributes = AttributeMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Attribute \"{}\" is not in KEY=VALUE form", pair))?;
        if key.trim() == "tags" {
            attributes.set("tags", parse_tags(value))?;
        } else {
            attributes.set(key.trim(), value.trim())?;
        }
    }
    Ok(attributes)
}

fn find_node<'a>(tree: &'a mut ProjectTree, project: Option<&str>) -> Result<&'a mut ProjectTree> {
    let mut node = tree;
    for name in project.unwrap_or_default().split('/').filter(|n| !n.is_empty()) {
        node = node
            .project_mut(name)
            .ok_or_else(|| msg_error_anyhow!(Message::SubprojectNotFound(name.to_string())))?;
    }
    Ok(node)
}

pub fn cmd(root: &Path, add_args: AddArgs) -> Result<()> {
    let creator = Config::read()?
        .username()
        .ok_or_else(|| msg_error_anyhow!(Message::ConfigUsernameMissing))?;

    let (title, description) = if add_args.interactive || add_args.title.is_none() {
        let title: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptTaskTitle.to_string())
            .default(add_args.title.clone().unwrap_or_default())
            .interact_text()?;
        let description: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptTaskDescription.to_string())
            .default(add_args.description.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        (title, description)
    } else {
        (add_args.title.unwrap_or_default(), add_args.description.unwrap_or_default())
    };

    let attributes = parse_attributes(&add_args.attributes)?;
    let mut tree = load_project(root)?;
    let node = find_node(&mut tree, add_args.project.as_deref())?;
    let id = node.create_task(&creator, &title, &description, &attributes)?;

    msg_success!(Message::TaskCreated(id));
    Ok(())
}
