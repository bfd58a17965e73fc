//! Per-project settings document (`project.json`).
//!
//! Every project directory carries one settings document. Its presence is
//! what makes a directory a project. The document names the project, the
//! prefix for task IDs, the owners, and the attributes each new task
//! starts with.

use crate::libs::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of the settings document inside a project directory.
pub const PROJECT_FILE_NAME: &str = "project.json";

/// Owners may be written as a single name or as a list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Owners {
    One(String),
    Many(Vec<String>),
}

impl Owners {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Owners::One(owner) => vec![owner.clone()],
            Owners::Many(owners) => owners.clone(),
        }
    }
}

impl Default for Owners {
    fn default() -> Self {
        Owners::Many(Vec::new())
    }
}

/// Default attributes: either bare names or names with default values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum DefaultAttributes {
    Names(Vec<String>),
    Values(BTreeMap<String, Option<String>>),
}

impl Default for DefaultAttributes {
    fn default() -> Self {
        DefaultAttributes::Names(Vec::new())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ProjectSettings {
    pub project_name: String,

    pub task_prefix: String,

    #[serde(default)]
    pub owners: Owners,

    #[serde(default)]
    pub default_attributes: DefaultAttributes,

    /// Values for names listed in `default_attributes`, used by profiles
    /// that keep names and values apart.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_attribute_values: BTreeMap<String, String>,

    /// Anything else in the document, kept as written.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProjectSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidTemplate(e.to_string()))
    }

    /// Reads the settings document of `dir`, or `None` if it has none.
    pub fn read(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(PROJECT_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    pub fn owners(&self) -> Vec<String> {
        self.owners.to_vec()
    }

    /// Every default attribute with its default value (empty when unset).
    pub fn defaults(&self) -> BTreeMap<String, String> {
        let mut defaults: BTreeMap<String, String> = match &self.default_attributes {
            DefaultAttributes::Names(names) => names.iter().map(|n| (n.clone(), String::new())).collect(),
            DefaultAttributes::Values(values) => values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().unwrap_or_default()))
                .collect(),
        };
        for (key, value) in &self.default_attribute_values {
            defaults.insert(key.clone(), value.clone());
        }
        defaults
    }

    /// The prefix without trailing underscores: `DEMO_` gives `DEMO`.
    pub fn id_stem(&self) -> &str {
        self.task_prefix.trim_end_matches('_')
    }
}

/// Derives a task prefix from a project name.
///
/// A single word is uppercased, several words joined by `-` or `_` give
/// their uppercased initials. The prefix always ends with `_`.
pub fn derive_prefix(project_name: &str) -> String {
    let words: Vec<&str> = project_name.split(['-', '_']).filter(|w| !w.is_empty()).collect();
    let stem: String = match words.as_slice() {
        [] => "TASK".to_string(),
        [word] => word.to_uppercase(),
        many => many.iter().filter_map(|w| w.chars().next()).collect::<String>().to_uppercase(),
    };
    format!("{}_", stem)
}
