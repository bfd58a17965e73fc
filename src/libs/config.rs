//! Per-user configuration.
//!
//! Stored as `config.json` in the platform data directory:
//!
//! - **Linux**: `~/.local/share/master/master/config.json`
//! - **macOS**: `~/Library/Application Support/master/master/config.json`
//! - **Windows**: `%LOCALAPPDATA%\master\master\config.json`
//!
//! `MASTER_DATA_DIR` overrides the directory.
//!
//! ```rust,no_run
//! use master::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.editor = Some("vim".to_string());
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Recorded as `creator` on new tasks and as owner of new projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Editor command. `$EDITOR` and `$VISUAL` are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Config {
    /// Reads the configuration, or the default one if none was saved yet.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// The configured username, else the login name from the environment.
    pub fn username(&self) -> Option<String> {
        self.username
            .clone()
            .or_else(|| env::var("USER").ok())
            .or_else(|| env::var("USERNAME").ok())
            .filter(|name| !name.trim().is_empty())
    }

    /// Interactive setup, prefilled with the current values.
    pub fn init() -> Result<Self> {
        let current = Self::read().unwrap_or_default();

        msg_print!(Message::ConfigModuleUser);
        let username: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptUsername.to_string())
            .default(current.username().unwrap_or_default())
            .interact_text()?;
        let email: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptEmail.to_string())
            .default(current.email.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        let editor: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptEditor.to_string())
            .default(current.editor.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;

        let non_empty = |value: String| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        Ok(Config {
            username: non_empty(username),
            email: non_empty(email),
            editor: non_empty(editor),
        })
    }
}
