//! Display implementation for application messages.
//!
//! All user-facing text lives here so the wording stays consistent across
//! commands. Parameters are interpolated from the message variant.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === PROJECT MESSAGES ===
            Message::ProjectInitialized(path) => format!("Project initialized in {}", path),
            Message::ProjectAlreadyExists(path) => format!("A project already exists in {} (use --force to overwrite)", path),
            Message::ProjectNotFound(path) => format!("No project found in {}. Run `master init` first", path),
            Message::SubprojectCreated(name) => format!("Subproject '{}' created", name),
            Message::SubprojectNotFound(name) => format!("Subproject '{}' not found", name),
            Message::ProjectLoadedWithErrors(count) => format!("Project loaded, but {} file(s) could not be read", count),
            Message::ProjectLoadFailure(path, error) => format!("{}: {}", path, error),
            Message::ProjectHeader(name) => format!("📁 {}", name),

            // === TASK MESSAGES ===
            Message::TaskCreated(id) => format!("Task {} created", id),
            Message::TaskUpdated(id) => format!("Task {} updated", id),
            Message::TaskUnchanged(id) => format!("Task {} unchanged", id),
            Message::TaskNotFound(id) => format!("Task {} not found", id),
            Message::TaskRemoved(id) => format!("Task {} removed", id),
            Message::TaskCopied(from, to) => format!("Task {} copied to {}", from, to),
            Message::TaskMoved(from, to) => format!("Task {} moved to {}", from, to),
            Message::TaskEditRejected(id, backup) => {
                format!("Edit of task {} was rejected, your text was saved to {}", id, backup)
            }
            Message::TaskEditRejectedReason(reason) => format!("Reason: {}", reason),
            Message::TasksNotFound => "No tasks match".to_string(),
            Message::TasksFoundCount(count) => format!("{} task(s)", count),

            // === EVENT MESSAGES ===
            Message::EventsHeader => "📅 Calendar".to_string(),
            Message::EventsNotFound => "No tasks with a due date or event start".to_string(),
            Message::EventSkipped(id, reason) => format!("Skipped {}: {}", id, reason),

            // === FILTER MESSAGES ===
            Message::FilterInvalid(error) => format!("Invalid filter: {}", error),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleUser => "User settings".to_string(),
            Message::ConfigUsernameMissing => "No username configured. Run `master config` or pass --owner".to_string(),

            // === EDITOR MESSAGES ===
            Message::EditorNotConfigured => "No editor configured. Set $EDITOR or run `master config`".to_string(),

            // === PROMPTS ===
            Message::PromptUsername => "Username".to_string(),
            Message::PromptEmail => "Email".to_string(),
            Message::PromptEditor => "Editor command (empty to use $EDITOR)".to_string(),
            Message::PromptTaskTitle => "Task title".to_string(),
            Message::PromptTaskDescription => "Description".to_string(),
        };

        write!(f, "{}", text)
    }
}
