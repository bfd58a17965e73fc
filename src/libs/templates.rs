//! Built-in starter documents for new projects.
//!
//! Placeholders are substituted when a project is initialized:
//!
//! - `__DEFAULT_OWNER`: the user creating the project
//! - `__DEFAULT_PROJECT_NAME`: the directory name
//! - `__DEFAULT_PREFIX`: a task prefix derived from the name

pub const OWNER_PLACEHOLDER: &str = "__DEFAULT_OWNER";
pub const NAME_PLACEHOLDER: &str = "__DEFAULT_PROJECT_NAME";
pub const PREFIX_PLACEHOLDER: &str = "__DEFAULT_PREFIX";

const DEFAULT: &str = r#"{
  "owners": "__DEFAULT_OWNER",
  "project_name": "__DEFAULT_PROJECT_NAME",
  "task_prefix": "__DEFAULT_PREFIX",
  "default_attributes": ["creation_date", "creator", "id", "project", "stage", "tags"],
  "default_attribute_values": {
    "stage": "todo"
  }
}
"#;

const AGILE: &str = r#"{
  "owners": ["__DEFAULT_OWNER"],
  "project_name": "__DEFAULT_PROJECT_NAME",
  "task_prefix": "__DEFAULT_PREFIX",
  "default_attributes": {
    "assignee": null,
    "sprint": null,
    "estimate": null,
    "time_spent": null,
    "resolution": null,
    "stage": "todo",
    "type": "story",
    "value": null
  },
  "project_start_date": "today",
  "current_sprint": 1,
  "sprint_duration": "2 weeks",
  "completed_milestones": ["project started"]
}
"#;

const CALENDAR: &str = r#"{
  "owners": ["__DEFAULT_OWNER"],
  "project_name": "__DEFAULT_PROJECT_NAME",
  "task_prefix": "__DEFAULT_PREFIX",
  "default_attributes": {
    "event_begin": null,
    "event_end": null,
    "duration": null,
    "recurring": null,
    "recurring_stop": null,
    "stage": "todo"
  }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ProjectTemplate {
    /// General-purpose tasks with a stage
    #[default]
    Default,
    /// Stories and epics with sprint, estimate and resolution fields
    Agile,
    /// Schedule-oriented events that project onto a calendar
    Calendar,
}

impl ProjectTemplate {
    pub fn text(&self) -> &'static str {
        match self {
            ProjectTemplate::Default => DEFAULT,
            ProjectTemplate::Agile => AGILE,
            ProjectTemplate::Calendar => CALENDAR,
        }
    }
}

/// Substitutes the placeholders in a template.
pub fn render(template: &str, owner: &str, project_name: &str, prefix: &str) -> String {
    template
        .replace(OWNER_PLACEHOLDER, owner)
        .replace(NAME_PLACEHOLDER, project_name)
        .replace(PREFIX_PLACEHOLDER, prefix)
}
