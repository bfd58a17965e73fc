//! Error taxonomy for the task store.
//!
//! Every fallible core operation returns [`Result`]. Command handlers wrap
//! these into `anyhow::Error` and print them through the message macros.

use crate::libs::project::ProjectTree;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// One entry that failed while a project tree was being loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: Error,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("The key \"{0}\" is not a valid identifier")]
    InvalidKey(String),

    #[error("The date \"{0}\" could not be parsed")]
    DateParse(String),

    #[error("The duration \"{0}\" could not be parsed")]
    DurationParse(String),

    #[error("The recurrence rule \"{rule}\" is invalid: {reason}")]
    RecurrenceParse { rule: String, reason: String },

    #[error("Malformed task document: {0}")]
    MalformedDocument(String),

    #[error("Invalid task attributes: {}", .0.join(", "))]
    InvalidAttributes(Vec<String>),

    #[error("Task \"{title}\" could not be corrected: {reason}")]
    UncorrectableTask { title: String, reason: String },

    #[error("{} entries failed to load under {}:\n{}", failures.len(), path.display(), summarize(failures))]
    AggregateLoad {
        path: PathBuf,
        failures: Vec<LoadFailure>,
        partial: Box<ProjectTree>,
    },

    #[error("Location {} is already host to a project", .0.display())]
    AlreadyExists(PathBuf),

    #[error("The project template is invalid: {0}")]
    InvalidTemplate(String),

    #[error("Edit of task {id} was rejected, your text was saved to {}: {source}", backup.display())]
    EditRejected {
        id: String,
        backup: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("Invalid filter at position {position}: {message}")]
    FilterParse { position: usize, message: String },

    #[error("Neither the VISUAL nor the EDITOR environment variable is set")]
    NoEditor,

    #[error("Editor \"{editor}\" exited with {status}")]
    EditorFailed { editor: String, status: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Takes the partially loaded tree out of an aggregate load failure.
    pub fn into_partial(self) -> Option<(ProjectTree, Vec<LoadFailure>)> {
        match self {
            Error::AggregateLoad { partial, failures, .. } => Some((*partial, failures)),
            _ => None,
        }
    }
}

fn summarize(failures: &[LoadFailure]) -> String {
    failures.iter().map(|f| format!("  {}", f)).collect::<Vec<_>>().join("\n")
}
