//! Core library modules.
//!
//! - **Documents**: attributes, dates, tasks and their structured text
//! - **Projects**: settings, templates, the on-disk project tree
//! - **Queries**: filters and the calendar projection
//! - **Infrastructure**: errors, user configuration, data storage, editor
//!   sessions, messages, table output
//!
//! ```rust
//! use master::libs::task::Task;
//!
//! let task = Task::from_structured_text("=======\n Title\n=======\n\nstage: todo\n")?;
//! assert_eq!(task.title, "Title");
//! # Ok::<(), master::libs::error::Error>(())
//! ```

pub mod attributes;
pub mod calendar;
pub mod config;
pub mod data_storage;
pub mod date;
pub mod editor;
pub mod error;
pub mod filter;
pub mod human;
pub mod messages;
pub mod project;
pub mod recurrence;
pub mod settings;
pub mod task;
pub mod templates;
pub mod view;
