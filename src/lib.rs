//! # master
//!
//! A project manager that keeps tasks as plain structured-text files inside
//! nested project directories.
//!
//! - **Tasks**: titled documents with a free-text description and typed
//!   `key: value` attributes (text, dates, tag sets)
//! - **Projects**: directories marked by a `project.json` settings document,
//!   nested to any depth
//! - **Correction**: every loaded or edited task is brought back in line
//!   with its project (ids, creator, dates, tags)
//! - **Filters**: boolean expressions over task attributes with human dates
//! - **Calendar**: tasks with a due date or event start project onto
//!   calendar events, recurrence included
//!
//! ## Usage
//!
//! ```rust,no_run
//! use master::libs::attributes::AttributeMap;
//! use master::libs::project::ProjectTree;
//! use std::path::Path;
//!
//! let mut project = ProjectTree::init_on_disk(Path::new("demo"), "alice", None, false)?;
//! let id = project.create_task("alice", "My title", "", &AttributeMap::new())?;
//! assert_eq!(id, "DEMO_1");
//! # Ok::<(), master::libs::error::Error>(())
//! ```

pub mod commands;
pub mod libs;
