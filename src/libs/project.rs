//! Project trees: directories of task files, nested arbitrarily deep.
//!
//! A directory is a project when it holds a `project.json` settings
//! document. Each `*.rst` file in it is a task, and each subdirectory with
//! its own settings document is a child project.
//!
//! Every task that enters a node goes through [`ProjectTree::correct_task`],
//! which fills in the bookkeeping attributes (`id`, `creator`,
//! `creation_date`, `project`, `stage`, `tags`) and normalizes the title.
//! Corrections mark a task dirty and [`ProjectTree::dump`] writes dirty
//! tasks back to disk.

use crate::libs::attributes::{parse_tags, AttributeMap, AttributeValue};
use crate::libs::data_storage::DataStorage;
use crate::libs::date::ComparableDate;
use crate::libs::editor::Editor;
use crate::libs::error::{Error, LoadFailure, Result};
use crate::libs::filter::Filter;
use crate::libs::settings::{derive_prefix, ProjectSettings, PROJECT_FILE_NAME};
use crate::libs::task::Task;
use crate::libs::templates::{render, ProjectTemplate};
use chrono::Local;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extension of task documents.
pub const TASK_EXTENSION: &str = "rst";

/// Directory under the data dir where rejected edits are kept.
pub const REJECTED_DIR: &str = "rejected";

#[derive(Debug)]
pub struct ProjectTree {
    name: String,
    path: PathBuf,
    settings: ProjectSettings,
    tasks: BTreeMap<String, Task>,
    projects: BTreeMap<String, ProjectTree>,
    max_id: u64,
    modified: BTreeSet<String>,
    sources: BTreeMap<String, PathBuf>,
    backup_dir: Option<PathBuf>,
}

/// One node of a filtered walk: the project and its matching tasks.
#[derive(Debug)]
pub struct FilteredNode<'a> {
    pub project: &'a ProjectTree,
    pub tasks: Vec<&'a Task>,
}

/// Numeric part of an id: the text after the last `_`.
pub fn id_number(id: &str) -> Option<u64> {
    id.rsplit_once('_').and_then(|(_, n)| n.parse().ok())
}

fn uncorrectable(title: &str, reason: impl Display) -> Error {
    Error::UncorrectableTask {
        title: title.to_string(),
        reason: reason.to_string(),
    }
}

fn assign(task: &mut Task, key: &str, value: impl Into<AttributeValue>) -> Result<()> {
    let title = task.title.clone();
    task.set(key, value).map_err(|e| uncorrectable(&title, e))
}

fn directory_name(path: &Path) -> Result<String> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let full = fs::canonicalize(path)?;
    Ok(full
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string()))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with('.'))
}

impl ProjectTree {
    /// An in-memory node. Nothing is written until [`dump`](Self::dump).
    pub fn new(name: &str, path: impl Into<PathBuf>, settings: ProjectSettings) -> Self {
        ProjectTree {
            name: name.to_string(),
            path: path.into(),
            settings,
            tasks: BTreeMap::new(),
            projects: BTreeMap::new(),
            max_id: 0,
            modified: BTreeSet::new(),
            sources: BTreeMap::new(),
            backup_dir: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn max_id(&self) -> u64 {
        self.max_id
    }

    /// Ids of tasks changed since the last dump.
    pub fn modified(&self) -> &BTreeSet<String> {
        &self.modified
    }

    pub fn is_modified(&self, id: &str) -> bool {
        self.modified.contains(id)
    }

    /// Where rejected edits are saved. Defaults to `rejected/` in the data dir.
    pub fn set_backup_dir(&mut self, dir: impl Into<PathBuf>) {
        self.backup_dir = Some(dir.into());
    }

    /// Tasks of this node ordered by id number.
    pub fn tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<(&String, &Task)> = self.tasks.iter().collect();
        tasks.sort_by_key(|(id, _)| (id_number(id), *id));
        tasks.into_iter().map(|(_, task)| task).collect()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub fn project(&self, name: &str) -> Option<&ProjectTree> {
        self.projects.get(name)
    }

    pub fn project_mut(&mut self, name: &str) -> Option<&mut ProjectTree> {
        self.projects.get_mut(name)
    }

    pub fn projects(&self) -> impl Iterator<Item = &ProjectTree> {
        self.projects.values()
    }

    /// The node holding task `id`, searching children depth first.
    pub fn node_for_task(&self, id: &str) -> Option<&ProjectTree> {
        if self.tasks.contains_key(id) {
            return Some(self);
        }
        self.projects.values().find_map(|child| child.node_for_task(id))
    }

    pub fn node_for_task_mut(&mut self, id: &str) -> Option<&mut ProjectTree> {
        if self.tasks.contains_key(id) {
            return Some(self);
        }
        for child in self.projects.values_mut() {
            if let Some(node) = child.node_for_task_mut(id) {
                return Some(node);
            }
        }
        None
    }

    fn matches_prefix(&self, id: &str) -> bool {
        id.strip_prefix(self.settings.id_stem())
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    }

    fn next_id(&self) -> String {
        format!("{}_{}", self.settings.id_stem(), self.max_id + 1)
    }

    fn task_path(&self, id: &str) -> PathBuf {
        match self.sources.get(id) {
            Some(path) => path.clone(),
            None => self.path.join(format!("{}.{}", id, TASK_EXTENSION)),
        }
    }

    /// Creates a project directory from a settings template and loads it.
    ///
    /// The template defaults to the built-in general-purpose one. Its
    /// placeholders receive `owner`, the directory name and a prefix
    /// derived from that name. The parent directory must exist.
    pub fn init_on_disk(path: &Path, owner: &str, template: Option<&str>, force: bool) -> Result<ProjectTree> {
        let marker = path.join(PROJECT_FILE_NAME);
        if marker.exists() && !force {
            return Err(Error::AlreadyExists(path.to_path_buf()));
        }

        let name = directory_name(path)?;
        let prefix = derive_prefix(&name);
        let text = render(template.unwrap_or(ProjectTemplate::Default.text()), owner, &name, &prefix);
        ProjectSettings::from_json(&text)?;

        match fs::create_dir(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        fs::write(&marker, &text)?;
        debug!(path = %path.display(), prefix = %prefix, "initialized project");

        Self::load_from_disk(path)?
            .ok_or_else(|| Error::InvalidTemplate(format!("{} could not be read back", marker.display())))
    }

    /// Loads the project at `path`, or `None` if it is not a project.
    ///
    /// Unreadable tasks and child projects do not stop the load. They are
    /// collected and reported together as [`Error::AggregateLoad`], which
    /// also carries everything that did load.
    pub fn load_from_disk(path: &Path) -> Result<Option<ProjectTree>> {
        let Some(settings) = ProjectSettings::read(path)? else {
            return Ok(None);
        };
        // The directory name wins over `project_name`, which goes stale on rename.
        let name = directory_name(path)?;
        let mut tree = ProjectTree::new(&name, path, settings);
        let mut failures = Vec::new();

        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| !is_hidden(p))
            .collect();
        entries.sort();

        let mut documents = Vec::new();
        for entry in entries {
            if entry.is_dir() {
                let key = directory_name(&entry)?;
                match Self::load_from_disk(&entry) {
                    Ok(Some(child)) => {
                        tree.projects.insert(key, child);
                    }
                    Ok(None) => {}
                    Err(Error::AggregateLoad {
                        failures: nested,
                        partial,
                        ..
                    }) => {
                        failures.extend(nested);
                        tree.projects.insert(key, *partial);
                    }
                    Err(error) => failures.push(LoadFailure { path: entry, error }),
                }
            } else if entry.extension().is_some_and(|ext| ext == TASK_EXTENSION) {
                match fs::read_to_string(&entry)
                    .map_err(Error::from)
                    .and_then(|text| Task::from_structured_text(&text))
                {
                    Ok(task) => documents.push((entry, task)),
                    Err(error) => failures.push(LoadFailure { path: entry, error }),
                }
            }
        }

        // Tasks that already carry a valid id go first so fresh ids never collide.
        documents.sort_by_key(|(_, task)| !task.id().is_some_and(|id| tree.matches_prefix(id)));
        for (source, task) in documents {
            if let Err(error) = tree.insert_task(task, None, Some(source.clone())) {
                failures.push(LoadFailure { path: source, error });
            }
        }

        debug!(
            project = %tree.name,
            tasks = tree.tasks.len(),
            projects = tree.projects.len(),
            failures = failures.len(),
            "loaded project"
        );

        if failures.is_empty() {
            Ok(Some(tree))
        } else {
            Err(Error::AggregateLoad {
                path: path.to_path_buf(),
                failures,
                partial: Box::new(tree),
            })
        }
    }

    /// Brings a task in line with this node. Returns whether anything changed.
    ///
    /// The `expected_*` values pin fields that must not drift, typically the
    /// ones a task had before it was edited.
    pub fn correct_task(
        &self,
        task: &mut Task,
        expected_id: Option<&str>,
        expected_creation_date: Option<ComparableDate>,
        expected_creator: Option<&str>,
    ) -> Result<bool> {
        let mut changed = false;

        if !task.attributes.has_value("creation_date") {
            assign(task, "creation_date", ComparableDate::today())?;
            changed = true;
        }
        if let Some(expected) = expected_creation_date {
            if task.attributes.get_date("creation_date") != Some(&expected) {
                assign(task, "creation_date", expected)?;
                changed = true;
            }
        }

        let creator = task.attributes.get_text("creator").filter(|c| !c.is_empty()).map(str::to_string);
        let wanted_creator = match (expected_creator, creator) {
            (Some(expected), Some(current)) if expected != current.as_str() => Some(expected.to_string()),
            (Some(expected), None) => Some(expected.to_string()),
            (None, None) => Some(self.settings.owners().into_iter().next().unwrap_or_default()),
            _ => None,
        };
        if let Some(creator) = wanted_creator {
            assign(task, "creator", creator)?;
            changed = true;
        }

        let current_id = task.id().map(str::to_string);
        let wanted_id = match (expected_id, current_id.as_deref()) {
            (Some(expected), Some(current)) if expected == current => None,
            (Some(expected), _) => Some(expected.to_string()),
            (None, Some(current)) if self.matches_prefix(current) => None,
            (None, _) => Some(self.next_id()),
        };
        if let Some(id) = wanted_id {
            if let Some(old) = &current_id {
                if let Some(rest) = task.title.strip_prefix(&format!("{}:", old)) {
                    task.title = rest.trim_start().to_string();
                }
            }
            assign(task, "id", id)?;
            changed = true;
        }

        if task.attributes.get_text("project") != Some(self.name.as_str()) {
            assign(task, "project", self.name.as_str())?;
            changed = true;
        }

        let tags = match task.attributes.get_value("tags") {
            Some(AttributeValue::Tags(current)) => {
                let normalized = parse_tags(&current.iter().cloned().collect::<Vec<_>>().join(","));
                (normalized != *current).then_some(normalized)
            }
            _ => Some(BTreeSet::new()),
        };
        if let Some(tags) = tags {
            assign(task, "tags", tags)?;
            changed = true;
        }

        if let Some(id) = task.id().map(str::to_string) {
            if !task.title.starts_with(&format!("{}:", id)) {
                task.title = format!("{}: {}", id, task.title).trim_end().to_string();
                changed = true;
            }
        }

        for (key, value) in self.settings.defaults() {
            if !task.attributes.contains_key(&key) {
                assign(task, &key, value)?;
                changed = true;
            }
        }
        if !task.attributes.contains_key("stage") {
            assign(task, "stage", "todo")?;
            changed = true;
        }

        task.check().map_err(|e| uncorrectable(&task.title, e))?;
        Ok(changed)
    }

    /// Corrects `task` and stores it under its final id.
    pub fn add_task(&mut self, task: Task, expected_id: Option<&str>) -> Result<String> {
        self.insert_task(task, expected_id, None)
    }

    fn insert_task(&mut self, mut task: Task, expected_id: Option<&str>, source: Option<PathBuf>) -> Result<String> {
        // An id already taken by another task is replaced with a fresh one.
        let fresh;
        let expected_id = match expected_id {
            None if task.id().is_some_and(|id| self.tasks.contains_key(id)) => {
                fresh = self.next_id();
                Some(fresh.as_str())
            }
            other => other,
        };

        let changed = self.correct_task(&mut task, expected_id, None, None)?;
        let id = task.id().map(str::to_string).unwrap_or_default();

        if changed {
            if let Some(source) = &source {
                warn!(id = %id, path = %source.display(), "corrected task");
            }
            self.modified.insert(id.clone());
        }
        if let Some(n) = id_number(&id) {
            self.max_id = self.max_id.max(n);
        }
        if let Some(source) = source {
            self.sources.insert(id.clone(), source);
        }
        self.tasks.insert(id.clone(), task);
        Ok(id)
    }

    /// Creates a task with a fresh id and writes it to disk.
    ///
    /// The configured defaults are overlaid by `attributes`, then `creator`,
    /// `creation_date` and `id` are forced.
    pub fn create_task(&mut self, creator: &str, title: &str, description: &str, attributes: &AttributeMap) -> Result<String> {
        let mut values = AttributeMap::new();
        for (key, value) in self.settings.defaults() {
            values.set(&key, value)?;
        }
        values.overlay(attributes);

        let id = self.next_id();
        values.set("creator", creator)?;
        values.set("creation_date", ComparableDate::today())?;
        values.set("id", id.as_str())?;

        let id = self.add_task(Task::new(title, description, values), Some(&id))?;
        self.modified.insert(id.clone());
        self.dump()?;
        debug!(id = %id, project = %self.name, "created task");
        Ok(id)
    }

    /// Re-creates `task` here under a fresh id, as if `creator` had just
    /// written it. The old id prefix is dropped from the title.
    pub fn copy_task(&mut self, task: &Task, creator: &str) -> Result<String> {
        self.create_task(creator, task.bare_title(), &task.description, &task.attributes)
    }

    /// Replaces task `id` with `edited` text, or re-corrects it when `None`.
    ///
    /// `id`, `creator` and `creation_date` survive the edit. Text that does
    /// not parse or cannot be corrected is saved to a backup file and the
    /// stored task is left alone.
    pub fn update_task(&mut self, id: &str, edited: Option<&str>) -> Result<()> {
        let current = self.tasks.get(id).ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let creation_date = current.attributes.get_date("creation_date").copied();
        let creator = current.attributes.get_text("creator").map(str::to_string);

        let result = match edited {
            Some(text) => Task::from_structured_text(text),
            None => Ok(current.clone()),
        }
        .and_then(|mut task| {
            self.correct_task(&mut task, Some(id), creation_date, creator.as_deref())?;
            Ok(task)
        });

        let task = match (result, edited) {
            (Ok(task), _) => task,
            (Err(source), Some(text)) => {
                let backup = self.backup_rejected(id, text)?;
                warn!(id = %id, backup = %backup.display(), "rejected task edit");
                return Err(Error::EditRejected {
                    id: id.to_string(),
                    backup,
                    source: Box::new(source),
                });
            }
            (Err(source), None) => return Err(source),
        };

        self.tasks.insert(id.to_string(), task);
        self.modified.insert(id.to_string());
        self.dump()?;
        Ok(())
    }

    /// Opens task `id` in `editor` and applies the result.
    ///
    /// Returns `false` when the text came back unchanged.
    pub fn edit_task(&mut self, id: &str, editor: &Editor) -> Result<bool> {
        let original = self
            .tasks
            .get(id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?
            .to_structured_text();

        let edited = editor.edit(&original)?;
        if edited.trim() == original.trim() {
            return Ok(false);
        }

        self.update_task(id, Some(&edited))?;
        Ok(true)
    }

    fn backup_rejected(&self, id: &str, text: &str) -> Result<PathBuf> {
        let dir = match &self.backup_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                dir.clone()
            }
            None => DataStorage::new().get_dir(REJECTED_DIR)?,
        };
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let path = dir.join(format!("{}-{}.{}", id, stamp, TASK_EXTENSION));
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Writes every dirty task in this node and its children.
    pub fn dump(&mut self) -> Result<usize> {
        let mut written = 0;
        // Ids leave the dirty set only once their file is written.
        while let Some(id) = self.modified.first().cloned() {
            if let Some(task) = self.tasks.get(&id) {
                let path = self.task_path(&id);
                fs::write(&path, task.to_structured_text())?;
                debug!(id = %id, path = %path.display(), "wrote task");
                self.sources.insert(id.clone(), path);
                written += 1;
            }
            self.modified.remove(&id);
        }
        for child in self.projects.values_mut() {
            written += child.dump()?;
        }
        Ok(written)
    }

    /// Removes task `id` and deletes its file.
    pub fn remove_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.remove(id).ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let path = self.task_path(id);
        self.modified.remove(id);
        self.sources.remove(id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        debug!(id = %id, path = %path.display(), "removed task");
        Ok(task)
    }

    /// Loads child `name` if its directory is a project, else creates it.
    pub fn add_project(&mut self, name: &str, creator: &str, template: Option<&str>) -> Result<&mut ProjectTree> {
        let path = self.path.join(name);
        let child = match Self::load_from_disk(&path)? {
            Some(child) => child,
            None => Self::init_on_disk(&path, creator, template, false)?,
        };

        Ok(match self.projects.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(child);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(child),
        })
    }

    /// Walks this node then its children depth first, keeping matching tasks.
    ///
    /// Every node appears, even when none of its tasks match.
    pub fn filtered_tasks(&self, filter: &Filter) -> Vec<FilteredNode<'_>> {
        let mut nodes = vec![FilteredNode {
            project: self,
            tasks: self.tasks().into_iter().filter(|task| filter.matches(task)).collect(),
        }];
        for child in self.projects.values() {
            nodes.extend(child.filtered_tasks(filter));
        }
        nodes
    }
}
