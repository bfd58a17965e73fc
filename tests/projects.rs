#[cfg(test)]
mod tests {
    use master::libs::attributes::{parse_tags, AttributeMap};
    use master::libs::editor::Editor;
    use master::libs::error::Error;
    use master::libs::filter::Filter;
    use master::libs::project::{id_number, ProjectTree};
    use master::libs::settings::{derive_prefix, ProjectSettings, PROJECT_FILE_NAME};
    use master::libs::task::Task;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// A scratch directory with room for a `demo` project and a backup folder.
    /// The project itself is not created; each test decides how.
    struct ProjectTestContext {
        _temp_dir: TempDir,
        root: PathBuf,
        backups: PathBuf,
    }

    impl TestContext for ProjectTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let root = temp_dir.path().join("demo");
            let backups = temp_dir.path().join("rejected");
            ProjectTestContext {
                _temp_dir: temp_dir,
                root,
                backups,
            }
        }
    }

    impl ProjectTestContext {
        fn init(&self) -> ProjectTree {
            let mut tree = ProjectTree::init_on_disk(&self.root, "alice", None, false).unwrap();
            tree.set_backup_dir(&self.backups);
            tree
        }

        fn reload(&self) -> ProjectTree {
            let mut tree = ProjectTree::load_from_disk(&self.root).unwrap().unwrap();
            tree.set_backup_dir(&self.backups);
            tree
        }
    }

    fn settings() -> ProjectSettings {
        ProjectSettings::from_json(
            r#"{"project_name": "demo", "task_prefix": "DEMO_", "owners": "alice", "default_attributes": ["stage"]}"#,
        )
        .unwrap()
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_create_and_load(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        assert_eq!(tree.name(), "demo");
        assert_eq!(tree.settings().task_prefix, "DEMO_");
        assert!(ctx.root.join(PROJECT_FILE_NAME).exists());

        let id = tree.create_task("alice", "My title", "", &AttributeMap::new()).unwrap();
        assert_eq!(id, "DEMO_1");
        assert!(ctx.root.join("DEMO_1.rst").exists());
        assert!(tree.modified().is_empty());

        let loaded = ctx.reload();
        let task = loaded.task("DEMO_1").unwrap();
        assert_eq!(task.title, "DEMO_1: My title");
        assert_eq!(task.attributes.get_text("creator"), Some("alice"));
        assert_eq!(task.attributes.get_text("project"), Some("demo"));
        assert_eq!(task.attributes.get_text("stage"), Some("todo"));
        assert_eq!(task.attributes.get_tags("tags"), Some(&parse_tags("")));
        assert!(task.attributes.has_value("creation_date"));
        assert!(loaded.modified().is_empty());
        assert_eq!(loaded.max_id(), 1);
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_created_attributes_override_defaults(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        let mut attributes = AttributeMap::new();
        attributes.set("stage", "doing").unwrap();
        attributes.set("tags", parse_tags("Backend, UI")).unwrap();

        let id = tree.create_task("bob", "Styled", "Some words.", &attributes).unwrap();
        let task = ctx.reload().task(&id).cloned().unwrap();
        assert_eq!(task.attributes.get_text("stage"), Some("doing"));
        assert_eq!(task.attributes.get_text("creator"), Some("bob"));
        assert_eq!(task.attributes.get_tags("tags"), Some(&parse_tags("backend ui")));
        assert_eq!(task.description, "Some words.");
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_correction_is_idempotent(ctx: &mut ProjectTestContext) {
        let tree = ProjectTree::new("demo", &ctx.root, settings());
        let mut task = Task::new("Tagged", "", AttributeMap::new());
        task.set("tags", parse_tags("Backend backend UI")).unwrap();

        assert!(tree.correct_task(&mut task, None, None, None).unwrap());
        assert_eq!(task.id(), Some("DEMO_1"));
        assert_eq!(task.title, "DEMO_1: Tagged");
        assert_eq!(task.attributes.get_text("creator"), Some("alice"));
        assert_eq!(task.attributes.get_tags("tags"), Some(&parse_tags("backend ui")));
        assert!(task.attributes.contains_key("stage"));

        assert!(!tree.correct_task(&mut task, None, None, None).unwrap());
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_correction_normalizes_raw_tag_set(ctx: &mut ProjectTestContext) {
        let tree = ProjectTree::new("demo", &ctx.root, settings());
        let mut task = Task::new("Raw", "", AttributeMap::new());
        let raw: BTreeSet<String> = ["Foo", "bar", "foo"].iter().map(|t| t.to_string()).collect();
        task.set("tags", raw).unwrap();

        assert!(tree.correct_task(&mut task, None, None, None).unwrap());
        assert_eq!(task.attributes.get_tags("tags"), Some(&parse_tags("bar foo")));
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_correction_resets_text_tags(ctx: &mut ProjectTestContext) {
        let tree = ProjectTree::new("demo", &ctx.root, settings());
        let mut task = Task::new("Loose", "", AttributeMap::new());
        task.attributes.set("tags", "").unwrap();
        tree.correct_task(&mut task, None, None, None).unwrap();
        assert_eq!(task.attributes.get_tags("tags"), Some(&parse_tags("")));
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_correction_pins_expected_fields(ctx: &mut ProjectTestContext) {
        let tree = ProjectTree::new("demo", &ctx.root, settings());
        let mut original = Task::new("Pinned", "", AttributeMap::new());
        tree.correct_task(&mut original, None, None, None).unwrap();
        let created = original.attributes.get_date("creation_date").copied();

        let mut edited = original.clone();
        edited.title = "DEMO_7: Pinned".to_string();
        edited.set("id", "DEMO_7").unwrap();
        edited.set("creator", "mallory").unwrap();
        edited.set("creation_date", "2001-01-01").unwrap();

        assert!(tree.correct_task(&mut edited, Some("DEMO_1"), created, Some("alice")).unwrap());
        assert_eq!(edited, original);
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_uncorrectable_defaults(ctx: &mut ProjectTestContext) {
        let settings = ProjectSettings::from_json(
            r#"{"project_name": "demo", "task_prefix": "DEMO_", "default_attributes": ["bad-key"]}"#,
        )
        .unwrap();
        let tree = ProjectTree::new("demo", &ctx.root, settings);
        let mut task = Task::new("Doomed", "", AttributeMap::new());
        let result = tree.correct_task(&mut task, None, None, None);
        assert!(matches!(result, Err(Error::UncorrectableTask { .. })));
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_init_refuses_existing_project(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "Keep me", "", &AttributeMap::new()).unwrap();

        let result = ProjectTree::init_on_disk(&ctx.root, "bob", None, false);
        assert!(matches!(result, Err(Error::AlreadyExists(_))));

        let forced = ProjectTree::init_on_disk(&ctx.root, "bob", None, true).unwrap();
        assert_eq!(forced.settings().owners(), vec!["bob".to_string()]);
        assert!(forced.task("DEMO_1").is_some());
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_init_rejects_invalid_template(ctx: &mut ProjectTestContext) {
        let result = ProjectTree::init_on_disk(&ctx.root, "alice", Some("{ not json"), false);
        assert!(matches!(result, Err(Error::InvalidTemplate(_))));

        let result = ProjectTree::init_on_disk(&ctx.root, "alice", Some(r#"{"task_prefix": "X_"}"#), false);
        assert!(matches!(result, Err(Error::InvalidTemplate(_))));
        assert!(!ctx.root.exists());
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_init_with_custom_template(ctx: &mut ProjectTestContext) {
        let template = r#"{
            "owners": ["__DEFAULT_OWNER", "carol"],
            "project_name": "__DEFAULT_PROJECT_NAME",
            "task_prefix": "__DEFAULT_PREFIX",
            "default_attributes": {"priority": "low"},
            "sprint": 3
        }"#;
        let mut tree = ProjectTree::init_on_disk(&ctx.root, "alice", Some(template), false).unwrap();
        assert_eq!(tree.settings().owners(), vec!["alice".to_string(), "carol".to_string()]);
        assert_eq!(tree.settings().extra.get("sprint"), Some(&serde_json::json!(3)));

        let id = tree.create_task("alice", "Prioritized", "", &AttributeMap::new()).unwrap();
        let task = tree.task(&id).unwrap();
        assert_eq!(task.attributes.get_text("priority"), Some("low"));
        assert_eq!(task.attributes.get_text("stage"), Some("todo"));
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_load_plain_directory(ctx: &mut ProjectTestContext) {
        fs::create_dir(&ctx.root).unwrap();
        assert!(ProjectTree::load_from_disk(&ctx.root).unwrap().is_none());
    }

    #[test]
    fn test_derive_prefix() {
        assert_eq!(derive_prefix("demo"), "DEMO_");
        assert_eq!(derive_prefix("test_project"), "TP_");
        assert_eq!(derive_prefix("my-web-app"), "MWA_");
        assert_eq!(id_number("TP_12"), Some(12));
        assert_eq!(id_number("TP_x"), None);
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_ids_are_monotonic(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        for title in ["One", "Two", "Three"] {
            tree.create_task("alice", title, "", &AttributeMap::new()).unwrap();
        }

        let removed = tree.remove_task("DEMO_3").unwrap();
        assert_eq!(removed.title, "DEMO_3: Three");
        assert!(!ctx.root.join("DEMO_3.rst").exists());
        assert!(matches!(tree.remove_task("DEMO_3"), Err(Error::TaskNotFound(_))));

        let id = tree.create_task("alice", "Four", "", &AttributeMap::new()).unwrap();
        assert_eq!(id, "DEMO_4");

        let loaded = ctx.reload();
        assert_eq!(loaded.max_id(), 4);
        let ids: Vec<&str> = loaded.tasks().iter().filter_map(|t| t.id()).collect();
        assert_eq!(ids, vec!["DEMO_1", "DEMO_2", "DEMO_4"]);
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_load_corrects_task_without_id(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "First", "", &AttributeMap::new()).unwrap();
        fs::write(ctx.root.join("note.rst"), "=======\n Notes\n=======\n\nstage: doing\n").unwrap();

        let mut loaded = ctx.reload();
        assert!(loaded.is_modified("DEMO_2"));
        assert!(!loaded.is_modified("DEMO_1"));
        let task = loaded.task("DEMO_2").unwrap();
        assert_eq!(task.title, "DEMO_2: Notes");
        assert_eq!(task.attributes.get_text("creator"), Some("alice"));
        assert_eq!(task.attributes.get_text("stage"), Some("doing"));

        assert_eq!(loaded.dump().unwrap(), 1);
        assert!(!ctx.root.join("DEMO_2.rst").exists());
        let text = fs::read_to_string(ctx.root.join("note.rst")).unwrap();
        assert!(text.contains("id: DEMO_2"));

        assert!(ctx.reload().modified().is_empty());
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_load_reassigns_duplicate_ids(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "My title", "", &AttributeMap::new()).unwrap();
        fs::copy(ctx.root.join("DEMO_1.rst"), ctx.root.join("copy.rst")).unwrap();

        let loaded = ctx.reload();
        assert_eq!(loaded.tasks().len(), 2);
        assert_eq!(loaded.task("DEMO_1").unwrap().title, "DEMO_1: My title");
        assert_eq!(loaded.task("DEMO_2").unwrap().title, "DEMO_2: My title");
        assert!(loaded.is_modified("DEMO_2"));
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_load_skips_hidden_entries(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "Visible", "", &AttributeMap::new()).unwrap();
        fs::write(ctx.root.join(".draft.rst"), "garbage").unwrap();
        fs::create_dir(ctx.root.join(".cache")).unwrap();

        assert_eq!(ctx.reload().tasks().len(), 1);
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_aggregate_load_keeps_siblings(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "Healthy", "", &AttributeMap::new()).unwrap();
        fs::write(ctx.root.join("broken.rst"), "garbage").unwrap();
        let child = ctx.root.join("child");
        fs::create_dir(&child).unwrap();
        fs::write(child.join(PROJECT_FILE_NAME), "{ not json").unwrap();

        let error = ProjectTree::load_from_disk(&ctx.root).unwrap_err();
        let (partial, failures) = error.into_partial().unwrap();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().any(|f| f.path.ends_with("broken.rst")));
        assert!(failures.iter().any(|f| f.path.ends_with("child")));
        assert!(partial.task("DEMO_1").is_some());
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_aggregate_load_reports_unrepresentable_date(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "Healthy", "", &AttributeMap::new()).unwrap();
        fs::write(ctx.root.join("bad.rst"), "=====\n Bad\n=====\n\ndue_date: in 999999999 days\n").unwrap();

        let error = ProjectTree::load_from_disk(&ctx.root).unwrap_err();
        let (partial, failures) = error.into_partial().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].path.ends_with("bad.rst"));
        assert!(matches!(failures[0].error, Error::DateParse(_)));
        assert!(partial.task("DEMO_1").is_some());
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_renamed_directory_renames_project(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "Moved along", "", &AttributeMap::new()).unwrap();
        let renamed = ctx.root.with_file_name("renamed");
        fs::rename(&ctx.root, &renamed).unwrap();

        let loaded = ProjectTree::load_from_disk(&renamed).unwrap().unwrap();
        assert_eq!(loaded.name(), "renamed");
        assert_eq!(loaded.task("DEMO_1").unwrap().attributes.get_text("project"), Some("renamed"));
        assert!(loaded.is_modified("DEMO_1"));
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_failed_dump_keeps_tasks_dirty(ctx: &mut ProjectTestContext) {
        fs::create_dir(&ctx.root).unwrap();
        let mut tree = ProjectTree::new("demo", &ctx.root, settings());
        tree.add_task(Task::new("First", "", AttributeMap::new()), None).unwrap();
        tree.add_task(Task::new("Second", "", AttributeMap::new()), None).unwrap();

        // A directory where the file should go makes the write fail
        let blocker = ctx.root.join("DEMO_1.rst");
        fs::create_dir(&blocker).unwrap();
        assert!(tree.dump().is_err());
        assert!(tree.is_modified("DEMO_1"));
        assert!(tree.is_modified("DEMO_2"));

        fs::remove_dir(&blocker).unwrap();
        assert_eq!(tree.dump().unwrap(), 2);
        assert!(tree.modified().is_empty());
        assert!(ctx.root.join("DEMO_1.rst").is_file());
        assert!(ctx.root.join("DEMO_2.rst").is_file());
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_update_keeps_identity(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "My title", "", &AttributeMap::new()).unwrap();
        let before = tree.task("DEMO_1").unwrap().clone();

        let edited = before
            .to_structured_text()
            .replace(" DEMO_1: My title", " DEMO_99: Renamed")
            .replace("id: DEMO_1", "id: DEMO_99")
            .replace("creator: alice", "creator: mallory")
            .replace("stage: todo", "stage: doing");
        tree.update_task("DEMO_1", Some(&edited)).unwrap();

        let after = ctx.reload().task("DEMO_1").cloned().unwrap();
        assert_eq!(after.title, "DEMO_1: Renamed");
        assert_eq!(after.attributes.get_text("creator"), Some("alice"));
        assert_eq!(after.attributes.get_text("stage"), Some("doing"));
        assert_eq!(
            after.attributes.get_date("creation_date"),
            before.attributes.get_date("creation_date")
        );
        assert!(!ctx.root.join("DEMO_99.rst").exists());
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_malformed_edit_is_backed_up(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "My title", "", &AttributeMap::new()).unwrap();
        let on_disk = fs::read_to_string(ctx.root.join("DEMO_1.rst")).unwrap();

        let text = "not a task document";
        match tree.update_task("DEMO_1", Some(text)) {
            Err(Error::EditRejected { id, backup, .. }) => {
                assert_eq!(id, "DEMO_1");
                assert!(backup.starts_with(&ctx.backups));
                assert_eq!(fs::read_to_string(&backup).unwrap(), text);
            }
            other => panic!("expected a rejected edit, got {:?}", other),
        }

        assert_eq!(tree.task("DEMO_1").unwrap().title, "DEMO_1: My title");
        assert_eq!(fs::read_to_string(ctx.root.join("DEMO_1.rst")).unwrap(), on_disk);
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_update_unknown_task(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        assert!(matches!(tree.update_task("DEMO_9", None), Err(Error::TaskNotFound(_))));
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_subprojects(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        {
            let backend = tree.add_project("backend", "alice", None).unwrap();
            assert_eq!(backend.name(), "backend");
            assert_eq!(backend.settings().task_prefix, "BACKEND_");
            let id = backend.create_task("bob", "API", "", &AttributeMap::new()).unwrap();
            assert_eq!(id, "BACKEND_1");
        }
        tree.create_task("alice", "Root task", "", &AttributeMap::new()).unwrap();

        let mut loaded = ctx.reload();
        let backend = loaded.project("backend").unwrap();
        let task = backend.task("BACKEND_1").unwrap();
        assert_eq!(task.attributes.get_text("project"), Some("backend"));
        assert_eq!(task.attributes.get_text("creator"), Some("bob"));
        assert_eq!(loaded.node_for_task("BACKEND_1").unwrap().name(), "backend");
        assert_eq!(loaded.node_for_task("DEMO_1").unwrap().name(), "demo");

        // Adding an existing subproject loads it instead of recreating it.
        let again = loaded.add_project("backend", "carol", None).unwrap();
        assert!(again.task("BACKEND_1").is_some());
        assert_eq!(again.settings().owners(), vec!["alice".to_string()]);
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_copy_task_into_subproject(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        let mut attributes = AttributeMap::new();
        attributes.set("id", "OLD_7").unwrap();
        attributes.set("creator", "alice").unwrap();
        attributes.set("creation_date", "2020-01-01").unwrap();
        attributes.set("estimate", "3").unwrap();
        let original = Task::new("OLD_7: Ported", "Carried over.", attributes);
        assert_eq!(original.bare_title(), "Ported");

        let backend = tree.add_project("backend", "alice", None).unwrap();
        let id = backend.copy_task(&original, "bob").unwrap();
        assert_eq!(id, "BACKEND_1");

        let copy = ctx.reload().project("backend").unwrap().task("BACKEND_1").cloned().unwrap();
        assert_eq!(copy.title, "BACKEND_1: Ported");
        assert_eq!(copy.description, "Carried over.");
        assert_eq!(copy.attributes.get_text("creator"), Some("bob"));
        assert_eq!(copy.attributes.get_text("project"), Some("backend"));
        assert_eq!(copy.attributes.get_text("estimate"), Some("3"));
        assert!(copy.get("creation_date") == "today");
    }

    #[test_context(ProjectTestContext)]
    #[test]
    fn test_filtered_tasks_visit_every_node(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "Root task", "", &AttributeMap::new()).unwrap();
        tree.add_project("backend", "alice", None)
            .unwrap()
            .create_task("bob", "API", "", &AttributeMap::new())
            .unwrap();

        let nodes = tree.filtered_tasks(&Filter::always());
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].project.name(), "demo");
        assert_eq!(nodes[0].tasks.len(), 1);
        assert_eq!(nodes[1].project.name(), "backend");
        assert_eq!(nodes[1].tasks.len(), 1);

        let filter = Filter::parse("t.creator == 'bob'").unwrap();
        let nodes = tree.filtered_tasks(&filter);
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].tasks.is_empty());
        assert_eq!(nodes[1].tasks[0].id(), Some("BACKEND_1"));
    }

    #[cfg(unix)]
    #[test_context(ProjectTestContext)]
    #[test]
    fn test_edit_task_with_editor(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "My title", "", &AttributeMap::new()).unwrap();

        assert!(!tree.edit_task("DEMO_1", &Editor::new("true")).unwrap());
        assert!(tree.edit_task("DEMO_1", &Editor::new("sed -i s/todo/doing/")).unwrap());
        assert_eq!(ctx.reload().task("DEMO_1").unwrap().attributes.get_text("stage"), Some("doing"));
    }

    #[cfg(unix)]
    #[test_context(ProjectTestContext)]
    #[test]
    fn test_edit_task_failures(ctx: &mut ProjectTestContext) {
        let mut tree = ctx.init();
        tree.create_task("alice", "My title", "", &AttributeMap::new()).unwrap();

        let result = tree.edit_task("DEMO_1", &Editor::new("false"));
        assert!(matches!(result, Err(Error::EditorFailed { .. })));

        let result = tree.edit_task("DEMO_1", &Editor::new("truncate -s 0"));
        assert!(matches!(result, Err(Error::EditRejected { .. })));

        let result = tree.edit_task("DEMO_7", &Editor::new("true"));
        assert!(matches!(result, Err(Error::TaskNotFound(_))));
    }

    #[test]
    fn test_editor_resolution() {
        assert_eq!(Editor::resolve(Some("code --wait")).unwrap().command(), "code --wait");
        assert_eq!(Editor::new("  vim ").command(), "vim");
    }
}
