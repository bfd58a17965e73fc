#[cfg(test)]
mod tests {
    use master::libs::attributes::{parse_tags, AttributeMap};
    use master::libs::error::Error;
    use master::libs::task::Task;

    const DOCUMENT: &str = "\
==================
 DEMO_1: My title
==================

First paragraph.

creator: alice
due_date: 2026-03-14, Sat
tags: backend, urgent
";

    #[test]
    fn test_parse_structured_text() {
        let task = Task::from_structured_text(DOCUMENT).unwrap();

        assert_eq!(task.title, "DEMO_1: My title");
        assert_eq!(task.description, "First paragraph.");
        assert_eq!(task.attributes.get_text("creator"), Some("alice"));
        assert_eq!(task.attributes.get_date("due_date").unwrap().to_string(), "2026-03-14, Sat");
        assert_eq!(task.attributes.get_tags("tags"), Some(&parse_tags("backend urgent")));
    }

    #[test]
    fn test_round_trip_is_exact() {
        let task = Task::from_structured_text(DOCUMENT).unwrap();
        assert_eq!(task.to_structured_text(), DOCUMENT);
        assert_eq!(Task::from_structured_text(&task.to_structured_text()).unwrap(), task);
    }

    #[test]
    fn test_description_may_look_like_attributes() {
        let text = "\
=======
 Notes
=======

key: value inside the description
more text

stage: todo
";
        let task = Task::from_structured_text(text).unwrap();
        assert_eq!(task.description, "key: value inside the description\nmore text");
        assert_eq!(task.attributes.len(), 1);
        assert_eq!(task.to_structured_text(), text);
    }

    #[test]
    fn test_empty_description_is_omitted() {
        let mut attributes = AttributeMap::new();
        attributes.set("stage", "todo").unwrap();
        attributes.set("tags", parse_tags("")).unwrap();
        let task = Task::new("  Title  ", "   ", attributes);

        assert_eq!(task.title, "Title");
        assert_eq!(task.to_structured_text(), "=======\n Title\n=======\n\nstage: todo\ntags:\n");
    }

    #[test]
    fn test_malformed_documents() {
        let cases = [
            "",
            "   \n\n",
            "no blank line\nstage: todo",
            "Title without border\n\nstage: todo",
            "=====\n\n=====\n\nstage: todo",
            "=====\n Title\n=====\n\nstage todo",
        ];
        for text in cases {
            assert!(
                matches!(Task::from_structured_text(text), Err(Error::MalformedDocument(_))),
                "{:?} should be malformed",
                text
            );
        }
    }

    #[test]
    fn test_attribute_errors_propagate() {
        let text = "=====\n Title\n=====\n\nbad-key: x\n";
        assert!(matches!(Task::from_structured_text(text), Err(Error::InvalidKey(_))));

        let text = "=====\n Title\n=====\n\ndue_date: someday maybe\n";
        assert!(matches!(Task::from_structured_text(text), Err(Error::DateParse(_))));
    }

    #[test]
    fn test_check_reports_missing_attributes() {
        let task = Task::from_structured_text(DOCUMENT).unwrap();
        match task.check() {
            Err(Error::InvalidAttributes(problems)) => {
                assert!(problems.contains(&"creation_date is missing".to_string()));
                assert!(problems.contains(&"stage is missing".to_string()));
                assert!(!problems.iter().any(|p| p.starts_with("creator")));
            }
            other => panic!("expected missing attributes, got {:?}", other),
        }
    }

    #[test]
    fn test_update_replaces_everything() {
        let mut task = Task::from_structured_text(DOCUMENT).unwrap();
        let other = Task::new("Other", "", AttributeMap::new());
        task.update(other.clone());
        assert_eq!(task, other);
    }
}
