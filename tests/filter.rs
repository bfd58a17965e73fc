#[cfg(test)]
mod tests {
    use master::libs::attributes::{parse_tags, AttributeMap};
    use master::libs::error::Error;
    use master::libs::filter::{Expr, Filter};
    use master::libs::task::Task;

    fn task() -> Task {
        let mut attributes = AttributeMap::new();
        attributes.set("id", "DEMO_1").unwrap();
        attributes.set("stage", "todo").unwrap();
        attributes.set("estimate", "5").unwrap();
        attributes.set("assignee", "").unwrap();
        attributes.set("due_date", "next wednesday").unwrap();
        attributes.set("tags", parse_tags("backend, urgent")).unwrap();
        Task::new("DEMO_1: Fix login", "", attributes)
    }

    fn matches(source: &str) -> bool {
        Filter::parse(source).unwrap().matches(&task())
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(matches(""));
        assert!(matches("   "));
        assert!(Filter::always().matches(&Task::new("x", "", AttributeMap::new())));
    }

    #[test]
    fn test_comparisons() {
        assert!(matches("t.stage == \"todo\""));
        assert!(matches("t.stage != 'done'"));
        assert!(matches("t.stage == todo"));
        assert!(matches("t.estimate > 3"));
        assert!(matches("t.estimate <= 5"));
        assert!(matches("3 < t.estimate"));
        assert!(!matches("t.estimate >= 10"));
    }

    #[test]
    fn test_date_comparisons() {
        assert!(matches("t.due_date > \"today\""));
        assert!(!matches("t.due_date == \"today\""));
        assert!(matches("t.due_date == \"next wednesday\""));
        assert!(matches("t.due_date <= \"in 8 days\""));
    }

    #[test]
    fn test_missing_attributes_never_match() {
        assert!(!matches("t.missing == \"x\""));
        assert!(!matches("t.missing != \"x\""));
        assert!(!matches("t.missing < 3"));
        assert!(!matches("\"x\" in t.missing"));
        assert!(!matches("\"x\" not in t.missing"));
        assert!(matches("not t.missing == \"x\""));
    }

    #[test]
    fn test_membership() {
        assert!(matches("\"urgent\" in t.tags"));
        assert!(matches("'URGENT' in t.tags"));
        assert!(matches("\"frontend\" not in t.tags"));
        assert!(matches("\"login\" in t.title") == false);
        assert!(matches("\"assignee\" in t"));
        assert!(!matches("\"reviewer\" in t"));
        assert!(matches("t.stage in \"todo, doing\""));
    }

    #[test]
    fn test_truthiness() {
        assert!(matches("t.stage"));
        assert!(!matches("t.assignee"));
        assert!(!matches("t.missing"));
        assert!(matches("t"));
    }

    #[test]
    fn test_precedence() {
        assert!(matches("true or false and false"));
        assert!(!matches("(true or false) and false"));
        assert!(matches("not false and true"));
        assert!(!matches("not (false or true)"));
        assert!(matches("t.stage == \"done\" or \"backend\" in t.tags and t.estimate > 3"));
        assert!(!matches("not not t.missing"));
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("t.stage = \"todo\"", 8),
            ("(t.stage == \"todo\"", 18),
            ("t.stage ==", 10),
            ("\"unterminated", 0),
            ("t.stage == \"a\" extra", 15),
            ("t. == 1", 0),
            ("t.stage == \"a\" and", 18),
            ("t.stage # 1", 8),
        ];
        for (source, position) in cases {
            match Filter::parse(source) {
                Err(Error::FilterParse { position: at, .. }) => assert_eq!(at, position, "{:?}", source),
                other => panic!("{:?} should not parse, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_filter_keeps_its_source() {
        let filter: Filter = "t.stage == \"todo\"".parse().unwrap();
        assert_eq!(filter.source(), "t.stage == \"todo\"");
        assert!(matches!(filter.expr(), Expr::Compare(..)));
    }
}
