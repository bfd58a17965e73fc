use super::calendar::CalendarEvent;
use super::project::FilteredNode;
use super::task::Task;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn tasks(tasks: &[&Task]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "STAGE", "DUE", "TAGS"]);
        for task in tasks {
            table.add_row(row![
                task.id().unwrap_or("-"),
                task.bare_title(),
                task.attributes.get_or_default("stage", ""),
                task.attributes.get_or_default("due_date", ""),
                task.attributes.get_or_default("tags", "")
            ]);
        }
        table.printstd();
    }

    /// Task count per node, for `list --summary`.
    pub fn projects(nodes: &[FilteredNode<'_>]) {
        let mut table = Table::new();

        table.add_row(row!["PROJECT", "PATH", "TASKS"]);
        for node in nodes {
            table.add_row(row![node.project.name(), node.project.path().display(), node.tasks.len()]);
        }
        table.printstd();
    }

    pub fn events(events: &[CalendarEvent]) {
        let mut table = Table::new();

        table.add_row(row!["START", "END", "SUMMARY", "REPEATS"]);
        for event in events {
            table.add_row(row![
                event.dtstart,
                event.end().map(|end| end.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default(),
                event.summary,
                event.rrule.as_ref().map(|rule| rule.to_string()).unwrap_or_default()
            ]);
        }
        table.printstd();
    }
}
