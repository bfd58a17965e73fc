use super::load_project;
use crate::{
    libs::{filter::Filter, messages::Message, view::View},
    msg_error_anyhow, msg_info, msg_print, msg_warning,
};
use anyhow::Result;
use clap::Args;
use std::path::Path;

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Filter expression applied before projecting tasks onto the calendar
    filter: Option<String>,
}

pub fn cmd(root: &Path, events_args: EventsArgs) -> Result<()> {
    let filter = Filter::parse(events_args.filter.as_deref().unwrap_or_default())
        .map_err(|e| msg_error_anyhow!(Message::FilterInvalid(e.to_string())))?;
    let tree = load_project(root)?;

    let mut events = Vec::new();
    for node in tree.filtered_tasks(&filter) {
        for task in node.tasks {
            let id = task.id().unwrap_or_default();
            let uid = format!("{}@{}", id, node.project.name());
            match task.as_calendar_event(&uid) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(error) => msg_warning!(Message::EventSkipped(id.to_string(), error.to_string())),
            }
        }
    }

    if events.is_empty() {
        msg_info!(Message::EventsNotFound);
        return Ok(());
    }

    events.sort_by(|a, b| {
        a.dtstart
            .to_datetime()
            .cmp(&b.dtstart.to_datetime())
            .then_with(|| a.summary.cmp(&b.summary))
    });
    msg_print!(Message::EventsHeader);
    View::events(&events);
    Ok(())
}
