use serde::Serialize;

use crate::{
    events::Event,
    status::{ResourceType, Status},
    warnings::WarningSink,
};

/// A resource the compose invocation acted upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub what: ResourceType,
    pub id: String,
    pub status: Status,
}

/// Everything needed to explain a failed compose invocation to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub msg: String,
    /// Shell-quoted command line that was executed.
    pub cmd: String,
    pub stdout: String,
    pub stderr: String,
    pub rc: i32,
}

pub fn has_changes(events: &[Event]) -> bool {
    events.iter().any(Event::is_working)
}

pub fn extract_actions(events: &[Event]) -> Vec<Action> {
    events
        .iter()
        .filter_map(|event| match event.status {
            Some(status) if status.is_working() => Some(Action {
                what: event.resource_type,
                id: event.resource_id.clone(),
                status,
            }),
            _ => None,
        })
        .collect()
}

/// Reports every event that carries a message but no status; compose prints warnings
/// in the status column.
pub fn emit_warnings(events: &[Event], sink: &mut dyn WarningSink) {
    for event in events {
        if let (None, Some(message)) = (event.status, event.message.as_deref()) {
            sink.warn(format!(
                "Docker compose: {} {}: {}",
                event.resource_type, event.resource_id, message
            ));
        }
    }
}

pub fn is_failed(events: &[Event], rc: i32) -> bool {
    rc != 0 || events.iter().any(Event::is_error)
}

fn describe_error(event: &Event) -> String {
    let prefix = match (event.resource_type, event.resource_id.as_str()) {
        (ResourceType::Unknown, "") => "General error: ".to_string(),
        (ResourceType::Unknown, id) => format!("Error when processing {id}: "),
        (resource_type, id) => format!("Error when processing {resource_type} {id}: "),
    };
    let detail = match (event.message.as_deref(), event.status) {
        (Some(message), _) => message.to_string(),
        (None, Some(status)) => status.to_string(),
        (None, None) => String::new(),
    };
    format!("{prefix}{detail}")
}

/// Quotes `cli` and `args` the way a POSIX shell would need them for replay.
pub fn render_command(cli: &str, args: &[String]) -> String {
    shell_words::join(std::iter::once(cli).chain(args.iter().map(String::as_str)))
}

/// Builds the failure payload for a compose invocation, or `None` when nothing failed.
///
/// A non-zero return code without any error events still counts as a failure.
pub fn build_failure_report(
    events: &[Event],
    rc: i32,
    args: &[String],
    stdout: &str,
    stderr: &str,
    cli: &str,
) -> Option<FailureReport> {
    let mut errors: Vec<String> = events
        .iter()
        .filter(|event| event.is_error())
        .map(describe_error)
        .collect();

    if errors.is_empty() {
        if rc == 0 {
            return None;
        }
        errors.push(format!("Return code {rc} is non-zero"));
    }

    Some(FailureReport {
        msg: errors.join("\n"),
        cmd: render_command(cli, args),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        rc,
    })
}
