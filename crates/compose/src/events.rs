use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::{
    status::{ResourceType, Status, ERROR, PULL},
    warnings::{DiscardSink, WarningSink},
};

/// Prefix `docker compose --dry-run` puts in front of every progress line.
pub const DRY_RUN_MARKER: &str = "DRY-RUN MODE -";

const BARE_ERROR_PREFIX: &str = "Error ";

/// One classified line of `docker compose` progress output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub resource_type: ResourceType,
    /// Empty when the event is not tied to a specific resource.
    pub resource_id: String,
    pub status: Option<Status>,
    pub message: Option<String>,
}

impl Event {
    pub fn new(
        resource_type: ResourceType,
        resource_id: impl Into<String>,
        status: Option<Status>,
        message: Option<String>,
    ) -> Self {
        Self {
            resource_type,
            resource_id: resource_id.into(),
            status,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.is_some_and(|status| status.is_error())
    }

    pub fn is_working(&self) -> bool {
        self.status.is_some_and(|status| status.is_working())
    }

    /// Copy of this event with `line` appended to its message.
    fn with_continuation(&self, line: &str) -> Self {
        let message = match self.message.as_deref() {
            Some(existing) => format!("{existing}\n{line}"),
            None => line.to_string(),
        };
        Self {
            message: Some(message),
            ..self.clone()
        }
    }
}

/// Result of matching one line against the known event shapes, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineMatch<'a> {
    Resource {
        resource_type: ResourceType,
        resource_id: &'a str,
        status_or_message: &'a str,
    },
    Pull {
        service: &'a str,
        status: Status,
    },
    Error {
        resource_id: &'a str,
        status: Status,
    },
    Unmatched,
}

fn resource_event_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?P<resource_type>Network|Image|Volume|Container)\s+(?P<resource_id>\S+)\s+(?P<status>\S(?:.*\S)?)\s*$",
        )
        .expect("resource event pattern compiles")
    })
}

fn status_alternation(statuses: &[Status]) -> String {
    statuses
        .iter()
        .map(|status| regex::escape(status.as_str()))
        .collect::<Vec<_>>()
        .join("|")
}

fn pull_event_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^\s*(?P<service>\S+)\s+(?P<status>{})\s*$",
            status_alternation(PULL)
        ))
        .expect("pull event pattern compiles")
    })
}

fn error_event_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^\s*(?P<resource_id>\S+)\s+(?P<status>{})\s*$",
            status_alternation(ERROR)
        ))
        .expect("error event pattern compiles")
    })
}

fn match_resource_event(line: &str) -> Option<LineMatch<'_>> {
    let caps = resource_event_re().captures(line)?;
    let resource_type = ResourceType::from_compose_token(caps.name("resource_type")?.as_str())?;
    Some(LineMatch::Resource {
        resource_type,
        resource_id: caps.name("resource_id")?.as_str(),
        status_or_message: caps.name("status")?.as_str(),
    })
}

fn match_pull_event(line: &str) -> Option<LineMatch<'_>> {
    let caps = pull_event_re().captures(line)?;
    Some(LineMatch::Pull {
        service: caps.name("service")?.as_str(),
        status: Status::from_token(caps.name("status")?.as_str())?,
    })
}

fn match_error_event(line: &str) -> Option<LineMatch<'_>> {
    let caps = error_event_re().captures(line)?;
    Some(LineMatch::Error {
        resource_id: caps.name("resource_id")?.as_str(),
        status: Status::from_token(caps.name("status")?.as_str())?,
    })
}

/// Tries each event shape in order; resource lines are the most specific and win.
pub(crate) fn classify_line(line: &str) -> LineMatch<'_> {
    match_resource_event(line)
        .or_else(|| match_pull_event(line))
        .or_else(|| match_error_event(line))
        .unwrap_or(LineMatch::Unmatched)
}

/// Incremental parser for `docker compose` progress output (usually its stderr).
///
/// Lines that belong to no known shape are either glued onto the preceding error
/// event (multi-line daemon errors) or reported to the warning sink.
#[derive(Debug, Clone, Default)]
pub struct EventParser {
    dry_run: bool,
    events: Vec<Event>,
    /// Index of the error event that continuation lines are attached to.
    pending_error: Option<usize>,
}

impl EventParser {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            events: Vec::new(),
            pending_error: None,
        }
    }

    pub fn reset(&mut self) {
        self.events.clear();
        self.pending_error = None;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn finish(self) -> Vec<Event> {
        self.events
    }

    pub fn parse_line(&mut self, raw: &str, sink: &mut dyn WarningSink) {
        let mut line = raw.trim();
        if line.is_empty() {
            return;
        }

        if self.dry_run {
            if let Some(rest) = line.strip_prefix(DRY_RUN_MARKER) {
                line = rest.trim_start();
            } else if self.pending_error.is_none() {
                sink.warn(format!(
                    "Event line is missing dry-run mode marker: {line:?}. \
                     The docker compose output format may have changed."
                ));
            }
        }

        match classify_line(line) {
            LineMatch::Resource {
                resource_type,
                resource_id,
                status_or_message,
            } => {
                let (status, message) = match Status::from_token(status_or_message) {
                    Some(status) => (Some(status), None),
                    None => (None, Some(status_or_message.to_string())),
                };
                let event = Event::new(resource_type, resource_id, status, message);
                let is_error = event.is_error();
                self.events.push(event);
                self.pending_error = is_error.then(|| self.events.len() - 1);
            }
            LineMatch::Pull { service, status } => {
                self.events
                    .push(Event::new(ResourceType::Service, service, Some(status), None));
                self.pending_error = None;
            }
            LineMatch::Error {
                resource_id,
                status,
            } => {
                self.events
                    .push(Event::new(ResourceType::Unknown, resource_id, Some(status), None));
                self.pending_error = Some(self.events.len() - 1);
            }
            LineMatch::Unmatched => self.parse_unmatched(line, sink),
        }
    }

    fn parse_unmatched(&mut self, line: &str, sink: &mut dyn WarningSink) {
        if let Some(idx) = self.pending_error {
            let updated = self.events[idx].with_continuation(line);
            self.events[idx] = updated;
            return;
        }

        if line.starts_with(BARE_ERROR_PREFIX) {
            self.events.push(Event::new(
                ResourceType::Unknown,
                "",
                Some(Status::Error),
                Some(line.to_string()),
            ));
            self.pending_error = Some(self.events.len() - 1);
            return;
        }

        debug!(line, "unrecognized docker compose event line");
        sink.warn(format!(
            "Cannot parse event from line: {line:?}. \
             The docker compose output format may have changed."
        ));
    }
}

/// Parses the complete progress output of one `docker compose` invocation.
///
/// Never fails: lines that cannot be classified are reported to `sink` and skipped.
/// A bare `\r` ends a line just like `\n`.
pub fn parse_events(
    text: &str,
    dry_run: bool,
    sink: Option<&mut dyn WarningSink>,
) -> Vec<Event> {
    let mut discard = DiscardSink;
    let sink: &mut dyn WarningSink = match sink {
        Some(sink) => sink,
        None => &mut discard,
    };
    let mut parser = EventParser::new(dry_run);
    for line in text.split(['\n', '\r']) {
        parser.parse_line(line, &mut *sink);
    }
    parser.finish()
}
