#![forbid(unsafe_code)]
//! Helpers around the `docker compose` CLI.
//!
//! The core is [`parse_events`], which turns the human-readable progress output that
//! compose writes to stderr into typed [`Event`]s, and the aggregators in this crate
//! that derive `changed`, the list of actions and failure details from those events.
//! [`ComposeManager`] ties them to a project directory and a CLI runner.

mod aggregate;
mod builder;
mod containers;
mod error;
mod events;
mod manager;
mod process;
mod result;
mod status;
mod version;
mod warnings;

pub use aggregate::{
    build_failure_report, emit_warnings, extract_actions, has_changes, is_failed,
    render_command, Action, FailureReport,
};
pub use builder::{ComposeProjectBuilder, COMPOSE_FILES};
pub use containers::{parse_json, parse_json_stream, parse_labels, ComposeContainer, RawContainer};
pub use error::ComposeError;
pub use events::{parse_events, Event, EventParser, DRY_RUN_MARKER};
pub use manager::ComposeManager;
pub use process::{CliRunner, CommandOutput, CommandRequest, ComposeRunner};
pub use result::{combine_binary_output, combine_text_output, ComposeResult};
pub use status::{ResourceType, Status, DONE, ERROR, PULL, WORKING};
pub use version::{detect_compose_version, ComposeVersion};
pub use warnings::{DiscardSink, TracingSink, WarningSink};
