use serde::Serialize;

use crate::aggregate::{Action, FailureReport};

/// Module result accumulated over one or more compose invocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComposeResult {
    pub changed: bool,
    pub actions: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc: Option<i32>,
}

impl ComposeResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the output fields with the failure details.
    pub fn apply_failure(&mut self, report: FailureReport) {
        self.failed = true;
        self.msg = Some(report.msg);
        self.cmd = Some(report.cmd);
        self.stdout = Some(report.stdout);
        self.stderr = Some(report.stderr);
        self.rc = Some(report.rc);
    }

    /// Drops empty `stdout`/`stderr` unless the result is a failure.
    pub fn cleanup(&mut self) {
        if self.failed {
            return;
        }
        for output in [&mut self.stdout, &mut self.stderr] {
            if output.as_deref() == Some("") {
                *output = None;
            }
        }
    }
}

/// Joins the non-empty outputs with newlines.
pub fn combine_text_output<'a>(outputs: impl IntoIterator<Item = Option<&'a str>>) -> String {
    outputs
        .into_iter()
        .flatten()
        .filter(|out| !out.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn combine_binary_output<'a>(outputs: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut combined = Vec::new();
    for out in outputs.into_iter().filter(|out| !out.is_empty()) {
        if !combined.is_empty() {
            combined.push(b'\n');
        }
        combined.extend_from_slice(out);
    }
    combined
}
