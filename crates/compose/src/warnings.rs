/// Receives diagnostics that should reach the user without failing the operation.
///
/// The parser reports lines it cannot classify here; the aggregators report events
/// that carry a free-text message instead of a status.
pub trait WarningSink {
    fn warn(&mut self, message: String);
}

impl<F> WarningSink for F
where
    F: FnMut(String),
{
    fn warn(&mut self, message: String) {
        self(message)
    }
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&mut self, message: String) {
        tracing::warn!(target: "compose", "{message}");
    }
}

/// Drops every warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl WarningSink for DiscardSink {
    fn warn(&mut self, _message: String) {}
}
