//! Spans wrapping a single command invocation.

use tracing::span::EnteredSpan;

use crate::init::build_sha;

/// Keeps the command span entered until dropped.
#[derive(Debug)]
pub struct CommandSpan {
    _entered: EnteredSpan,
}

impl CommandSpan {
    /// Enter a span tagging every event with `command` and the build SHA.
    #[must_use]
    pub fn enter(command: &str) -> Self {
        let span = tracing::info_span!("command", command = %command, build_sha = %build_sha());
        Self {
            _entered: span.entered(),
        }
    }
}
