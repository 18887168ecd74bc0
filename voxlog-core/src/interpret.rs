//! Error interpretation and reporting collaborators.
//!
//! Storage failures are spoken to the user in plain words; fatal protocol
//! violations go to the reporter as would-be crash reports. Reporters must
//! never fail themselves.

use crate::skill::FatalError;
use tracing::error;

/// Turns a backing-store error into a short user-facing explanation.
pub trait ErrorInterpreter {
    fn interpret(&self, error: &anyhow::Error) -> String;
}

/// Sink for recovered errors and fatal conditions.
pub trait ErrorReporter {
    fn report_error(&self, error: &anyhow::Error);
    fn report_panic(&self, error: &FatalError, turn_context: &str);
}

/// Speaks the error chain as-is. A real deployment would map known backend
/// error types to friendlier wording here.
#[derive(Debug, Default)]
pub struct PlainErrorInterpreter;

impl ErrorInterpreter for PlainErrorInterpreter {
    fn interpret(&self, error: &anyhow::Error) -> String {
        format!("{error:#}")
    }
}

/// Reports through the tracing pipeline.
#[derive(Debug, Default)]
pub struct LoggingErrorReporter;

impl ErrorReporter for LoggingErrorReporter {
    fn report_error(&self, error: &anyhow::Error) {
        error!(error = %format!("{error:#}"), "recovered error");
    }

    fn report_panic(&self, error: &FatalError, turn_context: &str) {
        error!(%error, turn_context, "fatal protocol violation");
    }
}
