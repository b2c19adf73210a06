//! Result reporting: what goes to stdout and how the process exits.
//!
//! Everything, errors included, goes to stdout so a caller reading one
//! stream sees the outcome. Logs go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use serde::Serialize;

use crate::error::CommandError;

/// How enumeration commands render their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A successful command result, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// One compact JSON document.
    Json(String),
    /// Human-readable text, printed verbatim.
    Text(String),
}

impl Output {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_string(value).map(Output::Json)
    }
}

/// `{"ok":"<message>"}`.
pub fn confirmation(message: &str) -> Result<Output, CommandError> {
    #[derive(Serialize)]
    struct Ack<'a> {
        ok: &'a str,
    }

    Ok(Output::json(&Ack {
        ok: &strip_quotes(message),
    })?)
}

/// Drop every `"` so hand-assembled JSON consumers never see a stray quote.
pub fn strip_quotes(s: &str) -> String {
    s.replace('"', "")
}

/// Final status of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Writes command results to an output stream.
pub struct Reporter<W> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print `result` and decide the exit status. An error never produces a
    /// success payload.
    pub fn report(&mut self, result: Result<Output, CommandError>) -> Outcome {
        let (written, outcome) = match result {
            Ok(output) => (self.success(&output), Outcome::Success),
            Err(err) => {
                tracing::debug!(error = ?err, "command failed");
                (self.error(&err), Outcome::Failure)
            }
        };

        match written {
            Ok(()) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "failed to write result");
                Outcome::Failure
            }
        }
    }

    pub fn success(&mut self, output: &Output) -> io::Result<()> {
        match output {
            Output::Json(json) => writeln!(self.out, "{json}")?,
            Output::Text(text) => self.out.write_all(text.as_bytes())?,
        }
        self.out.flush()
    }

    pub fn error(&mut self, err: &CommandError) -> io::Result<()> {
        writeln!(self.out, "{}", strip_quotes(&err.to_string()))?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
