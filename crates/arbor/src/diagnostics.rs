//! Folds the engine's free-text global diagnostics into run counters.
//!
//! At the end of a run the engine reports lines such as `pass 12` or
//! `duration_ms 431.5` at nesting 0. Anything deeper is left for verbatim
//! display by the reporter.

use std::str::FromStr;

use thiserror::Error;

use crate::event::Diagnostic;

/// Run counters reported by the engine. Values keep the engine's numeric
/// type, so fractional durations survive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlobalDiagnostics {
    pub tests: f64,
    pub suites: f64,
    pub pass: f64,
    pub fail: f64,
    pub cancelled: f64,
    pub skipped: f64,
    pub todo: f64,
    pub duration_ms: f64,
}

impl GlobalDiagnostics {
    pub fn set(&mut self, counter: Counter, value: f64) {
        let slot = match counter {
            Counter::Tests => &mut self.tests,
            Counter::Suites => &mut self.suites,
            Counter::Pass => &mut self.pass,
            Counter::Fail => &mut self.fail,
            Counter::Cancelled => &mut self.cancelled,
            Counter::Skipped => &mut self.skipped,
            Counter::Todo => &mut self.todo,
            Counter::DurationMs => &mut self.duration_ms,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Tests,
    Suites,
    Pass,
    Fail,
    Cancelled,
    Skipped,
    Todo,
    DurationMs,
}

impl FromStr for Counter {
    type Err = DiagnosticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "tests" => Counter::Tests,
            "suites" => Counter::Suites,
            "pass" => Counter::Pass,
            "fail" => Counter::Fail,
            "cancelled" => Counter::Cancelled,
            "skipped" => Counter::Skipped,
            "todo" => Counter::Todo,
            "duration_ms" => Counter::DurationMs,
            other => return Err(DiagnosticError::UnknownCounter(other.to_string())),
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiagnosticError {
    #[error("invalid global diagnostic name: {0}")]
    UnknownCounter(String),
    #[error("invalid global diagnostic message: {message}")]
    InvalidNumber { message: String },
}

/// Parse one nesting-0 diagnostic message.
///
/// Returns `Ok(None)` when the message lacks either a name or a value; such
/// lines are not counters at all and are skipped without complaint.
pub fn parse_global_diagnostic(message: &str) -> Result<Option<(Counter, f64)>, DiagnosticError> {
    let Some((name, rest)) = message.split_once(' ') else {
        return Ok(None);
    };
    let number = rest.split(' ').next().unwrap_or_default();
    if name.is_empty() || number.is_empty() {
        return Ok(None);
    }

    let counter = name.parse::<Counter>()?;
    let value = number
        .parse::<f64>()
        .map_err(|_| DiagnosticError::InvalidNumber {
            message: message.to_string(),
        })?;
    Ok(Some((counter, value)))
}

/// Fold the nesting-0 diagnostics into counters. The last value reported
/// for a counter wins. Malformed lines are logged and skipped.
pub fn fold_global_diagnostics(diagnostics: &[Diagnostic]) -> GlobalDiagnostics {
    let mut result = GlobalDiagnostics::default();

    for diagnostic in diagnostics.iter().filter(|d| d.nesting == 0) {
        match parse_global_diagnostic(&diagnostic.message) {
            Ok(Some((counter, value))) => result.set(counter, value),
            Ok(None) => {}
            Err(e) => tracing::warn!("{e}"),
        }
    }

    result
}
