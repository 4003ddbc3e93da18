use serde_json::Value;

use super::diff::error_diff;
use crate::event::{ErrorCause, ErrorInfo};
use crate::theme::Theme;

/// Code of the engine's wrapper around whatever a test actually threw.
const TEST_FAILURE_CODE: &str = "ERR_TEST_FAILURE";
const CANCELLED_BY_PARENT: &str = "cancelledByParent";

/// Render a test failure: red title, optional expected/actual diff, muted stack.
pub fn format_error(error: &ErrorInfo, theme: &Theme) -> String {
    let mut error = error;
    if error.code_str() == Some(TEST_FAILURE_CODE) {
        if let Some(ErrorCause::Error(cause)) = &error.cause {
            error = &**cause;
        }

        if error.failure_type.as_deref() == Some(CANCELLED_BY_PARENT) {
            return theme.red("Test cancelled by parent error")
                + "\n"
                + &theme.gray(
                    "    This test was cancelled due to an error in its parent suite/it or test/it, or in one of its before/beforeEach",
                );
        }
    }

    let representation = inspect(error);
    let message = error.message.as_deref().unwrap_or_default();

    let (title, stack) = match title_end(&representation, message) {
        Some(end) => (
            representation[..end].to_string(),
            representation[end..]
                .trim_start_matches(&['\r', '\n'][..])
                .to_string(),
        ),
        None => (
            message.to_string(),
            error.stack.clone().unwrap_or_default(),
        ),
    };

    let title = theme.red(&title);
    let stack = theme.gray(&stack);

    match error_diff(error, theme) {
        Some(diff) => format!("{title}\n{diff}\n\n{stack}"),
        None => format!("{title}\n{stack}"),
    }
}

/// Byte offset where the title ends: right after the message, or after the
/// first line when there is no message to look for.
fn title_end(representation: &str, message: &str) -> Option<usize> {
    if message.is_empty() {
        return Some(representation.find('\n').unwrap_or(representation.len()));
    }
    representation
        .find(message)
        .map(|index| index + message.len())
}

/// Default textual form of an error: its stack (or `name: message` when
/// there is none) followed by a block of the notable extra properties.
fn inspect(error: &ErrorInfo) -> String {
    let mut out = match error.stack.as_deref() {
        Some(stack) if !stack.is_empty() => stack.to_string(),
        _ => header(error),
    };

    let properties = properties(error);
    if !properties.is_empty() {
        out.push_str(" {\n");
        out.push_str(&properties.join(",\n"));
        out.push_str("\n}");
    }

    out
}

fn header(error: &ErrorInfo) -> String {
    let name = error.name.as_deref().unwrap_or("Error");
    match error.message.as_deref() {
        Some(message) if !message.is_empty() => format!("{name}: {message}"),
        _ => name.to_string(),
    }
}

fn properties(error: &ErrorInfo) -> Vec<String> {
    let mut properties = Vec::new();
    if let Some(code) = &error.code {
        properties.push(format!("  code: {}", inspect_value(code)));
    }
    let strings = [
        ("failureType", &error.failure_type),
        ("operator", &error.operator),
    ];
    for (key, value) in strings {
        if let Some(value) = value {
            properties.push(format!("  {key}: '{value}'"));
        }
    }
    if let Some(ErrorCause::Other(cause)) = &error.cause {
        properties.push(format!("  cause: {}", inspect_value(cause)));
    }
    for (key, value) in [("expected", &error.expected), ("actual", &error.actual)] {
        if let Some(value) = value {
            properties.push(format!("  {key}: {}", inspect_value(value)));
        }
    }
    properties
}

fn inspect_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}
