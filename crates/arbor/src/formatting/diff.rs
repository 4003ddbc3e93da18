use std::collections::HashMap;

use dissimilar::Chunk;
use serde_json::Value;

use crate::event::ErrorInfo;
use crate::theme::Theme;

const NO_DIFF_MESSAGE: &str = "Compared values have no visual difference.";

/// First code point used to stand in for a distinct line while diffing.
/// Supplementary Private Use Area-A onwards, so it never collides with text.
const LINE_CODE_BASE: u32 = 0xF0000;

/// Expected/actual diff of an assertion error, if it carries both values
/// and has not opted out with `showDiff: false`.
pub fn error_diff(error: &ErrorInfo, theme: &Theme) -> Option<String> {
    let (Some(expected), Some(actual)) = (&error.expected, &error.actual) else {
        return None;
    };
    if error.show_diff == Some(false) {
        return None;
    }
    Some(format_diff(expected, actual, theme))
}

/// Line diff of two values. Two strings are compared as text, anything else
/// as pretty-printed JSON.
pub fn format_diff(expected: &Value, actual: &Value, theme: &Theme) -> String {
    let (expected, actual) = match (expected, actual) {
        (Value::String(e), Value::String(a)) => (e.clone(), a.clone()),
        (e, a) => (pretty(e), pretty(a)),
    };

    if expected == actual {
        return theme.gray(NO_DIFF_MESSAGE);
    }

    let mut out = format!("{}\n{}\n", theme.green("- Expected"), theme.red("+ Received"));
    for line in line_diff(&expected, &actual) {
        out.push('\n');
        let rendered = match line {
            DiffLine::Equal(text) => theme.gray(&format!("  {text}")),
            DiffLine::Delete(text) => theme.green(&format!("- {text}")),
            DiffLine::Insert(text) => theme.red(&format!("+ {text}")),
        };
        out.push_str(&rendered);
    }
    out
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffLine<'a> {
    Equal(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

/// Diff by whole lines: every distinct line is mapped to one private-use
/// char, the char strings are diffed, then mapped back. Lines are split on
/// `'\n'` only, so a trailing newline or a `\r` is a visible difference.
fn line_diff<'a>(expected: &'a str, actual: &'a str) -> Vec<DiffLine<'a>> {
    let mut interner = LineInterner::default();
    let (Some(left), Some(right)) = (interner.encode(expected), interner.encode(actual)) else {
        // Out of code points: show both sides whole.
        return expected
            .split('\n')
            .map(DiffLine::Delete)
            .chain(actual.split('\n').map(DiffLine::Insert))
            .collect();
    };

    let mut lines = Vec::new();
    for chunk in dissimilar::diff(&left, &right) {
        let (text, wrap): (&str, fn(&'a str) -> DiffLine<'a>) = match chunk {
            Chunk::Equal(text) => (text, DiffLine::Equal),
            Chunk::Delete(text) => (text, DiffLine::Delete),
            Chunk::Insert(text) => (text, DiffLine::Insert),
        };
        lines.extend(text.chars().map(|code| wrap(interner.decode(code))));
    }
    lines
}

#[derive(Default)]
struct LineInterner<'a> {
    lines: Vec<&'a str>,
    codes: HashMap<&'a str, char>,
}

impl<'a> LineInterner<'a> {
    fn encode(&mut self, text: &'a str) -> Option<String> {
        let mut encoded = String::new();
        for line in text.split('\n') {
            let code = match self.codes.get(line) {
                Some(&code) => code,
                None => {
                    let index = u32::try_from(self.lines.len()).ok()?;
                    let code = char::from_u32(LINE_CODE_BASE.checked_add(index)?)?;
                    self.lines.push(line);
                    self.codes.insert(line, code);
                    code
                }
            };
            encoded.push(code);
        }
        Some(encoded)
    }

    fn decode(&self, code: char) -> &'a str {
        let index = (u32::from(code) - LINE_CODE_BASE) as usize;
        self.lines[index]
    }
}
