//! Turns the engine's event stream into hierarchical console output.
//!
//! Passing tests are rendered as they arrive, under a breadcrumb of the
//! suites that contain them. Failures get a number in the live tree and
//! their full error is held back until the run summary at the end.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use thiserror::Error;

use crate::diagnostics::fold_global_diagnostics;
use crate::event::{Diagnostic, Event, TestResult, TestStart};
use crate::formatting::{
    INFO_SYMBOL, SUCCESS_SYMBOL, breadcrumb, format_error, format_global_diagnostics, indent,
    nesting_indent,
};
use crate::theme::Theme;

/// Tests slower than this get their duration printed.
pub const DEFAULT_SLOW_THRESHOLD_MS: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReporterConfig {
    pub theme: Theme,
    pub slow_threshold_ms: f64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("`{name}` finished at nesting {nesting}, but no suite or test was open")]
    UnbalancedClose { name: String, nesting: usize },
}

/// A failed test together with the ancestry it failed under, the test
/// itself being the last entry.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub data: TestResult,
    pub parent_stack: Vec<TestStart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Streaming,
    /// Source exhausted; rendering the failure at this index next.
    Failures(usize),
    Done,
}

/// Pull-based reporter. Each call to `next` yields one output fragment,
/// reading at most one more event from `source` to produce it.
pub struct Reporter<I> {
    source: I,
    config: ReporterConfig,
    stack: Vec<TestStart>,
    /// Deepest stack index whose breadcrumb line is still valid on screen.
    last_printed: Option<usize>,
    diagnostics: Vec<Diagnostic>,
    failures: Vec<FailureRecord>,
    pending: VecDeque<String>,
    phase: Phase,
}

impl<I> Reporter<I>
where
    I: Iterator<Item = Event>,
{
    pub fn new(source: I, config: ReporterConfig) -> Self {
        Self {
            source,
            config,
            stack: Vec::new(),
            last_printed: None,
            diagnostics: Vec::new(),
            failures: Vec::new(),
            pending: VecDeque::new(),
            phase: Phase::Streaming,
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    /// Number of suites and tests started but not yet finished.
    pub fn open_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn into_source(self) -> I {
        self.source
    }

    fn emit(&mut self, fragment: impl Into<String>) {
        self.pending.push_back(fragment.into());
    }

    fn handle(&mut self, event: Event) -> Result<(), ReportError> {
        match event {
            Event::Diagnostic(diagnostic) => self.diagnostics.push(diagnostic),
            Event::Start(start) => {
                tracing::debug!(name = %start.name, nesting = start.nesting, "test:start");
                self.stack.push(start);
            }
            Event::Pass(result) => self.finish_entry(result, false)?,
            Event::Fail(result) => self.finish_entry(result, true)?,
            Event::Stdout(output) | Event::Stderr(output) => self.emit(output.message),
            Event::Dequeue(entry) => {
                tracing::debug!(name = %entry.name, nesting = entry.nesting, "test:dequeue");
            }
            Event::Plan(_) | Event::Enqueue(_) | Event::Complete(_) | Event::WatchDrained => {}
            Event::Coverage => {
                let notice = self
                    .config
                    .theme
                    .red("\nTest coverage not supported by this reporter\n");
                self.emit(notice);
            }
            Event::Unknown { kind, data } => {
                tracing::warn!(%kind, %data, "unsupported test event type");
            }
        }
        Ok(())
    }

    fn finish_entry(&mut self, result: TestResult, failed: bool) -> Result<(), ReportError> {
        tracing::debug!(
            name = %result.name,
            nesting = result.nesting,
            failed,
            "test finished"
        );
        if self.stack.is_empty() {
            return Err(ReportError::UnbalancedClose {
                name: result.name,
                nesting: result.nesting,
            });
        }

        if result.is_suite() {
            self.close_suite(&result);
        } else {
            self.close_test(result, failed);
        }
        Ok(())
    }

    fn close_suite(&mut self, result: &TestResult) {
        self.stack.pop();
        let depth = self.stack.len();

        if result.nesting == 0 {
            self.last_printed = None;
            self.emit("\n");
        } else if self.last_printed.is_some_and(|index| index >= depth) {
            self.last_printed = depth.checked_sub(1);
        }
    }

    fn close_test(&mut self, result: TestResult, failed: bool) {
        let theme = self.config.theme;
        let parent = self.stack.len().checked_sub(2);

        if self.last_printed != parent {
            let from = self.last_printed.map_or(0, |index| index + 1);
            let to = self.stack.len() - 1;
            if from < to {
                self.pending
                    .extend(breadcrumb(&self.stack[from..to], "", "").fragments());
            }
            self.last_printed = parent;
        }

        let nesting = result.nesting;
        let duration_ms = result.details.duration_ms;
        self.emit(nesting_indent(nesting));

        let line = if failed {
            let line = theme.red(&format!("{}) {}", self.failures.len() + 1, result.name));
            self.failures.push(FailureRecord {
                data: result,
                parent_stack: self.stack.clone(),
            });
            line
        } else if result.skip.is_set() {
            // TODO: show the skip reason when one is given
            theme.cyan(&format!("- {}", result.name))
        } else if result.todo.is_set() {
            theme.blue(&format!("+ {}", result.name))
        } else {
            theme.gray(&format!("{SUCCESS_SYMBOL} {}", result.name))
        };
        self.emit(line);

        if duration_ms > self.config.slow_threshold_ms {
            let duration = theme.italic(&format!("({}ms)", duration_ms.floor()));
            self.emit(" ");
            self.emit(theme.red(&duration));
        }
        self.emit("\n");

        self.stack.pop();

        // Top-level tests are separated by an empty line
        if nesting == 0 {
            self.emit("\n");
        }
    }

    /// Queue the run summary once the source is exhausted. Failures are
    /// rendered one per pull afterwards.
    fn finish_stream(&mut self) {
        if !self.stack.is_empty() {
            let open: Vec<&str> = self.stack.iter().map(|s| s.name.as_str()).collect();
            tracing::warn!(?open, "event stream ended before every suite finished");
        }

        let theme = self.config.theme;
        let totals = fold_global_diagnostics(&self.diagnostics);
        let messages = self
            .diagnostics
            .iter()
            .filter(|d| d.nesting != 0)
            .map(|d| format!("{INFO_SYMBOL} {}", d.message))
            .collect::<Vec<_>>()
            .join("\n");

        self.emit("\n");
        self.emit(format_global_diagnostics(&totals, &theme));
        if !messages.is_empty() {
            self.emit("\n");
            self.emit(theme.gray(&messages));
        }
        self.emit("\n\n");
    }
}

fn failure_fragments(
    number: usize,
    failure: &FailureRecord,
    theme: &Theme,
    out: &mut VecDeque<String>,
) {
    let prefix = format!("{number}) ");
    out.extend(breadcrumb(&failure.parent_stack, &prefix, ":").fragments());
    out.push_back("\n".to_string());

    let rendered = match &failure.data.details.error {
        Some(error) => format_error(error, theme),
        None => format_error(&Default::default(), theme),
    };
    out.push_back(indent(&rendered, 3));
    out.push_back("\n\n".to_string());
}

impl<I> Iterator for Reporter<I>
where
    I: Iterator<Item = Event>,
{
    type Item = Result<String, ReportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                if fragment.is_empty() {
                    continue;
                }
                return Some(Ok(fragment));
            }

            match self.phase {
                Phase::Streaming => match self.source.next() {
                    Some(event) => {
                        if let Err(e) = self.handle(event) {
                            self.pending.clear();
                            self.phase = Phase::Done;
                            return Some(Err(e));
                        }
                    }
                    None => {
                        self.finish_stream();
                        self.phase = Phase::Failures(0);
                    }
                },
                Phase::Failures(index) => match self.failures.get(index) {
                    Some(failure) => {
                        failure_fragments(
                            index + 1,
                            failure,
                            &self.config.theme,
                            &mut self.pending,
                        );
                        self.phase = Phase::Failures(index + 1);
                    }
                    None => self.phase = Phase::Done,
                },
                Phase::Done => return None,
            }
        }
    }
}

impl<I> FusedIterator for Reporter<I> where I: Iterator<Item = Event> {}
