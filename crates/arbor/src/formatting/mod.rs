//! Stateless rendering helpers used by the reporter.

pub mod diff;
pub mod error;

pub use diff::{error_diff, format_diff};
pub use error::format_error;

use std::fmt;
use std::iter;

use crate::diagnostics::GlobalDiagnostics;
use crate::event::TestStart;
use crate::theme::Theme;

pub const SUCCESS_SYMBOL: &str = "✔";
pub const INFO_SYMBOL: &str = "ℹ";

/// Prefix every line of `text` with `spaces` spaces, blank lines included.
pub fn indent(text: &str, spaces: usize) -> String {
    let padding = " ".repeat(spaces);
    text.split('\n')
        .map(|line| format!("{padding}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indentation of a suite or test line at the given nesting.
pub fn nesting_indent(nesting: usize) -> String {
    " ".repeat((nesting + 1) * 2)
}

/// Final counters, e.g. `3 passing (12ms)` followed by the non-zero
/// failing / skipped / todo / cancelled lines.
pub fn format_global_diagnostics(diagnostics: &GlobalDiagnostics, theme: &Theme) -> String {
    let mut result = theme.green(&format!("{} passing", diagnostics.pass))
        + &theme.gray(&format!(" ({}ms)", diagnostics.duration_ms.floor()));

    if diagnostics.fail > 0.0 {
        result += &theme.red(&format!("\n{} failing", diagnostics.fail));
    }
    if diagnostics.skipped > 0.0 {
        result += &theme.cyan(&format!("\n{} skipped", diagnostics.skipped));
    }
    if diagnostics.todo > 0.0 {
        result += &theme.blue(&format!("\n{} todo", diagnostics.todo));
    }
    if diagnostics.cancelled > 0.0 {
        result += &theme.gray(&format!("\n{} cancelled", diagnostics.cancelled));
    }

    result
}

/// Rendered chain of ancestors, one line per entry.
///
/// The first line carries `prefix` (a failure number, say) and the later
/// lines are pushed right by its width so the names stay aligned. `suffix`
/// goes after the last name, then a single newline ends the block.
#[derive(Debug, Clone, Copy)]
pub struct Breadcrumb<'a> {
    ancestors: &'a [TestStart],
    prefix: &'a str,
    suffix: &'a str,
}

pub fn breadcrumb<'a>(
    ancestors: &'a [TestStart],
    prefix: &'a str,
    suffix: &'a str,
) -> Breadcrumb<'a> {
    Breadcrumb {
        ancestors,
        prefix,
        suffix,
    }
}

impl<'a> Breadcrumb<'a> {
    /// Lazily yields the output fragments. Each call starts over.
    pub fn fragments(self) -> impl Iterator<Item = String> + 'a {
        let Breadcrumb {
            ancestors,
            prefix,
            suffix,
        } = self;
        let prefix_width = prefix.chars().count();

        ancestors
            .iter()
            .enumerate()
            .flat_map(move |(i, ancestor)| {
                let first = i == 0;
                let separator = (!first).then(|| "\n".to_string());
                let mut padding = nesting_indent(ancestor.nesting);
                if !first {
                    padding.push_str(&" ".repeat(prefix_width));
                }
                let lead = (first && !prefix.is_empty()).then(|| prefix.to_string());

                separator
                    .into_iter()
                    .chain(iter::once(padding))
                    .chain(lead)
                    .chain(iter::once(ancestor.name.clone()))
            })
            .chain(iter::once(format!("{suffix}\n")))
    }
}

impl fmt::Display for Breadcrumb<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in self.fragments() {
            f.write_str(&fragment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, nesting: usize) -> TestStart {
        TestStart {
            name: name.to_string(),
            nesting,
        }
    }

    #[test]
    fn indent_pads_every_line() {
        assert_eq!(indent("a\n\nb", 3), "   a\n   \n   b");
        assert_eq!(indent("x\n", 2), "  x\n  ");
        assert_eq!(indent("", 2), "  ");
    }

    #[test]
    fn summary_with_only_passes_is_one_line() {
        let diagnostics = GlobalDiagnostics {
            pass: 3.0,
            duration_ms: 12.7,
            ..Default::default()
        };
        assert_eq!(
            format_global_diagnostics(&diagnostics, &Theme::plain()),
            "3 passing (12ms)"
        );
    }

    #[test]
    fn summary_appends_non_zero_counters_in_order() {
        let diagnostics = GlobalDiagnostics {
            pass: 4.0,
            fail: 2.0,
            skipped: 1.0,
            todo: 0.0,
            cancelled: 3.0,
            duration_ms: 1000.99,
            ..Default::default()
        };
        assert_eq!(
            format_global_diagnostics(&diagnostics, &Theme::plain()),
            "4 passing (1000ms)\n2 failing\n1 skipped\n3 cancelled"
        );
    }

    #[test]
    fn breadcrumb_indents_by_nesting() {
        let stack = [start("math", 0), start("addition", 1)];
        assert_eq!(
            breadcrumb(&stack, "", "").to_string(),
            "  math\n    addition\n"
        );
    }

    #[test]
    fn breadcrumb_prefix_and_suffix() {
        let stack = [start("math", 0), start("addition", 1), start("adds", 2)];
        assert_eq!(
            breadcrumb(&stack, "1) ", ":").to_string(),
            "  1) math\n       addition\n         adds:\n"
        );
    }

    #[test]
    fn breadcrumb_is_restartable() {
        let stack = [start("a", 0)];
        let crumb = breadcrumb(&stack, "", "");
        let first: Vec<String> = crumb.fragments().collect();
        let second: Vec<String> = crumb.fragments().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["  ", "a", "\n"]);
    }

    #[test]
    fn empty_breadcrumb_is_just_the_suffix_line() {
        assert_eq!(breadcrumb(&[], "", ":").to_string(), ":\n");
    }
}
