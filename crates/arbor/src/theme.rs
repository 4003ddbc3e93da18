use crossterm::style::{StyledContent, Stylize};

/// Terminal palette for the report. A plain theme passes text through
/// untouched, which is what piped output and the tests use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::colored()
    }
}

impl Theme {
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    pub const fn colored() -> Self {
        Self::new(true)
    }

    pub const fn plain() -> Self {
        Self::new(false)
    }

    pub const fn is_colored(&self) -> bool {
        self.color
    }

    pub fn red(&self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }

    pub fn green(&self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    /// Muted text: passing tests, stack traces, durations.
    pub fn gray(&self, text: &str) -> String {
        self.paint(text, |t| t.dark_grey())
    }

    pub fn cyan(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan())
    }

    pub fn blue(&self, text: &str) -> String {
        self.paint(text, |t| t.blue())
    }

    pub fn italic(&self, text: &str) -> String {
        self.paint(text, |t| t.italic())
    }

    fn paint<'a>(
        &self,
        text: &'a str,
        style: impl FnOnce(&'a str) -> StyledContent<&'a str>,
    ) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}
