use arbor::Event;
use std::io::{self, BufRead, Lines};

/// Reads newline-delimited JSON events. Blank lines are skipped and lines
/// that do not parse as an event are logged and skipped. An I/O error ends
/// the stream; it is handed back by [`EventSource::finish`].
pub struct EventSource<R> {
    lines: Lines<R>,
    line_number: usize,
    error: Option<io::Error>,
}

impl<R: BufRead> EventSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            error: None,
        }
    }

    pub fn finish(self) -> io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<R: BufRead> Iterator for EventSource<R> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.error.is_some() {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.error = Some(e);
                    return None;
                }
            };
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Event>(line) {
                Ok(event) => return Some(event),
                Err(e) => tracing::warn!(
                    line = self.line_number,
                    error = %e,
                    "skipping line that is not a test event"
                ),
            }
        }
    }
}
