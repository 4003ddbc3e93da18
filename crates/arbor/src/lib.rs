//! Streaming, hierarchical console reporter for test lifecycle events.
//!
//! Feed a [`Reporter`] any iterator of [`Event`]s and pull rendered output
//! fragments from it:
//!
//! ```
//! use arbor::{Event, Reporter, ReporterConfig, Theme};
//!
//! let events: Vec<Event> = [
//!     r#"{"type":"test:start","data":{"name":"math","nesting":0}}"#,
//!     r#"{"type":"test:start","data":{"name":"adds","nesting":1}}"#,
//!     r#"{"type":"test:pass","data":{"name":"adds","nesting":1,"details":{"type":"test","duration_ms":1}}}"#,
//!     r#"{"type":"test:pass","data":{"name":"math","nesting":0,"details":{"type":"suite","duration_ms":2}}}"#,
//! ]
//! .iter()
//! .map(|line| serde_json::from_str(line).unwrap())
//! .collect();
//!
//! let config = ReporterConfig { theme: Theme::plain(), ..Default::default() };
//! let output: String = Reporter::new(events.into_iter(), config)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert!(output.starts_with("  math\n    ✔ adds\n"));
//! ```

pub mod diagnostics;
pub mod event;
pub mod formatting;
pub mod reporter;
pub mod theme;

pub use diagnostics::{GlobalDiagnostics, fold_global_diagnostics};
pub use event::Event;
pub use reporter::{DEFAULT_SLOW_THRESHOLD_MS, FailureRecord, ReportError, Reporter, ReporterConfig};
pub use theme::Theme;
