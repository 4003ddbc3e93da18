use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Lifecycle event emitted by the test engine, discriminated by `"type"`
/// with its payload under `"data"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawEvent")]
pub enum Event {
    Start(TestStart),
    Pass(TestResult),
    Fail(TestResult),
    Diagnostic(Diagnostic),
    Stdout(Output),
    Stderr(Output),
    Plan(Plan),
    Enqueue(QueueEntry),
    Dequeue(QueueEntry),
    Complete(QueueEntry),
    WatchDrained,
    Coverage,
    /// Any tag this reporter does not know about.
    Unknown { kind: String, data: Value },
}

impl Event {
    /// The wire tag of this event.
    pub fn kind(&self) -> &str {
        match self {
            Event::Start(_) => "test:start",
            Event::Pass(_) => "test:pass",
            Event::Fail(_) => "test:fail",
            Event::Diagnostic(_) => "test:diagnostic",
            Event::Stdout(_) => "test:stdout",
            Event::Stderr(_) => "test:stderr",
            Event::Plan(_) => "test:plan",
            Event::Enqueue(_) => "test:enqueue",
            Event::Dequeue(_) => "test:dequeue",
            Event::Complete(_) => "test:complete",
            Event::WatchDrained => "test:watch:drained",
            Event::Coverage => "test:coverage",
            Event::Unknown { kind, .. } => kind,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawEvent> for Event {
    type Error = serde_json::Error;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let data = raw.data;
        let event = match raw.kind.as_str() {
            "test:start" => Event::Start(serde_json::from_value(data)?),
            "test:pass" => Event::Pass(serde_json::from_value(data)?),
            "test:fail" => Event::Fail(serde_json::from_value(data)?),
            "test:diagnostic" => Event::Diagnostic(serde_json::from_value(data)?),
            "test:stdout" => Event::Stdout(serde_json::from_value(data)?),
            "test:stderr" => Event::Stderr(serde_json::from_value(data)?),
            "test:plan" => Event::Plan(serde_json::from_value(data)?),
            "test:enqueue" => Event::Enqueue(serde_json::from_value(data)?),
            "test:dequeue" => Event::Dequeue(serde_json::from_value(data)?),
            "test:complete" => Event::Complete(serde_json::from_value(data)?),
            "test:watch:drained" => Event::WatchDrained,
            "test:coverage" => Event::Coverage,
            _ => Event::Unknown {
                kind: raw.kind,
                data,
            },
        };
        Ok(event)
    }
}

/// A suite or test has started. One entry of the ancestor stack.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestStart {
    pub name: String,
    pub nesting: usize,
}

/// Payload shared by `test:pass` and `test:fail`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub nesting: usize,
    #[serde(default)]
    pub skip: Directive,
    #[serde(default)]
    pub todo: Directive,
    #[serde(default)]
    pub details: TestDetails,
}

impl TestResult {
    pub fn is_suite(&self) -> bool {
        self.details.kind == DetailsKind::Suite
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestDetails {
    #[serde(rename = "type", default)]
    pub kind: DetailsKind,
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailsKind {
    #[default]
    Test,
    Suite,
}

/// `skip` / `todo` marker: either a flag or a reason string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Directive {
    Flag(bool),
    Reason(String),
}

impl Default for Directive {
    fn default() -> Self {
        Directive::Flag(false)
    }
}

impl Directive {
    /// A reason string counts as set, even when empty.
    pub fn is_set(&self) -> bool {
        matches!(self, Directive::Flag(true) | Directive::Reason(_))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Diagnostic {
    #[serde(default)]
    pub nesting: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Output {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub nesting: usize,
    #[serde(default)]
    pub count: usize,
}

/// Payload of `test:enqueue`, `test:dequeue` and `test:complete`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueueEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nesting: usize,
}

/// Error payload attached to a failed test. Every field is optional.
///
/// Thrown values are arbitrary, so text fields accept numbers and booleans
/// too, and `code` keeps whatever JSON value the engine sent (JSON-RPC
/// errors, for one, carry numeric codes).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub stack: Option<String>,
    pub code: Option<Value>,
    #[serde(default, deserialize_with = "text")]
    pub failure_type: Option<String>,
    pub cause: Option<ErrorCause>,
    #[serde(default, deserialize_with = "present")]
    pub expected: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub actual: Option<Value>,
    #[serde(default, deserialize_with = "text")]
    pub operator: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub show_diff: Option<bool>,
}

impl ErrorInfo {
    /// The `code` property when it is a string.
    pub fn code_str(&self) -> Option<&str> {
        self.code.as_ref().and_then(Value::as_str)
    }
}

/// Scalars become text. `null` and structured values are treated as absent.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool())
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing key is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorCause {
    Error(Box<ErrorInfo>),
    Other(Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Event {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn parses_start_and_leaf_pass() {
        let start =
            parse(r#"{"type":"test:start","data":{"name":"adds","nesting":1,"file":"a.js"}}"#);
        match start {
            Event::Start(s) => assert_eq!(
                s,
                TestStart {
                    name: "adds".into(),
                    nesting: 1
                }
            ),
            other => panic!("unexpected {other:?}"),
        }

        let pass = parse(
            r#"{"type":"test:pass","data":{"name":"adds","nesting":1,"details":{"type":"test","duration_ms":3.2}}}"#,
        );
        let Event::Pass(result) = pass else {
            panic!("expected pass");
        };
        assert!(!result.is_suite());
        assert!(!result.skip.is_set());
        assert_eq!(result.details.duration_ms, 3.2);
    }

    #[test]
    fn skip_reason_string_counts_as_set() {
        let event = parse(
            r#"{"type":"test:pass","data":{"name":"x","nesting":0,"skip":"not on windows","details":{"type":"test","duration_ms":0}}}"#,
        );
        let Event::Pass(result) = event else {
            panic!("expected pass");
        };
        assert!(result.skip.is_set());
        assert_eq!(result.skip, Directive::Reason("not on windows".into()));
        assert!(!result.todo.is_set());
    }

    #[test]
    fn missing_details_default_to_test() {
        let event = parse(r#"{"type":"test:fail","data":{"name":"x","nesting":2}}"#);
        let Event::Fail(result) = event else {
            panic!("expected fail");
        };
        assert_eq!(result.details.kind, DetailsKind::Test);
        assert_eq!(result.details.duration_ms, 0.0);
        assert!(result.details.error.is_none());
    }

    #[test]
    fn failure_envelope_keeps_nested_cause() {
        let event = parse(
            r#"{"type":"test:fail","data":{"name":"x","nesting":0,"details":{"type":"test","duration_ms":1,
               "error":{"code":"ERR_TEST_FAILURE","failureType":"testCodeFailure",
                        "cause":{"name":"AssertionError","message":"boom","expected":1,"actual":2,"showDiff":true}}}}}"#,
        );
        let Event::Fail(result) = event else {
            panic!("expected fail");
        };
        let error = result.details.error.unwrap();
        assert_eq!(error.code_str(), Some("ERR_TEST_FAILURE"));
        assert_eq!(error.failure_type.as_deref(), Some("testCodeFailure"));
        match error.cause {
            Some(ErrorCause::Error(inner)) => {
                assert_eq!(inner.message.as_deref(), Some("boom"));
                assert_eq!(inner.show_diff, Some(true));
            }
            other => panic!("unexpected cause {other:?}"),
        }
    }

    #[test]
    fn numeric_code_does_not_reject_the_failure() {
        let event = parse(
            r#"{"type":"test:fail","data":{"name":"rpc","nesting":0,"details":{"type":"test","duration_ms":1,
               "error":{"name":"ProviderError","code":-32603,"message":"boom"}}}}"#,
        );
        let Event::Fail(result) = event else {
            panic!("expected fail");
        };
        let error = result.details.error.unwrap();
        assert_eq!(error.code, Some(Value::from(-32603)));
        assert_eq!(error.code_str(), None);
        assert_eq!(error.message.as_deref(), Some("boom"));
    }

    #[test]
    fn numeric_code_in_cause_is_still_an_error() {
        let error: ErrorInfo = serde_json::from_str(
            r#"{"code":"ERR_TEST_FAILURE","cause":{"name":"ProviderError","code":-32603,"message":"inner boom","operator":7,"showDiff":"yes"}}"#,
        )
        .unwrap();
        let Some(ErrorCause::Error(inner)) = error.cause else {
            panic!("cause should be an error");
        };
        assert_eq!(inner.name.as_deref(), Some("ProviderError"));
        assert_eq!(inner.operator.as_deref(), Some("7"));
        assert_eq!(inner.show_diff, None);
    }

    #[test]
    fn string_cause_is_not_an_error() {
        let event = parse(
            r#"{"type":"test:fail","data":{"name":"x","nesting":0,"details":{"error":{"code":"ERR_TEST_FAILURE","cause":"cancelled"}}}}"#,
        );
        let Event::Fail(result) = event else {
            panic!("expected fail");
        };
        assert!(matches!(
            result.details.error.unwrap().cause,
            Some(ErrorCause::Other(Value::String(_)))
        ));
    }

    #[test]
    fn explicit_null_expected_is_present() {
        let error: ErrorInfo =
            serde_json::from_str(r#"{"message":"m","expected":null,"actual":0}"#).unwrap();
        assert_eq!(error.expected, Some(Value::Null));
        assert_eq!(error.actual, Some(Value::from(0)));

        let error: ErrorInfo = serde_json::from_str(r#"{"message":"m"}"#).unwrap();
        assert!(error.expected.is_none());
    }

    #[test]
    fn unknown_tags_are_preserved() {
        let event = parse(r#"{"type":"test:summary","data":{"success":true}}"#);
        assert_eq!(event.kind(), "test:summary");
        assert!(matches!(event, Event::Unknown { .. }));
    }

    #[test]
    fn bookkeeping_events_tolerate_missing_data() {
        assert!(matches!(
            parse(r#"{"type":"test:watch:drained"}"#),
            Event::WatchDrained
        ));
        assert!(matches!(
            parse(r#"{"type":"test:coverage","data":{"summary":{}}}"#),
            Event::Coverage
        ));
        assert!(matches!(
            parse(r#"{"type":"test:dequeue","data":{"name":"a","nesting":0}}"#),
            Event::Dequeue(_)
        ));
    }

    #[test]
    fn malformed_known_payload_is_an_error() {
        let result: Result<Event, _> =
            serde_json::from_str(r#"{"type":"test:start","data":{"nesting":0}}"#);
        assert!(result.is_err());
    }
}
