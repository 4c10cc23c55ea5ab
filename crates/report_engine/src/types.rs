use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub type TaskId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File(path.into()),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.value, FormValue::File(_))
    }
}

/// Result of `POST /process` after applying truthiness to `error`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitOutcome {
    pub error: Option<String>,
    pub task_id: Option<TaskId>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubmitBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    task_id: Option<Value>,
}

impl From<SubmitBody> for SubmitOutcome {
    fn from(body: SubmitBody) -> Self {
        let error = body
            .error
            .filter(is_truthy)
            .map(|value| value_to_string(&value));
        let task_id = match body.task_id {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        Self { error, task_id }
    }
}

/// JavaScript truthiness for a decoded JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Error,
    /// Any status string the client does not know; treated as still running.
    Other,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

/// Body of `GET /progress/{task_id}`. Decoding is lenient: wrong types fall back to defaults.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default, deserialize_with = "lenient_number")]
    pub percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub result_file: Option<String>,
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Some(value.to_string()),
        _ => None,
    })
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TaskStatus, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(status)) => match status.as_str() {
            "pending" => TaskStatus::Pending,
            "completed" => TaskStatus::Completed,
            "error" => TaskStatus::Error,
            _ => TaskStatus::Other,
        },
        _ => TaskStatus::Pending,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The poller saw `completed` or `error`.
    Terminal,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted(Result<SubmitOutcome, ClientError>),
    Polled {
        task_id: TaskId,
        result: Result<ProgressSnapshot, ClientError>,
    },
    PollingStopped {
        task_id: TaskId,
        reason: StopReason,
    },
    Downloaded {
        result_file: String,
        result: Result<PathBuf, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "invalid response body"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn outcome(body: Value) -> SubmitOutcome {
        serde_json::from_value::<SubmitBody>(body).unwrap().into()
    }

    #[test]
    fn falsy_errors_are_dropped() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            let result = outcome(json!({ "error": falsy, "task_id": "t1" }));
            assert_eq!(result.error, None);
            assert_eq!(result.task_id.as_deref(), Some("t1"));
        }
    }

    #[test]
    fn truthy_errors_are_kept_as_text() {
        assert_eq!(
            outcome(json!({ "error": "No file" })).error.as_deref(),
            Some("No file")
        );
        assert_eq!(outcome(json!({ "error": true })).error.as_deref(), Some("true"));
        assert_eq!(outcome(json!({ "error": 3 })).error.as_deref(), Some("3"));
        assert!(outcome(json!({ "error": {} })).error.is_some());
    }

    #[test]
    fn numeric_task_id_is_stringified() {
        assert_eq!(outcome(json!({ "task_id": 42 })).task_id.as_deref(), Some("42"));
    }

    #[test]
    fn snapshot_defaults_when_fields_missing() {
        let snapshot: ProgressSnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot, ProgressSnapshot::default());
        assert_eq!(snapshot.status, TaskStatus::Pending);
    }

    #[test]
    fn snapshot_decoding_is_lenient() {
        let snapshot: ProgressSnapshot = serde_json::from_value(json!({
            "percent": "45",
            "message": null,
            "status": "queued",
            "result_file": "report.pdf",
        }))
        .unwrap();
        assert_eq!(snapshot.percent, Some(45.0));
        assert_eq!(snapshot.message, None);
        assert_eq!(snapshot.status, TaskStatus::Other);
        assert!(!snapshot.status.is_terminal());
        assert_eq!(snapshot.result_file.as_deref(), Some("report.pdf"));
    }
}
