//! Wire types for the Freedcamp task API.
//!
//! # Design
//! Freedcamp is loose about numbers: ids and status codes arrive as JSON
//! numbers in some responses and as numeric strings in others. The `lenient`
//! helpers accept both. `TaskRecord` names the handful of fields this crate
//! acts on and keeps everything else in `extra` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status codes as the task service defines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TaskStatus {
    NotStarted = 0,
    Completed = 1,
    InProgress = 2,
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TaskStatus::NotStarted),
            1 => Ok(TaskStatus::Completed),
            2 => Ok(TaskStatus::InProgress),
            other => Err(format!("unknown task status code {other}")),
        }
    }
}

/// Task priority. There is no "failed" status upstream, so `High` doubles as
/// the failure marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Unset = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Priority::Unset),
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(format!("unknown priority code {other}")),
        }
    }
}

/// One task as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(deserialize_with = "lenient::u64")]
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "task_tasks_list_name", default)]
    pub list_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub assigned_to_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub status: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub priority: Option<u64>,
    /// Every other field the service returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskRecord {
    pub fn in_list(&self, list_name: &str) -> bool {
        self.list_name.as_deref() == Some(list_name)
    }
}

/// One page of the task listing.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<TaskRecord>,
    pub has_more: bool,
}

/// Partial update for `POST /tasks/{id}`. Only the fields present are sent;
/// omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// App id the service assigns to the tasks module.
pub const TASKS_APP_ID: &str = "2";

/// Body for `POST /comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub item_id: u64,
    pub app_id: String,
    pub description: String,
}

impl CommentPayload {
    pub fn for_task(task_id: u64, description: impl Into<String>) -> Self {
        Self {
            item_id: task_id,
            app_id: TASKS_APP_ID.to_string(),
            description: description.into(),
        }
    }
}

/// Position of a listing scan, as an item offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageCursor {
    offset: u32,
}

impl PageCursor {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn at(offset: u32) -> Self {
        Self { offset }
    }

    pub fn offset(self) -> u32 {
        self.offset
    }

    /// The cursor one page further on.
    pub fn advance(self, page_size: u32) -> Self {
        Self {
            offset: self.offset.saturating_add(page_size),
        }
    }
}

// Response envelopes. Only the parts this crate reads are modelled.

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Meta {
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionData {
    #[serde(deserialize_with = "lenient::u64")]
    pub user_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TasksData {
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
}

mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }

    pub fn opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => Ok(Some(n)),
            Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrString::String(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_record_accepts_string_numbers() {
        let record: TaskRecord = serde_json::from_str(
            r#"{"id":"17","task_tasks_list_name":"Inbox","assigned_to_id":"0","status":"2","priority":3}"#,
        )
        .unwrap();
        assert_eq!(record.id, 17);
        assert_eq!(record.list_name.as_deref(), Some("Inbox"));
        assert_eq!(record.assigned_to_id, Some(0));
        assert_eq!(record.status, Some(2));
        assert_eq!(record.priority, Some(3));
    }

    #[test]
    fn task_record_keeps_unknown_fields() {
        let record: TaskRecord =
            serde_json::from_str(r#"{"id":1,"title":"Ship","h_parent_id":"9","tags":[]}"#).unwrap();
        assert_eq!(record.title.as_deref(), Some("Ship"));
        assert_eq!(record.extra["h_parent_id"], "9");
        assert!(record.list_name.is_none());
        assert!(record.status.is_none());
    }

    #[test]
    fn task_record_rejects_missing_id() {
        let result: Result<TaskRecord, _> = serde_json::from_str(r#"{"title":"no id"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_string_number_is_absent() {
        let record: TaskRecord = serde_json::from_str(r#"{"id":5,"assigned_to_id":""}"#).unwrap();
        assert!(record.assigned_to_id.is_none());
    }

    #[test]
    fn task_update_serializes_only_present_fields() {
        let update = TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..TaskUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({"status": 1}));
    }

    #[test]
    fn status_and_priority_serialize_as_codes() {
        let update = TaskUpdate {
            assigned_to_id: Some(7),
            status: Some(TaskStatus::InProgress),
            priority: Some(Priority::High),
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"assigned_to_id": 7, "status": 2, "priority": 3})
        );
    }

    #[test]
    fn unknown_status_code_is_rejected() {
        assert!(TaskStatus::try_from(9).is_err());
        assert_eq!(Priority::try_from(3), Ok(Priority::High));
    }

    #[test]
    fn comment_payload_uses_tasks_app_id() {
        let payload = CommentPayload::for_task(12, "done");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"item_id": 12, "app_id": "2", "description": "done"})
        );
    }

    #[test]
    fn cursor_advances_by_page_size() {
        let cursor = PageCursor::start().advance(200).advance(200);
        assert_eq!(cursor.offset(), 400);
        assert!(PageCursor::start() < cursor);
    }
}
