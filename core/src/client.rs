//! Stateless request builder and response parser for the Freedcamp API.
//!
//! # Design
//! `FreedcampClient` holds the base URL, credentials and project settings and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces a signed `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. Signing takes the timestamp as an
//! argument so requests are fully deterministic under test; `Session` supplies
//! a fresh clock reading for every call.

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result, UNKNOWN_ERROR};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::signing::{sign, Credentials};
use crate::types::{
    CommentPayload, Envelope, ErrorBody, PageCursor, SessionData, TaskPage, TaskRecord,
    TaskUpdate, TasksData,
};

pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Server-side filters sent with every listing request.
const LIST_FILTERS: [(&str, &str); 5] = [
    ("filter[assigned_to_id][]", "0"),
    ("filter[status][]", "0"),
    ("order[order]", "asc"),
    ("substring", ""),
    ("f_url_filters", "true"),
];

/// Synchronous, stateless request builder and response parser for the
/// Freedcamp API.
///
/// Builds signed `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller (usually `Session`) executes the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct FreedcampClient {
    base_url: String,
    credentials: Credentials,
    project_id: u64,
    page_size: u32,
}

impl FreedcampClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
            project_id: config.project_id,
            page_size: config.page_size,
        }
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn build_current_session(&self, timestamp: i64) -> Result<HttpRequest> {
        self.signed(HttpMethod::Get, "/sessions/current", Vec::new(), None, timestamp)
    }

    /// Extract the authenticated user's id.
    pub fn parse_current_session(&self, response: HttpResponse) -> Result<u64> {
        if response.status != 200 {
            return Err(ApiError::Authentication {
                status: response.status,
                message: server_message(&response),
            });
        }
        let envelope: Envelope<SessionData> = decode(&response)?;
        Ok(envelope.data.user_id)
    }

    pub fn build_list_tasks(&self, cursor: PageCursor, timestamp: i64) -> Result<HttpRequest> {
        let mut query = vec![
            ("project_id".to_string(), self.project_id.to_string()),
            ("f_cf".to_string(), "1".to_string()),
            ("limit".to_string(), self.page_size.to_string()),
            ("offset".to_string(), cursor.offset().to_string()),
        ];
        query.extend(
            LIST_FILTERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        self.signed(HttpMethod::Get, "/tasks", query, None, timestamp)
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<TaskPage> {
        check_status(&response)?;
        let envelope: Envelope<TasksData> = decode(&response)?;
        Ok(TaskPage {
            tasks: envelope.data.tasks,
            has_more: envelope.meta.unwrap_or_default().has_more,
        })
    }

    pub fn build_update_task(
        &self,
        task_id: u64,
        update: &TaskUpdate,
        timestamp: i64,
    ) -> Result<HttpRequest> {
        let body = encode(update)?;
        self.signed(
            HttpMethod::Post,
            &format!("/tasks/{task_id}"),
            Vec::new(),
            Some(body),
            timestamp,
        )
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    pub fn build_comment_task(
        &self,
        task_id: u64,
        comment: &str,
        timestamp: i64,
    ) -> Result<HttpRequest> {
        let body = encode(&CommentPayload::for_task(task_id, comment))?;
        self.signed(HttpMethod::Post, "/comments", Vec::new(), Some(body), timestamp)
    }

    pub fn parse_comment_task(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    /// Assemble a request with the auth query parameters and header appended.
    fn signed(
        &self,
        method: HttpMethod,
        endpoint: &str,
        mut query: Vec<(String, String)>,
        body: Option<String>,
        timestamp: i64,
    ) -> Result<HttpRequest> {
        let signature = sign(&self.credentials, timestamp)?;
        let api_key = self.credentials.api_key().to_string();
        query.push(("api_key".to_string(), api_key.clone()));
        query.push(("timestamp".to_string(), signature.timestamp));
        query.push(("hash".to_string(), signature.hash));

        let mut headers = vec![(API_KEY_HEADER.to_string(), api_key)];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method,
            path: format!("{}{endpoint}", self.base_url),
            query,
            headers,
            body,
        })
    }
}

/// First task in server order whose list name equals `list_name`.
pub fn find_in_page(tasks: Vec<TaskRecord>, list_name: &str) -> Option<TaskRecord> {
    tasks.into_iter().find(|task| task.in_list(list_name))
}

fn check_status(response: &HttpResponse) -> Result<()> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::RemoteOperation {
        status: response.status,
        message: server_message(response),
    })
}

/// The `msg` field of an error body, if the body is JSON and has one.
fn server_message(response: &HttpResponse) -> String {
    serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.msg)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}
