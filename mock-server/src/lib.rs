//! In-process stand-in for the subset of the Freedcamp API the client uses.
//!
//! Every route checks the `api_key`/`timestamp`/`hash` query parameters and
//! the `X-API-KEY` header the same way the real service does, so a client
//! that signs incorrectly fails here too. All requests are recorded in the
//! shared state for assertions.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha1::Sha1;
use tokio::{net::TcpListener, sync::RwLock};

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub item_id: u64,
    pub app_id: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Debug)]
pub struct MockState {
    pub api_key: String,
    pub api_secret: String,
    pub user_id: u64,
    /// Task objects in listing order, stored as the service would return them.
    pub tasks: Vec<Map<String, Value>>,
    /// Task ids whose updates are rejected with 403.
    pub forbidden: HashSet<u64>,
    pub comments: Vec<Comment>,
    pub requests: Vec<RecordedRequest>,
}

impl MockState {
    pub fn new(api_key: &str, api_secret: &str, user_id: u64) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            user_id,
            tasks: Vec::new(),
            forbidden: HashSet::new(),
            comments: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Append a task with string-encoded numbers, as the service sends them.
    pub fn add_task(&mut self, id: u64, title: &str, list_name: &str) {
        let task = json!({
            "id": id.to_string(),
            "title": title,
            "task_tasks_list_name": list_name,
            "assigned_to_id": "0",
            "status": "0",
            "priority": "0",
        });
        if let Value::Object(map) = task {
            self.tasks.push(map);
        }
    }

    pub fn task(&self, id: u64) -> Option<&Map<String, Value>> {
        self.tasks.iter().find(|t| task_id(t) == Some(id))
    }

    fn task_mut(&mut self, id: u64) -> Option<&mut Map<String, Value>> {
        self.tasks.iter_mut().find(|t| task_id(t) == Some(id))
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests.iter().filter(|r| r.path == path).cloned().collect()
    }
}

fn task_id(task: &Map<String, Value>) -> Option<u64> {
    match task.get("id")? {
        Value::String(s) => s.parse().ok(),
        other => other.as_u64(),
    }
}

pub type Db = Arc<RwLock<MockState>>;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app(db: Db) -> Router {
    Router::new()
        .route("/sessions/current", get(current_session))
        .route("/tasks", get(list_tasks))
        .route("/tasks/{id}", post(update_task))
        .route("/comments", post(create_comment))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

fn reject(status: StatusCode, msg: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({"http_code": status.as_u16(), "msg": msg})))
}

pub fn expected_hash(api_key: &str, api_secret: &str, timestamp: &str) -> Option<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(api_secret.as_bytes()).ok()?;
    mac.update(format!("{api_key}{timestamp}").as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

fn authorize(
    state: &MockState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> Result<(), (StatusCode, Json<Value>)> {
    let header_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let query_key = query.get("api_key").map(String::as_str);
    if header_key != Some(state.api_key.as_str()) || query_key != Some(state.api_key.as_str()) {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid API key"));
    }
    let (Some(timestamp), Some(hash)) = (query.get("timestamp"), query.get("hash")) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "Missing signature"));
    };
    let expected = expected_hash(&state.api_key, &state.api_secret, timestamp);
    if expected.as_deref() != Some(hash.as_str()) {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid hash"));
    }
    Ok(())
}

async fn current_session(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let mut state = db.write().await;
    state.requests.push(RecordedRequest {
        method: "GET",
        path: "/sessions/current".to_string(),
        query: query.clone(),
        body: None,
    });
    authorize(&state, &headers, &query)?;
    Ok(Json(json!({
        "http_code": 200,
        "msg": "OK",
        "data": {"user_id": state.user_id.to_string()}
    })))
}

async fn list_tasks(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let mut state = db.write().await;
    state.requests.push(RecordedRequest {
        method: "GET",
        path: "/tasks".to_string(),
        query: query.clone(),
        body: None,
    });
    authorize(&state, &headers, &query)?;

    let number = |key: &str, default: usize| {
        query
            .get(key)
            .map(|v| v.parse::<usize>())
            .unwrap_or(Ok(default))
            .map_err(|_| reject(StatusCode::BAD_REQUEST, &format!("Invalid {key}")))
    };
    let offset = number("offset", 0)?;
    let limit = number("limit", 20)?;

    let page: Vec<Value> = state
        .tasks
        .iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .map(Value::Object)
        .collect();
    let has_more = offset.saturating_add(limit) < state.tasks.len();
    tracing::debug!(offset, limit, returned = page.len(), has_more, "served task page");

    Ok(Json(json!({
        "http_code": 200,
        "msg": "OK",
        "data": {"tasks": page},
        "meta": {"has_more": has_more}
    })))
}

async fn update_task(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(update): Json<Map<String, Value>>,
) -> ApiResult {
    let mut state = db.write().await;
    state.requests.push(RecordedRequest {
        method: "POST",
        path: format!("/tasks/{id}"),
        query: query.clone(),
        body: Some(Value::Object(update.clone())),
    });
    authorize(&state, &headers, &query)?;

    if state.forbidden.contains(&id) {
        return Err(reject(StatusCode::FORBIDDEN, "forbidden"));
    }
    let task = state
        .task_mut(id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Task not found"))?;
    for (field, value) in update {
        task.insert(field, value);
    }
    let task = Value::Object(task.clone());
    Ok(Json(json!({"http_code": 200, "msg": "OK", "data": {"tasks": [task]}})))
}

async fn create_comment(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(comment): Json<Comment>,
) -> ApiResult {
    let mut state = db.write().await;
    state.requests.push(RecordedRequest {
        method: "POST",
        path: "/comments".to_string(),
        query: query.clone(),
        body: serde_json::to_value(&comment).ok(),
    });
    authorize(&state, &headers, &query)?;

    if state.task(comment.item_id).is_none() {
        return Err(reject(StatusCode::NOT_FOUND, "Item not found"));
    }
    state.comments.push(comment.clone());
    Ok(Json(json!({"http_code": 200, "msg": "OK", "data": {"comments": [comment]}})))
}
