//! In-memory transport and clock for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::signing::Clock;
use crate::transport::Transport;

/// Replays canned responses in order and records every request.
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn list_requests(&self) -> Vec<HttpRequest> {
        self.requests_to("/tasks")
    }

    pub fn requests_to(&self, suffix: &str) -> Vec<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.path.ends_with(suffix))
            .cloned()
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ApiError::Transport("no scripted response left".to_string()))
    }
}

/// Clock that ticks one second per reading.
pub struct StepClock {
    next: Cell<i64>,
}

impl StepClock {
    pub fn new(start: i64) -> Self {
        Self {
            next: Cell::new(start),
        }
    }
}

impl Clock for StepClock {
    fn unix_timestamp(&self) -> i64 {
        let now = self.next.get();
        self.next.set(now + 1);
        now
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new("test-key", "test-secret")
        .with_base_url("http://freedcamp.test/api/v1")
        .with_project_id(3)
}

pub fn session_ok(user_id: u64) -> HttpResponse {
    HttpResponse::new(200, json!({"data": {"user_id": user_id.to_string()}}).to_string())
}

pub fn ok() -> HttpResponse {
    HttpResponse::new(200, json!({"http_code": 200, "msg": "OK", "data": {}}).to_string())
}

pub fn page(tasks: Vec<Value>, has_more: bool) -> HttpResponse {
    HttpResponse::new(
        200,
        json!({"data": {"tasks": tasks}, "meta": {"has_more": has_more}}).to_string(),
    )
}

pub fn tasks_in(count: usize, list_name: &str) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"id": i.to_string(), "task_tasks_list_name": list_name, "status": 0}))
        .collect()
}
