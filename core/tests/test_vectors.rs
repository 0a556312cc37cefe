//! Verify request building and response parsing against JSON vectors stored
//! in `test-vectors/`.
//!
//! Request cases name an operation, its inputs and timestamp, and the exact
//! request expected: method, path, ordered query pairs, rendered URL, headers
//! and body. Bodies are compared as parsed JSON so field order does not matter.
//!
//! Response cases pair a raw status and body with what the matching `parse_*`
//! call must return, or the error kind, status and message it must fail with.

use freedcamp_core::{
    ApiError, ClientConfig, FreedcampClient, HttpMethod, HttpRequest, HttpResponse, PageCursor,
    Result, TaskUpdate,
};
use serde_json::{json, Value};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (
                pair[0].as_str().unwrap().to_string(),
                pair[1].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

fn build(client: &FreedcampClient, case: &Value) -> HttpRequest {
    let timestamp = case["timestamp"].as_i64().unwrap();
    match case["operation"].as_str().unwrap() {
        "current_session" => client.build_current_session(timestamp).unwrap(),
        "list_tasks" => {
            let offset = case["offset"].as_u64().unwrap() as u32;
            client
                .build_list_tasks(PageCursor::at(offset), timestamp)
                .unwrap()
        }
        "update_task" => {
            let update: TaskUpdate = serde_json::from_value(case["input"].clone()).unwrap();
            client
                .build_update_task(case["task_id"].as_u64().unwrap(), &update, timestamp)
                .unwrap()
        }
        "comment_task" => client
            .build_comment_task(
                case["task_id"].as_u64().unwrap(),
                case["input"].as_str().unwrap(),
                timestamp,
            )
            .unwrap(),
        other => panic!("unknown operation: {other}"),
    }
}

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let base_url = vectors["base_url"].as_str().unwrap();
    let config = ClientConfig::new(
        vectors["api_key"].as_str().unwrap(),
        vectors["api_secret"].as_str().unwrap(),
    )
    .with_base_url(base_url);
    let client = FreedcampClient::new(&config);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];
        let req = build(&client, case);

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, format!("{base_url}{}", expected["path"].as_str().unwrap()), "{name}: path");
        assert_eq!(req.query, pairs(&expected["query"]), "{name}: query");
        assert_eq!(req.url(), expected["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: body should be None"),
        }
    }
}

/// Parse `response` with the operation's parser and render the outcome in
/// the shape the vectors use.
fn parse(client: &FreedcampClient, operation: &str, response: HttpResponse) -> Result<Value> {
    match operation {
        "current_session" => client
            .parse_current_session(response)
            .map(|user_id| json!({ "user_id": user_id })),
        "list_tasks" => client.parse_list_tasks(response).map(|page| {
            let tasks: Vec<Value> = page
                .tasks
                .iter()
                .map(|t| json!({ "id": t.id, "list_name": t.list_name, "status": t.status }))
                .collect();
            json!({ "tasks": tasks, "has_more": page.has_more })
        }),
        "update_task" => client.parse_update_task(response).map(|()| json!({})),
        "comment_task" => client.parse_comment_task(response).map(|()| json!({})),
        other => panic!("unknown operation: {other}"),
    }
}

fn describe(err: &ApiError) -> Value {
    match err {
        ApiError::Authentication { status, message } => {
            json!({ "kind": "authentication", "status": status, "message": message })
        }
        ApiError::RemoteOperation { status, message } => {
            json!({ "kind": "remote_operation", "status": status, "message": message })
        }
        ApiError::Deserialization(_) => json!({ "kind": "deserialization" }),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let client = FreedcampClient::new(&ClientConfig::new("vector-key", "vector-secret"));

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = HttpResponse::new(
            case["response"]["status"].as_u64().unwrap() as u16,
            case["response"]["body"].as_str().unwrap(),
        );
        let expected = &case["expected"];

        match parse(&client, case["operation"].as_str().unwrap(), response) {
            Ok(actual) => {
                assert!(expected.get("error").is_none(), "{name}: expected an error, got {actual}");
                assert_eq!(&actual, expected, "{name}");
            }
            Err(err) => assert_eq!(&describe(&err), &expected["error"], "{name}: {err}"),
        }
    }
}
