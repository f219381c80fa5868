//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use todo_core::{ApiError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, Todo, TodoClient, UpdateTodo};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080";

fn client() -> TodoClient {
    TodoClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn cases(raw: &str) -> Vec<serde_json::Value> {
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Check method, URL and (when the vector has one) JSON body.
fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    if let Some(headers) = expected.get("headers") {
        let expected_headers: Vec<(String, String)> = headers
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }

    match expected.get("body") {
        Some(body) => {
            let req_body: serde_json::Value =
                serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn assert_expected_error(name: &str, err: ApiError, expected: &str) {
    match (expected.split_once(':'), err) {
        (None, ApiError::NotFound) if expected == "NotFound" => {}
        (Some(("Http", message)), ApiError::Http { message: actual, .. }) => {
            assert_eq!(actual, message, "{name}: error message");
        }
        (_, other) => panic!("{name}: expected {expected}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input: CreateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_todo(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let todo = c.parse_create_todo(simulated(&case)).unwrap();
        let expected: Todo = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(todo, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();

        let req = c.build_list_todos();
        assert_request(name, &req, &case["expected_request"]);

        let todos = c.parse_list_todos(simulated(&case)).unwrap();
        let expected: Vec<Todo> = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(todos, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id: Uuid = case["input_id"].as_str().unwrap().parse().unwrap();
        let input: UpdateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_todo(id, &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_update_todo(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_expected_error(name, result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let expected: Todo = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id: Uuid = case["input_id"].as_str().unwrap().parse().unwrap();

        let req = c.build_delete_todo(id);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_todo(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_expected_error(name, result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let deleted = result.unwrap();
            assert_eq!(deleted.message, case["expected_message"].as_str().unwrap(), "{name}: message");
            assert_eq!(deleted.todo.id, id, "{name}: deleted id");
        }
    }
}
