//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use serde_json::Value;
use todo_client::{
    ApiError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, ListQuery, Todo, TodoClient,
    UpdateTodo,
};

const BASE_URL: &str = "http://localhost:3000/api/v1/todos";

fn client() -> TodoClient {
    TodoClient::new(BASE_URL)
}

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(
        req.path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );

    match expected.get("body") {
        Some(body) => {
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }

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
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn assert_expected_error(name: &str, case: &Value, err: ApiError) {
    match case["expected_error"].as_str().unwrap() {
        "NotFound" => assert!(matches!(err, ApiError::NotFound { .. }), "{name}: expected NotFound"),
        "Http" => assert!(matches!(err, ApiError::HttpError { .. }), "{name}: expected HttpError"),
        other => panic!("{name}: unknown expected_error: {other}"),
    }
    if let Some(message) = case.get("expected_message") {
        assert_eq!(err.extract_message(), message.as_str().unwrap(), "{name}: message");
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
        let q = &case["query"];
        let query = ListQuery {
            skip: q["skip"].as_u64().unwrap() as u32,
            limit: q["limit"].as_u64().unwrap() as u32,
            paginate: q["paginate"].as_bool().unwrap(),
        };

        let req = c.build_list_todos(&query);
        assert_request(name, &req, &case["expected_request"]);

        let list = c.parse_list_todos(simulated(&case)).unwrap();
        assert_eq!(
            list.is_paginated(),
            case["expected_paginated"].as_bool().unwrap(),
            "{name}: shape"
        );
        let expected: Vec<Todo> = serde_json::from_value(case["expected_items"].clone()).unwrap();
        assert_eq!(list.into_items(), expected, "{name}: items");
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[test]
fn get_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();

        let req = c.build_get_todo(id);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_get_todo(simulated(&case));
        if case.get("expected_error").is_some() {
            assert_expected_error(name, &case, result.unwrap_err());
        } else {
            let expected: Todo = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
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
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();
        let input: UpdateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_todo(id, &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let todo = c.parse_update_todo(simulated(&case)).unwrap();
        let expected: Todo = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(todo, expected, "{name}: parsed result");
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
        let id = case["input_id"].as_i64().unwrap();

        let req = c.build_delete_todo(id);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_todo(simulated(&case));
        if case.get("expected_error").is_some() {
            assert_expected_error(name, &case, result.unwrap_err());
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}
