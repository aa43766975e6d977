//! Wire-format tests for the JSON messages exchanged with the reasoner.

use super::types::*;
use super::*;

#[test]
fn query_request_serializes_mode_as_code() {
    let req = QueryRequest {
        id: "RUST_QUERY_1",
        query: "true",
        mode: QueryMode::Incremental.code(),
    };
    let v = serde_json::to_value(&req).unwrap();
    assert_eq!(
        v,
        serde_json::json!({ "id": "RUST_QUERY_1", "query": "true", "mode": 1 })
    );
    assert_eq!(QueryMode::All.code(), 0);
}

#[test]
fn query_response_message_is_optional() {
    let resp: QueryResponse = serde_json::from_str(r#"{"ok": true}"#).unwrap();
    assert!(resp.ok);
    assert!(resp.message.is_empty());
}

#[test]
fn next_solution_decodes_nested_bindings() {
    let resp: NextSolutionResponse = serde_json::from_str(
        r#"{"status": 3, "solution": "{\"Pose\": [\"map\", [1, 2, 3], [0, 0, 0, 1]], \"T\": 1.5}"}"#,
    )
    .unwrap();
    assert_eq!(SolutionStatus::from_code(resp.status), Some(SolutionStatus::Ok));
    let b = resp.bindings().unwrap();
    assert_eq!(b.len(), 2);
    assert_eq!(b.get_f64("T"), Some(1.5));
    assert!(b.get("Pose").unwrap().is_array());
}

#[test]
fn next_solution_empty_text_is_empty_bindings() {
    let resp: NextSolutionResponse = serde_json::from_str(r#"{"status": 3}"#).unwrap();
    assert!(resp.bindings().unwrap().is_empty());
}

#[test]
fn next_solution_garbage_is_parse_error() {
    let resp: NextSolutionResponse =
        serde_json::from_str(r#"{"status": 3, "solution": "not json"}"#).unwrap();
    let err = resp.bindings().unwrap_err();
    assert!(matches!(err, PrologError::Parse { ref solution, .. } if solution == "not json"));
}

#[test]
fn unknown_status_codes_are_rejected() {
    assert_eq!(SolutionStatus::from_code(0), Some(SolutionStatus::NoSolution));
    assert_eq!(SolutionStatus::from_code(1), Some(SolutionStatus::WrongId));
    assert_eq!(SolutionStatus::from_code(2), Some(SolutionStatus::QueryFailed));
    assert_eq!(SolutionStatus::from_code(7), None);
}

#[test]
fn arc_reasoner_delegates() {
    let mock = std::sync::Arc::new(
        MockReasoner::new().on("x", vec![Bindings::new().with("V", "v")]),
    );
    let shared: std::sync::Arc<dyn Reasoner> = mock.clone();
    assert_eq!(shared.ensure_once("x").unwrap().get_str("V"), Some("v"));
    assert_eq!(mock.queries().len(), 1);
}
