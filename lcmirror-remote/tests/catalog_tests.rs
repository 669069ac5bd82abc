mod common;

use common::*;
use lcmirror_core::{metadata, paths, ProblemCatalog, ProblemMeta};
use lcmirror_remote::{load_catalog, ApiRequest, FetchError};
use serde_json::json;
use tempfile::TempDir;

fn page(questions: serde_json::Value, has_more: bool) -> Step {
    ok_json(json!({
        "data": {
            "problemsetQuestionListV2": { "questions": questions, "hasMore": has_more }
        }
    }))
}

#[test]
fn fetches_all_pages_and_caches() {
    let home = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![
        page(
            json!([{
                "questionFrontendId": "1",
                "titleSlug": "two-sum",
                "title": "Two Sum",
                "difficulty": "EASY",
                "topicTags": [{ "name": "Array" }, { "name": "Hash Table" }]
            }]),
            true,
        ),
        page(
            json!([{
                "questionFrontendId": "2",
                "titleSlug": "add-two-numbers",
                "difficulty": "MEDIUM",
            }]),
            false,
        ),
    ]);
    let client = client(&transport, 1, 20);

    let catalog = load_catalog(&client, &session("t"), home.path(), false).unwrap();
    assert_eq!(catalog.len(), 2);
    let two_sum = catalog.get("two-sum").unwrap();
    assert_eq!(two_sum.frontend_id, "1");
    assert_eq!(two_sum.difficulty.as_deref(), Some("Easy"));
    assert_eq!(two_sum.tags, vec!["Array", "Hash Table"]);

    let cached = metadata::load_at(home.path()).unwrap().unwrap();
    assert_eq!(cached.problems, catalog.problems);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    match &requests[1] {
        ApiRequest::PostJson { body, .. } => assert_eq!(body["variables"]["skip"], 1),
        other => panic!("expected POST, got {other:?}"),
    }
}

#[test]
fn cached_catalog_is_used_without_network() {
    let home = TempDir::new().unwrap();
    let cached = ProblemCatalog::new([ProblemMeta {
        frontend_id: "1".to_string(),
        title_slug: "two-sum".to_string(),
        title: None,
        difficulty: None,
        tags: vec![],
    }]);
    metadata::save_at(home.path(), &cached).unwrap();
    let transport = ScriptedTransport::new(vec![]);
    let client = client(&transport, 1, 20);

    let catalog = load_catalog(&client, &session("t"), home.path(), false).unwrap();
    assert_eq!(catalog.len(), 1);
    assert!(transport.requests().is_empty());
}

#[test]
fn force_refresh_replaces_the_cache() {
    let home = TempDir::new().unwrap();
    metadata::save_at(home.path(), &ProblemCatalog::empty()).unwrap();
    let transport = ScriptedTransport::new(vec![page(
        json!([{ "questionFrontendId": "7", "titleSlug": "reverse-integer" }]),
        false,
    )]);
    let client = client(&transport, 1, 20);

    let catalog = load_catalog(&client, &session("t"), home.path(), true).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(metadata::load_at(home.path()).unwrap().unwrap().len(), 1);
}

#[test]
fn graphql_errors_surface_and_leave_cache_alone() {
    let home = TempDir::new().unwrap();
    let transport = ScriptedTransport::new(vec![ok_json(json!({
        "data": null,
        "errors": [{ "message": "rate limited" }]
    }))]);
    let client = client(&transport, 1, 20);

    let err = load_catalog(&client, &session("t"), home.path(), false).unwrap_err();
    assert!(matches!(err, FetchError::GraphQl { ref message, .. } if message == "rate limited"));
    assert!(!paths::metadata_path(home.path()).exists());
}
