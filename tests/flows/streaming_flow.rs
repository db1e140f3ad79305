//! End-to-end streaming flows over a real TCP socket.

#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{event_names, last_payload, parse_sse, payload, write_corpus};
use common::test_server::TestServer;

async fn fetch(server: &TestServer, path_and_query: &str) -> (u16, String) {
    let response = reqwest::get(server.url(path_and_query))
        .await
        .expect("request succeeds");
    let status = response.status().as_u16();
    let body = response.text().await.expect("body reads to end");
    (status, body)
}

#[tokio::test]
async fn simple_search_full_event_order() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let server = TestServer::start(vec![dir.path().to_path_buf()])
        .await
        .unwrap();

    let (status, body) = fetch(&server, "/search/stream?q=compute&display=10&cm=true").await;
    assert_eq!(status, 200);

    let events = parse_sse(&body);
    let names = event_names(&events);
    assert_eq!(names.first(), Some(&"filters"));
    assert!(names.contains(&"matches"));
    assert_eq!(names.last(), Some(&"done"));
    assert!(!names.contains(&"error"));

    // the second-to-last event is the terminal progress
    assert_eq!(names[names.len() - 2], "progress");
    let progress = last_payload(&events, "progress").unwrap();
    assert_eq!(progress["done"], true);
    assert_eq!(progress["matchCount"], 3);
    assert_eq!(progress["repositoriesCount"], 2);

    let records = payload(&events, "matches", 0).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r["type"] == "content"));
    assert!(records.iter().all(|r| r["repository"] == "widgets"));
    assert!(records.iter().all(|r| r["chunkMatches"].is_array()));

    let filters = payload(&events, "filters", 0).unwrap();
    assert!(filters
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["kind"] == "lang" && f["label"] == "Rust"));
}

#[tokio::test]
async fn display_truncation_keeps_full_progress_counts() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let server = TestServer::start(vec![dir.path().to_path_buf()])
        .await
        .unwrap();

    let (status, body) = fetch(&server, "/search/stream?q=compute&display=2").await;
    assert_eq!(status, 200);

    let events = parse_sse(&body);
    let mut delivered = 0;
    let mut i = 0;
    while let Some(records) = payload(&events, "matches", i) {
        delivered += records.as_array().unwrap().len();
        i += 1;
    }
    assert_eq!(delivered, 2);

    let progress = last_payload(&events, "progress").unwrap();
    assert_eq!(progress["matchCount"], 3);
    assert!(progress["skipped"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["reason"] == "display-limit"));
    assert_eq!(event_names(&events).last(), Some(&"done"));
}

#[tokio::test]
async fn planner_alert_flow_ends_with_done() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let server = TestServer::start(vec![dir.path().to_path_buf()])
        .await
        .unwrap();

    let (status, body) = fetch(&server, "/search/stream?q=count:banana%20foo").await;
    assert_eq!(status, 200);

    let events = parse_sse(&body);
    let names = event_names(&events);
    assert!(names.contains(&"alert"));
    assert!(!names.contains(&"matches"));
    assert!(!names.contains(&"error"));
    assert_eq!(names.last(), Some(&"done"));

    let alert = payload(&events, "alert", 0).unwrap();
    assert!(alert["description"].as_str().unwrap().contains("count"));
    let progress = last_payload(&events, "progress").unwrap();
    assert_eq!(progress["matchCount"], 0);
}

#[tokio::test]
async fn bad_request_does_not_stream() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let server = TestServer::start(vec![dir.path().to_path_buf()])
        .await
        .unwrap();

    let (status, body) = fetch(&server, "/search/stream?q=foo&display=NaN").await;
    assert_eq!(status, 400);
    assert!(body.contains("display"));
}

#[tokio::test]
async fn repo_scoped_search_only_touches_one_repo() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let server = TestServer::start(vec![dir.path().to_path_buf()])
        .await
        .unwrap();

    let (_, body) = fetch(&server, "/search/stream?q=repo:gadgets%20nothing").await;
    let events = parse_sse(&body);
    let progress = last_payload(&events, "progress").unwrap();
    assert_eq!(progress["repositoriesCount"], 1);
    let records = payload(&events, "matches", 0).unwrap();
    assert!(records
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["repository"] == "gadgets"));
}
