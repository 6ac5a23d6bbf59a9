//! End-to-end tests: the generator against a live server on localhost

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use stressor::generator::{
    Generator, LoadClient, Payload, PlannedRequest, Scenario, ScenarioPicker,
};

mod common;
use common::*;

fn planned(
    scenario: Scenario,
    route: &'static str,
    query: Vec<(&'static str, u64)>,
    payload: Payload,
) -> PlannedRequest {
    PlannedRequest {
        scenario,
        route,
        query,
        payload,
        description: String::new(),
    }
}

async fn client() -> LoadClient {
    let addr = spawn_test_server().await;
    LoadClient::new(&format!("http://{addr}"), Some(Duration::from_secs(30))).unwrap()
}

#[tokio::test]
async fn test_status_request_is_not_an_error() {
    let client = client().await;

    let outcome = client
        .execute(&planned(
            Scenario::Status,
            "/status",
            vec![("status", 503)],
            Payload::None,
        ))
        .await
        .unwrap();

    assert_eq!(outcome.status, 503);
    assert_eq!(
        outcome.body_bytes,
        "response sent with status 503".len() as u64
    );
}

#[tokio::test]
async fn test_upload_reaches_server() {
    let client = client().await;

    let outcome = client
        .execute(&planned(
            Scenario::Receive,
            "/send",
            Vec::new(),
            Payload::Upload { mb: 1 },
        ))
        .await
        .unwrap();

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body_bytes, "received 1MB of data".len() as u64);
}

#[tokio::test]
async fn test_download_is_drained() {
    let client = client().await;

    let outcome = client
        .execute(&planned(
            Scenario::Generate,
            "/generate",
            vec![("mb", 3)],
            Payload::Download,
        ))
        .await
        .unwrap();

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body_bytes, 3 * MIB as u64);
}

#[tokio::test]
async fn test_bounded_run_completes_every_request() {
    let client = client().await;
    let picker = ScenarioPicker::weighted(&[(Scenario::Status, 3), (Scenario::Wait, 1)]).unwrap();

    let summary = Generator::new(client, picker, StdRng::seed_from_u64(2024))
        .with_interval(Duration::from_millis(20))
        .with_max_iterations(6)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.issued, 6);
    assert_eq!(summary.completed, 6);
}
