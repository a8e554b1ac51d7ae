//! End-to-end integration tests for the nightly status checker
//!
//! These tests run the full pipeline against a local HTTP stub of the
//! nightly build system: index discovery, backward date resolution,
//! summary decoding and report generation, all through the real client.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use nightly_checker::{Config, StatusChecker};
use nightly_client::{ClientOptions, NightlyClient};
use nightly_report::{DayOutcome, HtmlGenerator, TextGenerator};

const PLATFORM: &str = "x86_64_v2-el9-gcc12-opt";

/// Canned build data served by the stub.
#[derive(Default)]
struct StubData {
    index: String,
    summaries: HashMap<(String, u64), Value>,
    /// (slot, id) pairs the stub answers with a 500.
    broken: Vec<(String, u64)>,
}

async fn serve_index(State(data): State<Arc<StubData>>) -> String {
    data.index.clone()
}

async fn serve_summary(
    State(data): State<Arc<StubData>>,
    Path((slot, build_id)): Path<(String, u64)>,
) -> impl IntoResponse {
    if data.broken.contains(&(slot.clone(), build_id)) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match data.summaries.get(&(slot, build_id)) {
        Some(summary) => Json(summary.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Starts the stub server and returns a checker pointed at it.
async fn start_checker(data: StubData, slots: &[&str]) -> StatusChecker<NightlyClient> {
    let router = Router::new()
        .route("/nightly/", get(serve_index))
        .route("/api/v1/nightly/:slot/:build_id/summary", get(serve_summary))
        .with_state(Arc::new(data));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr: SocketAddr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let config = Config {
        slots: slots.iter().map(ToString::to_string).collect(),
        platforms: vec![PLATFORM.to_string()],
        projects: vec!["Gauss".to_string(), "LHCb".to_string()],
        main_page: format!("http://{addr}/nightly/"),
        api_page: format!("http://{addr}/api/v1/nightly"),
    };
    let client =
        NightlyClient::new(ClientOptions::from_config(&config)).expect("Failed to build client");
    StatusChecker::new(client, config)
}

fn completed(date: &str, errors: u64, failed: u64) -> Value {
    json!({
        "aborted": false,
        "date": date,
        "platforms": [PLATFORM],
        "projects": [
            {"name": "Gauss", "enabled": true, "results": {
                PLATFORM: {
                    "build": {"warnings": 1, "errors": errors},
                    "tests": {"PASS": 50, "FAIL": failed}
                }
            }, "checkout": {"warnings": ["could not apply Gauss!321"]}},
            {"name": "Moore", "enabled": true, "results": {}}
        ]
    })
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Full pipeline: discovery over HTTP, resolution walking back one id,
/// text rendering with the resolved build.
#[tokio::test]
async fn test_end_to_end_current_status() {
    let mut data = StubData {
        index: "lhcb-sim11/482/\nlhcb-sim11/481/\n".to_string(),
        ..StubData::default()
    };
    data.summaries.insert(
        ("lhcb-sim11".to_string(), 482),
        completed("2024-03-15", 0, 0),
    );
    data.summaries.insert(
        ("lhcb-sim11".to_string(), 481),
        completed("2024-03-14", 2, 3),
    );
    let checker = start_checker(data, &["lhcb-sim11"]).await;

    let report = checker
        .check_status(&[day(2024, 3, 14)])
        .await
        .expect("check_status failed");

    let DayOutcome::Build(table) = &report.slots[0].days[0].outcome else {
        panic!("expected a resolved build");
    };
    assert_eq!(table.build_id, 481);

    let text = TextGenerator::new(&report).generate();
    assert!(text.contains("-> lhcb-sim11/2024-03-14/481:"));
    assert!(text.contains("W:1 E:2 / P:50 F:3"));
    assert!(text.contains("!321"));

    let totals: Vec<_> = report.totals.iter().collect();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].0, "Gauss");
    assert_eq!(totals[0].1.build_errors, 2);
    assert_eq!(totals[0].1.test_failures, 3);
}

/// A 500 from the summary endpoint degrades that day to unavailable
/// without failing the run or the other slot.
#[tokio::test]
async fn test_server_error_degrades_single_day() {
    let mut data = StubData {
        index: "good/10/\nbad/20/\n".to_string(),
        ..StubData::default()
    };
    data.summaries
        .insert(("good".to_string(), 10), completed("2024-03-14", 0, 0));
    data.broken.push(("bad".to_string(), 20));
    let checker = start_checker(data, &["good", "bad"]).await;

    let report = checker
        .check_status(&[day(2024, 3, 14)])
        .await
        .expect("check_status failed");

    assert!(matches!(
        report.slots[0].days[0].outcome,
        DayOutcome::Build(_)
    ));
    assert!(matches!(
        report.slots[1].days[0].outcome,
        DayOutcome::Unavailable
    ));
}

/// Multi-day HTML report: resolved days render as expandable sections,
/// gap days as "(No build)".
#[tokio::test]
async fn test_multi_day_html_report() {
    let mut data = StubData {
        index: "lhcb-sim11/482/\n".to_string(),
        ..StubData::default()
    };
    data.summaries.insert(
        ("lhcb-sim11".to_string(), 482),
        completed("2024-03-15", 0, 0),
    );
    // The slot skipped the 14th.
    data.summaries.insert(
        ("lhcb-sim11".to_string(), 481),
        completed("2024-03-13", 0, 0),
    );
    let checker = start_checker(data, &["lhcb-sim11"]).await;

    let report = checker
        .check_status(&[day(2024, 3, 14), day(2024, 3, 15)])
        .await
        .expect("check_status failed");

    let html = HtmlGenerator::new(&report, &checker.config().main_page).generate();
    assert!(html.contains("<h4 class='part'>lhcb-sim11</h4>"));
    assert!(html.contains("<summary>2024-03-14/(No build)</summary>"));
    assert!(html.contains("<summary>2024-03-15/482</summary>"));
    assert!(html.contains("lhcb-sim11/482/"));
}

/// Config seeding reads the latest summary of every discovered slot.
#[tokio::test]
async fn test_observed_names_over_http() {
    let mut data = StubData {
        index: "lhcb-sim11/482/\nlhcb-sim10/90/\n".to_string(),
        ..StubData::default()
    };
    data.summaries.insert(
        ("lhcb-sim11".to_string(), 482),
        completed("2024-03-15", 0, 0),
    );
    data.summaries.insert(
        ("lhcb-sim10".to_string(), 90),
        json!({"aborted": true, "date": "2024-03-15", "projects": []}),
    );
    let checker = start_checker(data, &["lhcb-sim11", "lhcb-sim10"]).await;

    let observed = checker
        .observed_names()
        .await
        .expect("observed_names failed");
    assert_eq!(observed.slots, vec!["lhcb-sim10", "lhcb-sim11"]);
    assert_eq!(observed.platforms, vec![PLATFORM]);
    assert_eq!(observed.projects, vec!["Gauss", "Moore"]);
}
