// tests/attendance_api.rs
mod common;

use axum::http::StatusCode;
use chrono::{Days, Local};
use common::{delete, get, post, test_app};
use serde_json::json;

fn mark(roll: &str, is_present: bool) -> serde_json::Value {
    json!({
        "studentName": format!("Student {}", roll),
        "studentRoll": roll,
        "dept": "CS",
        "className": "3-A",
        "subject": "Math",
        "isPresent": is_present,
    })
}

#[tokio::test]
async fn today_window_returns_records_or_counts() {
    let app = test_app().await;
    let (status, created) = post(&app, "/attendance", mark("R1", true)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["studentRoll"], "R1");
    assert_eq!(created["isPresent"], true);
    assert!(created["createdAt"].is_string());
    post(&app, "/attendance", mark("R1", false)).await;
    post(&app, "/attendance", mark("R2", true)).await;

    let (status, records) = get(&app, "/attendance/Math/R1/today").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records.as_array().unwrap().len(), 2);

    let (status, count) = get(&app, "/attendance/Math/R1/today?view=count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!({ "present": 1, "absent": 1, "total": 2 }));

    for window in ["last7days", "lastweek", "last30days", "total"] {
        let (status, count) = get(&app, &format!("/attendance/Math/R1/{}?view=count", window)).await;
        assert_eq!(status, StatusCode::OK, "window {}", window);
        assert_eq!(count["total"], 2);
    }
}

#[tokio::test]
async fn trailing_windows_respect_their_start() {
    let app = test_app().await;
    let ten_days_ago = Local::now()
        .date_naive()
        .checked_sub_days(Days::new(10))
        .unwrap()
        .format("%Y-%m-%dT10:00:00")
        .to_string();

    let mut old = mark("R1", true);
    old["createdAt"] = json!(ten_days_ago);
    post(&app, "/attendance", old).await;
    post(&app, "/attendance", mark("R1", false)).await;

    let (_, week) = get(&app, "/attendance/Math/R1/last7days?view=count").await;
    assert_eq!(week, json!({ "present": 0, "absent": 1, "total": 1 }));
    let (_, month) = get(&app, "/attendance/Math/R1/last30days?view=count").await;
    assert_eq!(month, json!({ "present": 1, "absent": 1, "total": 2 }));
}

#[tokio::test]
async fn rejects_bad_input_with_json_errors() {
    let app = test_app().await;

    let (status, body) = post(&app, "/attendance", json!({ "studentRoll": "R1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let mut blank = mark("R1", true);
    blank["subject"] = json!("");
    let (status, _) = post(&app, "/attendance", blank).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/attendance/Math/R1/yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("yesterday"));

    let (status, _) = get(&app, "/attendance/Math/R1/today?view=chart").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_parameters_must_fit_the_report() {
    let app = test_app().await;

    for uri in [
        "/attendance/CS/3-A/Math/lastweek?view=count",
        "/attendance/CS/3-A/Math/lastclasses?view=records",
        "/attendance/CS/3-A/Math/lastweek?limit=3",
        "/attendance/CS/3-A/Math/today?limit=3",
        "/attendance/Math/R1/today?limit=3",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string());
    }

    let (status, _) = get(&app, "/attendance/CS/3-A/Math/lastclasses?limit=3").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/attendance/CS/3-A/Math/today?view=count").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bulk_insert_requires_a_non_empty_array() {
    let app = test_app().await;
    let mut batch = mark("R1", true);
    batch["attendanceRecords"] = json!([]);
    let (status, body) = post(&app, "/attendance/multiple", batch.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "attendanceRecords must be a non-empty array");

    batch["attendanceRecords"] = json!("not a list");
    let (status, _) = post(&app, "/attendance/multiple", batch.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    batch["attendanceRecords"] = json!([
        { "isPresent": true, "createdAt": "2025-04-14T09:00:00" },
        { "isPresent": false, "createdAt": "2025-04-15T09:00:00" },
        { "isPresent": true },
    ]);
    let (status, body) = post(&app, "/attendance/multiple", batch).await;
    assert_eq!(status, StatusCode::CREATED);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[1]["isPresent"], false);
    assert!(data[0]["createdAt"].as_str().unwrap().starts_with("2025-04-14T09:00:00"));

    let (_, all) = get(&app, "/attendance").await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn class_reports() {
    let app = test_app().await;
    for (roll, present) in [("R1", true), ("R2", false), ("R3", true)] {
        post(&app, "/attendance", mark(roll, present)).await;
    }

    let (status, today) = get(&app, "/attendance/CS/3-A/Math/today").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today.as_array().unwrap().len(), 3);

    let (_, counted) = get(&app, "/attendance/CS/3-A/Math/today?view=count").await;
    assert_eq!(counted, json!({ "present": 2, "absent": 1, "total": 3 }));

    let (status, week) = get(&app, "/attendance/CS/3-A/Math/lastweek").await;
    assert_eq!(status, StatusCode::OK);
    let week = week.as_array().unwrap();
    assert_eq!(week.len(), 7);
    let today_str = Local::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(week[6]["date"], today_str);
    let present: i64 = week.iter().map(|d| d["studentsPresent"].as_i64().unwrap()).sum();
    let absent: i64 = week.iter().map(|d| d["studentsAbsent"].as_i64().unwrap()).sum();
    assert_eq!((present, absent), (2, 1));

    let (status, sessions) = get(&app, "/attendance/CS/3-A/Math/lastclasses?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let sessions = sessions.as_array().unwrap();
    assert!(!sessions.is_empty() && sessions.len() <= 2);
    assert!(sessions[0]["sessionTime"].is_string());

    let (status, _) = get(&app, "/attendance/CS/3-A/Math/lastclasses?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/attendance/CS/3-A/Math/lastyear").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn total_classes_counts_distinct_sessions() {
    let app = test_app().await;
    let (_, body) = get(&app, "/attendance/totalClasses/CS/3-A/Math").await;
    assert_eq!(body, json!({ "totalClasses": 0 }));

    let mut batch = mark("R1", true);
    batch["attendanceRecords"] = json!([
        { "isPresent": true, "createdAt": "2025-04-14T09:00:00" },
        { "isPresent": true, "createdAt": "2025-04-14T11:00:00" },
    ]);
    post(&app, "/attendance/multiple", batch.clone()).await;
    batch["studentRoll"] = json!("R2");
    batch["attendanceRecords"] = json!([
        { "isPresent": false, "createdAt": "2025-04-14T09:00:00" },
    ]);
    post(&app, "/attendance/multiple", batch).await;

    let (status, body) = get(&app, "/attendance/totalClasses/CS/3-A/Math").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "totalClasses": 2 }));
}

#[tokio::test]
async fn delete_all_empties_the_collection() {
    let app = test_app().await;
    post(&app, "/attendance", mark("R1", true)).await;
    post(&app, "/attendance", mark("R2", true)).await;

    let (status, body) = delete(&app, "/attendance").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 2);

    let (_, all) = get(&app, "/attendance").await;
    assert_eq!(all, json!([]));
}
