//! End-to-end tests for the dashboard.
//!
//! These tests verify:
//! 1. Counts are scoped to the token's account
//! 2. "Today" and "this month" follow the injected clock

use axum::http::StatusCode;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::e2e_tests::helpers::TestApp;
use crate::store::{Appointment, AppointmentStatus, DataStore};
use crate::time::ManualTimeSource;

fn at(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0)
        .single()
        .expect("valid date")
}

fn book(app: &TestApp, owner: &str, when: DateTime<Utc>, status: AppointmentStatus) {
    app.store
        .insert_appointment(Appointment {
            id: format!("{owner}-{when}"),
            user_id: owner.to_string(),
            appointment_date: when,
            status,
        })
        .expect("insert appointment");
}

/// App whose clock reads 2024-03-10T20:00:00Z.
fn app_on_march_tenth() -> TestApp {
    let millis = at(10, 20).timestamp_millis();
    TestApp::with_clock(ManualTimeSource::new(
        u64::try_from(millis).expect("positive timestamp"),
    ))
}

#[tokio::test]
async fn test_dashboard_empty_account() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("ana@example.com").await;

    let (status, body) = app.get("/api/dashboard", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "total_agendamentos_dia": 0,
            "total_agendamentos_mes": 0,
            "total_atendimentos": 0,
        })
    );
}

#[tokio::test]
async fn test_dashboard_counts_for_caller_only() {
    let app = app_on_march_tenth();
    let (ana, token) = app.sign_up("ana@example.com").await;
    let (bruno, _) = app.sign_up("bruno@example.com").await;

    book(&app, &ana, at(10, 9), AppointmentStatus::Completed);
    book(&app, &ana, at(10, 17), AppointmentStatus::Scheduled);
    book(&app, &ana, at(3, 10), AppointmentStatus::Completed);
    book(&app, &ana, at(11, 0), AppointmentStatus::Cancelled);
    book(&app, &bruno, at(10, 10), AppointmentStatus::Completed);

    let (status, body) = app.get("/api/dashboard", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "total_agendamentos_dia": 2,
            "total_agendamentos_mes": 4,
            "total_atendimentos": 2,
        })
    );
}

#[tokio::test]
async fn test_dashboard_today_moves_with_clock() {
    let app = app_on_march_tenth();
    let (ana, token) = app.sign_up("ana@example.com").await;
    book(&app, &ana, at(11, 9), AppointmentStatus::Scheduled);

    let (_, before) = app.get("/api/dashboard", Some(&token)).await;
    assert_eq!(before["total_agendamentos_dia"], 0);

    // 8pm on the 10th to 1am on the 11th; the token is still fresh.
    app.clock.advance_secs(5 * 60 * 60);
    let (status, after) = app.get("/api/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["total_agendamentos_dia"], 1);
    assert_eq!(after["total_agendamentos_mes"], 1);
}
