//! Dashboard statistics for the authenticated account.
//!
//! Day and month windows are computed in UTC from the injected clock and are
//! half-open: `[start of today, start of tomorrow)` and
//! `[first of this month, first of next month)`.

use axum::{Extension, Json, extract::State};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::auth::Identity;
use crate::store::{AppointmentFilter, AppointmentStatus, DataStore, StoreError};
use crate::time::TimeSource;

const INTERNAL_ERROR: &str = "Internal error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    #[serde(rename = "total_agendamentos_dia")]
    pub appointments_today: u64,
    #[serde(rename = "total_agendamentos_mes")]
    pub appointments_this_month: u64,
    #[serde(rename = "total_atendimentos")]
    pub completed_appointments: u64,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// `[start of day, start of next day)` around `now`.
fn day_window(now: DateTime<Utc>) -> AppointmentFilter {
    let today = now.date_naive();
    AppointmentFilter {
        from: Some(midnight(today)),
        until: today.succ_opt().map(midnight),
        status: None,
    }
}

/// `[first of month, first of next month)` around `now`.
fn month_window(now: DateTime<Utc>) -> AppointmentFilter {
    let first = now.date_naive().with_day(1);
    AppointmentFilter {
        from: first.map(midnight),
        until: first
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .map(midnight),
        status: None,
    }
}

/// Current instant according to `clock`, or `None` if it is out of chrono's range.
fn now_utc(clock: &dyn TimeSource) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(i64::try_from(clock.now_ms()).ok()?)
}

/// Count `owner`'s appointments for the dashboard as of `now`.
///
/// # Errors
/// Propagates store failures.
pub fn dashboard_stats(
    store: &dyn DataStore,
    owner: &str,
    now: DateTime<Utc>,
) -> Result<DashboardStats, StoreError> {
    let completed = AppointmentFilter {
        status: Some(AppointmentStatus::Completed),
        ..AppointmentFilter::default()
    };

    Ok(DashboardStats {
        appointments_today: store.count_appointments(owner, day_window(now))?,
        appointments_this_month: store.count_appointments(owner, month_window(now))?,
        completed_appointments: store.count_appointments(owner, completed)?,
    })
}

/// `GET /api/dashboard`
pub async fn summary(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<DashboardStats>, ApiError> {
    let now = now_utc(state.clock.as_ref())
        .ok_or_else(|| ApiError::internal(INTERNAL_ERROR, &"clock out of range"))?;

    dashboard_stats(state.store.as_ref(), &identity.user_id, now)
        .map(Json)
        .map_err(|e| ApiError::internal(INTERNAL_ERROR, &e))
}
