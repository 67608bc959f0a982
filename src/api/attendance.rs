use actix_web::{HttpResponse, Responder, http::header, web};
use chrono::{Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{storage_error, today},
    auth::auth::AuthUser,
    model::attendance::{AttendanceRecord, Location},
    repository::{Repositories, RepositoryError, UniqueKey},
    utils::csv::attendance_csv,
};

/// Selfies arrive inline as data URLs.
pub const SELFIE_JSON_LIMIT: usize = 5 * 1024 * 1024;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    pub location: Option<Location>,
    #[schema(example = "data:image/jpeg;base64,/9j/4AAQ...")]
    pub selfie_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct TodayStatus {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub marked: bool,
    pub record: Option<AttendanceRecord>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub present: usize,
    pub total_staff: u64,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Calendar day, `YYYY-MM-DD`
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

fn is_image_data_url(url: &str) -> bool {
    url.strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(','))
        .is_some_and(|(_, payload)| !payload.is_empty())
}

/// Whether the logged-in staff member has checked in today
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's status", body = TodayStatus),
        (status = 403, description = "Not a staff login")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn today_status(
    auth: AuthUser,
    repos: web::Data<Repositories>,
) -> actix_web::Result<impl Responder> {
    let staff_id = auth.require_staff()?;
    let date = today();

    let record = repos
        .attendance
        .find_attendance(staff_id, date)
        .await
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(TodayStatus {
        date,
        marked: record.is_some(),
        record,
    }))
}

/// Check in for today with a selfie
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 400, description = "Missing selfie or bad location", body = Object, example = json!({
            "message": "A selfie is required to mark attendance"
        })),
        (status = 409, description = "Already marked today", body = Object, example = json!({
            "message": "Attendance already marked for today",
            "selfieUrl": "data:image/jpeg;base64,/9j/4AAQ..."
        })),
        (status = 403, description = "Not a staff login"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_attendance(
    auth: AuthUser,
    repos: web::Data<Repositories>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    let staff_id = auth.require_staff()?;
    let payload = payload.into_inner();

    if !is_image_data_url(&payload.selfie_url) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "A selfie is required to mark attendance"
        })));
    }
    if payload.location.is_some_and(|l| !l.is_valid()) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Location is out of range"
        })));
    }

    let Some(staff) = repos.staff.find_staff(staff_id).await.map_err(storage_error)? else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Staff not found"
        })));
    };

    let now = Local::now();
    let record = AttendanceRecord {
        id: format!("{}-{}", staff.id, now.timestamp_millis()),
        staff_id: staff.id.clone(),
        staff_name: staff.full_name.clone(),
        staff_role: staff.role,
        date: now.date_naive(),
        time: now.time().with_nanosecond(0).unwrap_or(now.time()),
        location: payload.location,
        selfie_url: payload.selfie_url,
    };

    match repos.attendance.insert_attendance(&record).await {
        Ok(()) => {
            info!(staff_id = %record.staff_id, date = %record.date, "Attendance marked");
            Ok(HttpResponse::Created().json(record))
        }
        Err(RepositoryError::Duplicate(UniqueKey::AttendancePerDay)) => {
            let existing = repos
                .attendance
                .find_attendance(&record.staff_id, record.date)
                .await
                .map_err(storage_error)?;

            Ok(HttpResponse::Conflict().json(json!({
                "message": "Attendance already marked for today",
                "selfieUrl": existing.map(|r| r.selfie_url),
            })))
        }
        Err(e) => Err(storage_error(e)),
    }
}

/// All attendance records, newest first
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(DateQuery),
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceRecord]),
        (status = 403, description = "Forbidden")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_attendance(
    auth: AuthUser,
    repos: web::Data<Repositories>,
    query: web::Query<DateQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_vice_principal()?;

    let records = match query.date {
        Some(date) => repos.attendance.list_attendance_for_date(date).await,
        None => repos.attendance.list_attendance().await,
    }
    .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(records))
}

/// Present count against the size of the directory
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(DateQuery),
    responses(
        (status = 200, description = "Summary for the day (default today)", body = AttendanceSummary),
        (status = 403, description = "Forbidden")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn attendance_summary(
    auth: AuthUser,
    repos: web::Data<Repositories>,
    query: web::Query<DateQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_vice_principal()?;

    let date = query.date.unwrap_or_else(today);
    let present = repos
        .attendance
        .list_attendance_for_date(date)
        .await
        .map_err(storage_error)?
        .len();
    let total_staff = repos.staff.count_staff().await.map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(AttendanceSummary {
        date,
        present,
        total_staff,
    }))
}

/// Download every attendance record as CSV
#[utoipa::path(
    get,
    path = "/api/attendance/export",
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 404, description = "Nothing to export", body = Object, example = json!({
            "message": "No attendance records to export"
        })),
        (status = 403, description = "Forbidden")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn export_attendance(
    auth: AuthUser,
    repos: web::Data<Repositories>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let records = repos.attendance.list_attendance().await.map_err(storage_error)?;
    if records.is_empty() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "No attendance records to export"
        })));
    }

    let filename = format!("attendance_records_{}.csv", today());
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(attendance_csv(&records)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selfie_must_be_an_image_data_url() {
        assert!(is_image_data_url("data:image/jpeg;base64,/9j/4AAQ"));
        assert!(is_image_data_url("data:image/png;base64,iVBOR"));
        assert!(!is_image_data_url(""));
        assert!(!is_image_data_url("data:image/png;base64,"));
        assert!(!is_image_data_url("https://example.com/me.jpg"));
        assert!(!is_image_data_url("data:text/plain,hello"));
    }
}
