use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    api::{storage_error, today},
    auth::auth::AuthUser,
    model::{
        school_class::SchoolClass,
        timetable::{PersonalEntry, Timetable},
    },
    repository::Repositories,
    scheduling::{
        TimetableGenerator, TimetableRequest,
        request::{BuildError, build_request},
        rules::{RuleViolation, check_rules},
        schema::validate_timetable,
    },
};

#[derive(Serialize, ToSchema)]
pub struct GeneratedTimetable {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Object)]
    pub timetable: Timetable,
    /// Advisory findings for the reviewer; they do not block publishing.
    pub violations: Vec<RuleViolation>,
}

#[derive(Serialize, ToSchema)]
pub struct PersonalSchedule {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Asha Rao")]
    pub teacher: String,
    pub periods: Vec<PersonalEntry>,
}

fn parse_date(raw: &str) -> actix_web::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| actix_web::error::ErrorBadRequest("Date must be YYYY-MM-DD"))
}

async fn todays_request(repos: &Repositories) -> actix_web::Result<Result<TimetableRequest, BuildError>> {
    let date = today();
    let attendance = repos
        .attendance
        .list_attendance_for_date(date)
        .await
        .map_err(storage_error)?;
    let staff = repos.staff.list_staff().await.map_err(storage_error)?;

    Ok(build_request(&attendance, &staff, date))
}

fn no_teachers(e: BuildError) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "message": e.to_string() }))
}

/// Preview the generator input for today
#[utoipa::path(
    get,
    path = "/api/timetable/request",
    responses(
        (status = 200, description = "Present teachers and classes", body = TimetableRequest),
        (status = 400, description = "Nobody to schedule", body = Object, example = json!({
            "message": "No teaching staff have marked attendance yet."
        })),
        (status = 403, description = "Forbidden")
    ),
    tag = "Timetable",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn timetable_request(
    auth: AuthUser,
    repos: web::Data<Repositories>,
) -> actix_web::Result<impl Responder> {
    auth.require_vice_principal()?;

    Ok(match todays_request(&repos).await? {
        Ok(request) => HttpResponse::Ok().json(request),
        Err(e) => no_teachers(e),
    })
}

/// Generate a candidate timetable for today (not saved)
#[utoipa::path(
    post,
    path = "/api/timetable/generate",
    responses(
        (status = 200, description = "Candidate timetable", body = GeneratedTimetable),
        (status = 400, description = "Nobody to schedule"),
        (status = 502, description = "Generator failed or produced an invalid timetable", body = Object, example = json!({
            "message": "Timetable generation failed",
            "details": "no teacher is free for Class 10 at 08:40 AM - 09:20 AM"
        })),
        (status = 403, description = "Forbidden")
    ),
    tag = "Timetable",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "timetable_generate", skip_all, fields(generator = generator.name()))]
pub async fn generate_timetable(
    auth: AuthUser,
    repos: web::Data<Repositories>,
    generator: web::Data<dyn TimetableGenerator>,
) -> actix_web::Result<impl Responder> {
    auth.require_vice_principal()?;

    let request = match todays_request(&repos).await? {
        Ok(request) => request,
        Err(e) => return Ok(no_teachers(e)),
    };
    info!(teachers = request.present_teachers.len(), "Generating timetable");

    let candidate = match generator.generate(&request).await {
        Ok(candidate) => candidate,
        Err(e) => {
            error!(error = %e, "Timetable generation failed");
            return Ok(HttpResponse::BadGateway().json(json!({
                "message": "Timetable generation failed",
                "details": e.to_string(),
            })));
        }
    };

    let timetable = match validate_timetable(&candidate, &request.all_classes) {
        Ok(timetable) => timetable,
        Err(e) => {
            warn!(error = %e, "Generated timetable rejected");
            return Ok(HttpResponse::BadGateway().json(json!({
                "message": "Generated timetable has an invalid shape",
                "details": e.to_string(),
            })));
        }
    };

    let violations = check_rules(&timetable, &request.present_teachers);
    if !violations.is_empty() {
        warn!(count = violations.len(), "Generated timetable breaks scheduling rules");
    }

    Ok(HttpResponse::Ok().json(GeneratedTimetable {
        date: today(),
        timetable,
        violations,
    }))
}

/// Publish the timetable for a day, replacing any earlier one
#[utoipa::path(
    put,
    path = "/api/timetable/{date}",
    params(
        ("date", Path, description = "Calendar day, YYYY-MM-DD")
    ),
    request_body(content = Object, description = "Class name -> time slot -> {teacher, subject}"),
    responses(
        (status = 200, description = "Published", body = Object, example = json!({
            "message": "Timetable published"
        })),
        (status = 400, description = "Invalid timetable shape"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Timetable",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn publish_timetable(
    auth: AuthUser,
    repos: web::Data<Repositories>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_vice_principal()?;
    let date = parse_date(&path)?;

    let timetable = match validate_timetable(&payload, &SchoolClass::all_labels()) {
        Ok(timetable) => timetable,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": e.to_string()
            })));
        }
    };

    repos
        .timetables
        .put_timetable(date, &timetable)
        .await
        .map_err(storage_error)?;
    info!(%date, "Timetable published");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Timetable published"
    })))
}

/// The published timetable for a day
#[utoipa::path(
    get,
    path = "/api/timetable/{date}",
    params(
        ("date", Path, description = "Calendar day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Timetable", body = Object),
        (status = 404, description = "Nothing published for that day", body = Object, example = json!({
            "message": "No timetable published for this date"
        }))
    ),
    tag = "Timetable",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_timetable(
    _auth: AuthUser,
    repos: web::Data<Repositories>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let date = parse_date(&path)?;

    match repos.timetables.get_timetable(date).await.map_err(storage_error)? {
        Some(timetable) => Ok(HttpResponse::Ok().json(timetable)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "No timetable published for this date"
        }))),
    }
}

/// The logged-in teacher's periods for a day
#[utoipa::path(
    get,
    path = "/api/timetable/{date}/mine",
    params(
        ("date", Path, description = "Calendar day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Personal schedule in slot order", body = PersonalSchedule),
        (status = 404, description = "Nothing published for that day"),
        (status = 403, description = "Not a staff login")
    ),
    tag = "Timetable",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_timetable(
    auth: AuthUser,
    repos: web::Data<Repositories>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let staff_id = auth.require_staff()?;
    let date = parse_date(&path)?;

    let Some(staff) = repos.staff.find_staff(staff_id).await.map_err(storage_error)? else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Staff not found"
        })));
    };
    let Some(timetable) = repos.timetables.get_timetable(date).await.map_err(storage_error)? else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "No timetable published for this date"
        })));
    };

    Ok(HttpResponse::Ok().json(PersonalSchedule {
        date,
        periods: timetable.personal_schedule(&staff.full_name),
        teacher: staff.full_name,
    }))
}
