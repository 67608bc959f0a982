pub mod attendance;
pub mod staff;
pub mod timetable;

use actix_web::{HttpResponse, error::InternalError};
use chrono::{Local, NaiveDate};
use serde_json::json;

use crate::repository::RepositoryError;

/// The school's calendar day, in server local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn storage_error(e: RepositoryError) -> actix_web::Error {
    tracing::error!(error = %e, "Storage operation failed");
    let response = HttpResponse::InternalServerError().json(json!({
        "message": "Internal Server Error"
    }));
    InternalError::from_response(e, response).into()
}
