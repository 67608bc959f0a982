use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    api::storage_error,
    auth::auth::AuthUser,
    model::{
        school_class::SchoolClass,
        staff::{Staff, StaffRole},
    },
    repository::{Repositories, RepositoryError, UniqueKey},
    utils::{
        email_index::{EmailIndex, normalize},
        staff_id::{MAX_ID_ATTEMPTS, generate_staff_id},
    },
};

#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStaff {
    #[schema(example = "Asha Rao")]
    pub full_name: String,
    #[schema(example = "asha.rao@school.edu", format = "email")]
    pub email: String,
    #[schema(example = "teaching")]
    pub role: String,
    #[schema(example = "M.Sc. B.Ed.")]
    pub education_qualification: Option<String>,
    /// Subject specialty, required for teaching staff.
    #[schema(example = "Science")]
    pub post: Option<String>,
    /// Class ids or labels, required for teaching staff.
    #[schema(example = json!(["9"]))]
    pub teaching_classes: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema)]
pub struct RegisteredResponse {
    #[schema(example = "Registration successful")]
    pub message: String,
    #[schema(example = "TEACH-482913")]
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Invalid(String),
    #[error("An account with this email already exists.")]
    EmailTaken,
    #[error("Could not allocate a staff id, please try again.")]
    IdsExhausted,
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn required(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a registration form into a staff record (id still empty).
pub fn validate_registration(payload: &RegisterStaff) -> Result<Staff, RegistrationError> {
    let full_name = payload.full_name.trim();
    if full_name.chars().count() < 3 {
        return Err(RegistrationError::Invalid(
            "Full name must be at least 3 characters".into(),
        ));
    }

    let email = normalize(&payload.email);
    if !is_valid_email(&email) {
        return Err(RegistrationError::Invalid("Invalid email address".into()));
    }

    let role = StaffRole::from_str(payload.role.trim())
        .map_err(|_| RegistrationError::Invalid("Please select a role".into()))?;

    let mut staff = Staff {
        id: String::new(),
        full_name: full_name.to_string(),
        email,
        role,
        registration_date: Utc::now(),
        education_qualification: None,
        post: None,
        teaching_classes: None,
    };

    if role.is_teaching() {
        let missing =
            || RegistrationError::Invalid("Education, post, and classes are required for teaching staff".into());

        let qualification = required(&payload.education_qualification).ok_or_else(missing)?;
        let post = required(&payload.post).ok_or_else(missing)?;
        let requested = payload.teaching_classes.as_deref().unwrap_or_default();
        if requested.is_empty() {
            return Err(missing());
        }

        let mut classes: Vec<SchoolClass> = Vec::with_capacity(requested.len());
        for raw in requested {
            let class = SchoolClass::parse(raw)
                .ok_or_else(|| RegistrationError::Invalid(format!("Unknown class '{raw}'")))?;
            if !classes.contains(&class) {
                classes.push(class);
            }
        }

        staff.education_qualification = Some(qualification);
        staff.post = Some(post);
        staff.teaching_classes = Some(classes.iter().map(|c| c.label().to_string()).collect());
    }

    Ok(staff)
}

/// Validates, allocates an id and stores the new staff member.
pub async fn register_staff(
    repos: &Repositories,
    emails: &EmailIndex,
    payload: &RegisterStaff,
) -> Result<Staff, RegistrationError> {
    let mut staff = validate_registration(payload)?;

    if !emails.is_available(&staff.email, repos.staff.as_ref()).await? {
        return Err(RegistrationError::EmailTaken);
    }

    let now = Utc::now().timestamp_millis();
    for attempt in 0..MAX_ID_ATTEMPTS {
        staff.id = generate_staff_id(staff.role, now, attempt);

        match repos.staff.insert_staff(&staff).await {
            Ok(()) => {
                emails.mark_taken(&staff.email).await;
                info!(staff_id = %staff.id, role = %staff.role, "Staff registered");
                return Ok(staff);
            }
            Err(RepositoryError::Duplicate(UniqueKey::StaffId)) => {
                info!(staff_id = %staff.id, attempt, "Staff id taken, trying next suffix");
            }
            Err(RepositoryError::Duplicate(UniqueKey::StaffEmail)) => {
                emails.mark_taken(&staff.email).await;
                return Err(RegistrationError::EmailTaken);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(RegistrationError::IdsExhausted)
}

/// Maps a registration outcome to the response both registration endpoints share.
pub fn registration_response(result: Result<Staff, RegistrationError>) -> HttpResponse {
    match result {
        Ok(staff) => HttpResponse::Created().json(RegisteredResponse {
            message: "Registration successful".into(),
            id: staff.id,
        }),
        Err(RegistrationError::Invalid(message)) => {
            HttpResponse::BadRequest().json(json!({ "message": message }))
        }
        Err(e @ RegistrationError::EmailTaken) => {
            HttpResponse::Conflict().json(json!({ "message": e.to_string() }))
        }
        Err(e @ RegistrationError::IdsExhausted) => {
            HttpResponse::ServiceUnavailable().json(json!({ "message": e.to_string() }))
        }
        Err(RegistrationError::Storage(e)) => {
            error!(error = %e, "Failed to register staff");
            HttpResponse::InternalServerError().json(json!({
                "message": "Could not complete registration. Please try again."
            }))
        }
    }
}

/// Register staff from the admin dashboard
#[utoipa::path(
    post,
    path = "/api/staff",
    request_body = RegisterStaff,
    responses(
        (status = 201, description = "Staff registered", body = RegisteredResponse),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "message": "Invalid email address"
        })),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "message": "An account with this email already exists."
        })),
        (status = 403, description = "Forbidden")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_staff(
    auth: AuthUser,
    repos: web::Data<Repositories>,
    emails: web::Data<EmailIndex>,
    payload: web::Json<RegisterStaff>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    Ok(registration_response(
        register_staff(&repos, &emails, &payload).await,
    ))
}

/// List all staff in registration order
#[utoipa::path(
    get,
    path = "/api/staff",
    responses(
        (status = 200, description = "Staff directory", body = [Staff]),
        (status = 403, description = "Forbidden")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_staff(
    auth: AuthUser,
    repos: web::Data<Repositories>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_vice_principal()?;

    let staff = repos.staff.list_staff().await.map_err(storage_error)?;
    Ok(HttpResponse::Ok().json(staff))
}

/// Get staff by ID
#[utoipa::path(
    get,
    path = "/api/staff/{staff_id}",
    params(
        ("staff_id", Path, description = "Staff ID")
    ),
    responses(
        (status = 200, description = "Staff found", body = Staff),
        (status = 404, description = "Staff not found", body = Object, example = json!({
            "message": "Staff not found"
        })),
        (status = 403, description = "Forbidden")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_staff(
    auth: AuthUser,
    repos: web::Data<Repositories>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let staff_id = path.into_inner();
    if !auth.can_view_staff(&staff_id) {
        return Err(actix_web::error::ErrorForbidden("Not your profile"));
    }

    match repos.staff.find_staff(&staff_id).await.map_err(storage_error)? {
        Some(staff) => Ok(HttpResponse::Ok().json(staff)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Staff not found"
        }))),
    }
}

/// Profile of the logged-in staff member
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Own profile", body = Staff),
        (status = 403, description = "Not a staff login"),
        (status = 404, description = "Profile no longer exists")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(auth: AuthUser, repos: web::Data<Repositories>) -> actix_web::Result<impl Responder> {
    let staff_id = auth.require_staff()?;

    match repos.staff.find_staff(staff_id).await.map_err(storage_error)? {
        Some(staff) => Ok(HttpResponse::Ok().json(staff)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Staff not found"
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(role: &str) -> RegisterStaff {
        RegisterStaff {
            full_name: "Asha Rao".into(),
            email: "Asha.Rao@School.edu".into(),
            role: role.into(),
            education_qualification: Some("M.Sc. B.Ed.".into()),
            post: Some("Science".into()),
            teaching_classes: Some(vec!["9".into(), "Class 9".into(), "11th Science".into()]),
        }
    }

    #[test]
    fn teaching_registration_normalizes_classes_and_email() {
        let staff = validate_registration(&form("teaching")).unwrap();
        assert_eq!(staff.email, "asha.rao@school.edu");
        assert_eq!(
            staff.teaching_classes,
            Some(vec!["Class 9".to_string(), "11th Science".to_string()])
        );
        assert_eq!(staff.post.as_deref(), Some("Science"));
    }

    #[test]
    fn non_teaching_registration_drops_teaching_fields() {
        let staff = validate_registration(&form("hostel-nurse")).unwrap();
        assert_eq!(staff.role, StaffRole::HostelNurse);
        assert!(staff.post.is_none());
        assert!(staff.teaching_classes.is_none());
        assert!(staff.education_qualification.is_none());
    }

    #[test]
    fn rejects_bad_forms() {
        let mut short = form("peon");
        short.full_name = "Al".into();
        assert!(matches!(validate_registration(&short), Err(RegistrationError::Invalid(_))));

        for email in ["no-at-sign", "a@b", "a b@school.edu", "@school.edu", "a@@school.edu"] {
            let mut bad = form("peon");
            bad.email = email.into();
            assert!(validate_registration(&bad).is_err(), "{email} should be rejected");
        }

        assert!(validate_registration(&form("principal")).is_err());

        let mut no_post = form("teaching");
        no_post.post = Some("  ".into());
        assert!(validate_registration(&no_post).is_err());

        let mut no_classes = form("teaching");
        no_classes.teaching_classes = Some(vec![]);
        assert!(validate_registration(&no_classes).is_err());

        let mut unknown_class = form("teaching");
        unknown_class.teaching_classes = Some(vec!["Class 13".into()]);
        assert!(validate_registration(&unknown_class).is_err());
    }

    #[actix_web::test]
    async fn duplicate_email_is_rejected() {
        let repos = Repositories::memory();
        let emails = EmailIndex::new();

        let first = register_staff(&repos, &emails, &form("teaching")).await.unwrap();
        assert!(first.id.starts_with("TEACH-"));
        assert_eq!(first.id.len(), "TEACH-".len() + 6);

        let mut again = form("peon");
        again.email = "asha.rao@school.edu".into();
        assert!(matches!(
            register_staff(&repos, &emails, &again).await,
            Err(RegistrationError::EmailTaken)
        ));

        // a fresh index still hits the storage constraint
        let cold = EmailIndex::new();
        assert!(matches!(
            register_staff(&repos, &cold, &again).await,
            Err(RegistrationError::EmailTaken)
        ));
    }

    #[actix_web::test]
    async fn same_role_registrations_get_distinct_ids() {
        let repos = Repositories::memory();
        let emails = EmailIndex::new();

        let mut ids = Vec::new();
        for n in 0..3 {
            let mut f = form("peon");
            f.email = format!("peon{n}@school.edu");
            ids.push(register_staff(&repos, &emails, &f).await.unwrap().id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| id.starts_with("PEON-")));
    }
}
