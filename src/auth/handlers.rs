use crate::{
    api::staff::{RegisterStaff, register_staff, registration_response},
    auth::{jwt::generate_access_token, password::verify_password},
    config::{Config, OfficeCredentials},
    model::role::Role,
    models::{LoginResponse, OfficeLoginReq, StaffLoginReq},
    repository::Repositories,
    utils::email_index::{EmailIndex, normalize},
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

fn issue_token(
    config: &Config,
    subject: String,
    role: Role,
    staff_id: Option<String>,
    role_name: &str,
) -> HttpResponse {
    match generate_access_token(subject, role, staff_id, &config.jwt_secret, config.access_token_ttl)
    {
        Ok(access_token) => HttpResponse::Ok().json(LoginResponse {
            access_token,
            role: role_name.to_string(),
        }),
        Err(e) => {
            error!(error = %e, "Failed to sign access token");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Self registration from the public sign-up form
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterStaff,
    responses(
        (status = 201, description = "Registered; the id is the staff member's login", body = crate::api::staff::RegisteredResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
pub async fn register(
    payload: web::Json<RegisterStaff>,
    repos: web::Data<Repositories>,
    emails: web::Data<EmailIndex>,
) -> impl Responder {
    registration_response(register_staff(&repos, &emails, &payload).await)
}

/// Staff login with the issued staff id
#[utoipa::path(
    post,
    path = "/auth/staff/login",
    request_body = StaffLoginReq,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Unknown staff id", body = Object, example = json!({
            "message": "Invalid Staff ID. Please check and try again."
        })),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "staff_login",
    skip(repos, config, payload),
    fields(staff_id = %payload.staff_id.trim())
)]
pub async fn staff_login(
    payload: web::Json<StaffLoginReq>,
    repos: web::Data<Repositories>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    let staff_id = payload.staff_id.trim();
    if staff_id.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "message": "Staff ID is required"
        }));
    }

    let staff = match repos.staff.find_staff(staff_id).await {
        Ok(Some(staff)) => staff,
        Ok(None) => {
            info!("Invalid credentials: unknown staff id");
            return HttpResponse::Unauthorized().json(json!({
                "message": "Invalid Staff ID. Please check and try again."
            }));
        }
        Err(e) => {
            error!(error = %e, "Storage error while fetching staff");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!("Login successful");
    issue_token(&config, staff.id.clone(), Role::Staff, Some(staff.id), "staff")
}

async fn office_login(
    payload: &OfficeLoginReq,
    expected: Option<&OfficeCredentials>,
    config: &Config,
    role: Role,
    role_name: &str,
) -> HttpResponse {
    let Some(expected) = expected else {
        info!("Office login is not configured");
        return HttpResponse::Unauthorized().json(json!({
            "message": "Invalid credentials"
        }));
    };

    let email = normalize(&payload.email);
    if email != expected.email {
        info!("Invalid credentials: email mismatch");
        return HttpResponse::Unauthorized().json(json!({
            "message": "Invalid credentials"
        }));
    }

    debug!("Verifying password");
    // argon2 hashing is CPU heavy
    let password = payload.password.clone();
    let hash = expected.password_hash.clone();
    let verified = web::block(move || verify_password(&password, &hash)).await;

    match verified {
        Ok(Ok(())) => {
            info!("Login successful");
            issue_token(config, email, role, None, role_name)
        }
        Ok(Err(e)) => {
            info!(error = %e, "Invalid credentials: password mismatch");
            HttpResponse::Unauthorized().json(json!({
                "message": "Invalid credentials"
            }))
        }
        Err(e) => {
            error!(error = %e, "Password verification task failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Admin login
#[utoipa::path(
    post,
    path = "/auth/admin/login",
    request_body = OfficeLoginReq,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
#[instrument(name = "admin_login", skip(config, payload))]
pub async fn admin_login(
    payload: web::Json<OfficeLoginReq>,
    config: web::Data<Config>,
) -> impl Responder {
    office_login(&payload, config.admin.as_ref(), &config, Role::Admin, "admin").await
}

/// Vice-principal login
#[utoipa::path(
    post,
    path = "/auth/vice-principal/login",
    request_body = OfficeLoginReq,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
#[instrument(name = "vice_principal_login", skip(config, payload))]
pub async fn vice_principal_login(
    payload: web::Json<OfficeLoginReq>,
    config: web::Data<Config>,
) -> impl Responder {
    office_login(
        &payload,
        config.vice_principal.as_ref(),
        &config,
        Role::VicePrincipal,
        "vice-principal",
    )
    .await
}
