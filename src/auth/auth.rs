use crate::config::Config;
use crate::{auth::jwt::verify_token, model::role::Role};
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorForbidden,
    error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub role: Role,

    /// Present only for staff logins
    pub staff_id: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            role,
            staff_id: claims.staff_id,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }

    pub fn require_vice_principal(&self) -> actix_web::Result<()> {
        if self.role == Role::VicePrincipal {
            Ok(())
        } else {
            Err(ErrorForbidden("Vice-principal only"))
        }
    }

    pub fn require_admin_or_vice_principal(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::VicePrincipal) {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin/Vice-principal only"))
        }
    }

    /// The staff id of a staff login.
    pub fn require_staff(&self) -> actix_web::Result<&str> {
        match (&self.role, &self.staff_id) {
            (Role::Staff, Some(id)) => Ok(id),
            _ => Err(ErrorForbidden("No staff profile")),
        }
    }

    /// Office roles may read any profile, staff only their own.
    pub fn can_view_staff(&self, staff_id: &str) -> bool {
        match self.role {
            Role::Admin | Role::VicePrincipal => true,
            Role::Staff => self
                .staff_id
                .as_deref()
                .is_some_and(|own| own.eq_ignore_ascii_case(staff_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, staff_id: Option<&str>) -> AuthUser {
        AuthUser {
            role,
            staff_id: staff_id.map(str::to_string),
        }
    }

    #[test]
    fn guards_follow_role_and_staff_id() {
        let staff = user(Role::Staff, Some("TEACH-123456"));
        assert_eq!(staff.require_staff().unwrap(), "TEACH-123456");
        assert!(staff.require_admin().is_err());
        assert!(staff.can_view_staff("teach-123456"));
        assert!(!staff.can_view_staff("TEACH-654321"));

        let vp = user(Role::VicePrincipal, None);
        assert!(vp.require_staff().is_err());
        assert!(vp.require_vice_principal().is_ok());
        assert!(vp.require_admin_or_vice_principal().is_ok());
        assert!(vp.can_view_staff("TEACH-654321"));

        // a staff role without a profile id cannot act as staff
        assert!(user(Role::Staff, None).require_staff().is_err());
    }
}
