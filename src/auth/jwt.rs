use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::{model::role::Role, models::Claims};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_access_token(
    subject: String,
    role: Role,
    staff_id: Option<String>,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = Claims {
        sub: subject,
        role: role.id(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        staff_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let token = generate_access_token(
            "TEACH-482913".into(),
            Role::Staff,
            Some("TEACH-482913".into()),
            "secret",
            60,
        )
        .unwrap();

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "TEACH-482913");
        assert_eq!(claims.role, Role::Staff.id());
        assert_eq!(claims.staff_id.as_deref(), Some("TEACH-482913"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token("vp@school.edu".into(), Role::VicePrincipal, None, "a", 60).unwrap();
        assert!(verify_token(&token, "b").is_err());
    }
}
