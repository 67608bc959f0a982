use argon2::{
    Argon2,
    password_hash::{
        Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// Produces the PHC string expected in `ADMIN_PASSWORD_HASH` / `VP_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(password.as_bytes(), &parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("chalk-and-board").unwrap();
        assert!(verify_password("chalk-and-board", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
