use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use dotenvy::dotenv;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MySql,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StorageBackend::MySql),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("unknown STORAGE_BACKEND '{other}' (expected mysql or memory)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Solver,
    Llm,
}

impl FromStr for GeneratorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "solver" => Ok(GeneratorKind::Solver),
            "llm" => Ok(GeneratorKind::Llm),
            other => Err(anyhow!("unknown TIMETABLE_GENERATOR '{other}' (expected solver or llm)")),
        }
    }
}

/// A login that is not stored in the staff directory.
#[derive(Clone)]
pub struct OfficeCredentials {
    pub email: String,
    /// argon2 PHC string
    pub password_hash: String,
}

#[derive(Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    pub admin: Option<OfficeCredentials>,
    pub vice_principal: Option<OfficeCredentials>,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub generator: GeneratorKind,
    pub llm: Option<LlmConfig>,
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

fn credentials(email_key: &str, hash_key: &str) -> Option<OfficeCredentials> {
    match (env::var(email_key), env::var(hash_key)) {
        (Ok(email), Ok(password_hash)) => Some(OfficeCredentials {
            email: email.trim().to_lowercase(),
            password_hash,
        }),
        _ => None,
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let storage_backend: StorageBackend = var_or("STORAGE_BACKEND", StorageBackend::MySql)?;
        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND=mysql");
        }

        let generator: GeneratorKind = var_or("TIMETABLE_GENERATOR", GeneratorKind::Solver)?;
        let llm = match env::var("LLM_API_KEY") {
            Ok(api_key) => Some(LlmConfig {
                api_url: env::var("LLM_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
                api_key,
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                timeout_secs: var_or("LLM_TIMEOUT_SECS", 60)?,
            }),
            Err(_) => None,
        };
        if generator == GeneratorKind::Llm && llm.is_none() {
            bail!("LLM_API_KEY must be set when TIMETABLE_GENERATOR=llm");
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            storage_backend,
            database_url,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: var_or("ACCESS_TOKEN_TTL", 28_800)?, // one school day

            admin: credentials("ADMIN_EMAIL", "ADMIN_PASSWORD_HASH"),
            vice_principal: credentials("VP_EMAIL", "VP_PASSWORD_HASH"),

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: var_or("RATE_REGISTER_PER_MIN", 30)?,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            generator,
            llm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_and_generator_names() {
        assert_eq!("MySQL".parse::<StorageBackend>().unwrap(), StorageBackend::MySql);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("sqlite".parse::<StorageBackend>().is_err());
        assert_eq!("LLM".parse::<GeneratorKind>().unwrap(), GeneratorKind::Llm);
        assert!("oracle".parse::<GeneratorKind>().is_err());
    }
}
