use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::{Context, Result, anyhow};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod repository;
mod routes;
mod scheduling;
mod utils;


use config::{Config, GeneratorKind, StorageBackend};
use db::init_db;

use crate::docs::ApiDoc;
use crate::repository::Repositories;
use crate::scheduling::{ConstraintSolver, LlmGenerator, TimetableGenerator};
use crate::utils::email_index::EmailIndex;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "School staff portal is running"
}

fn build_generator(config: &Config) -> Result<Arc<dyn TimetableGenerator>> {
    match config.generator {
        GeneratorKind::Solver => Ok(Arc::new(ConstraintSolver::new())),
        GeneratorKind::Llm => {
            let llm = config
                .llm
                .clone()
                .ok_or_else(|| anyhow!("LLM settings missing"))?;
            Ok(Arc::new(LlmGenerator::new(llm)?))
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    // `school-portal hash-password <password>` prints a PHC string for ADMIN/VP_PASSWORD_HASH
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let password = args.next().context("usage: school-portal hash-password <password>")?;
        let hash = auth::password::hash_password(&password)
            .map_err(|e| anyhow!("failed to hash password: {e}"))?;
        println!("{hash}");
        return Ok(());
    }

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let repositories = match config.storage_backend {
        StorageBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            Repositories::mysql(init_db(url, config.db_max_connections).await?)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            Repositories::memory()
        }
    };

    let generator = build_generator(&config)?;
    info!(generator = generator.name(), "Timetable generator ready");

    let email_index = Data::new(EmailIndex::new());
    let repositories = Data::new(repositories);
    let generator: Data<dyn TimetableGenerator> = Data::from(generator);
    let config_data = Data::new(config.clone());

    let warmup_index = email_index.clone();
    let warmup_repos = repositories.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = warmup_index.warmup(warmup_repos.staff.as_ref(), 250).await {
            warn!(error = %e, "Failed to warm up email index");
        }
    });

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(repositories.clone())
            .app_data(email_index.clone())
            .app_data(generator.clone())
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
