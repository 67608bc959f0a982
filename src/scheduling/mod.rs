//! Daily timetable generation.
//!
//! `request` turns today's attendance into generator input, a [`TimetableGenerator`] produces a
//! candidate, `schema` decides whether the candidate is acceptable at all and `rules` reports
//! scheduling problems for the reviewer.

pub mod llm;
pub mod request;
pub mod rules;
pub mod schema;
pub mod solver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use llm::LlmGenerator;
pub use solver::ConstraintSolver;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresentTeacher {
    #[schema(example = "TEACH-482913")]
    pub id: String,
    #[schema(example = "Asha Rao")]
    pub full_name: String,
    #[schema(example = "Science")]
    pub subject: String,
    #[schema(example = json!(["Class 9"]))]
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest {
    pub present_teachers: Vec<PresentTeacher>,
    pub all_classes: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service unreachable: {0}")]
    Transport(String),

    #[error("generation service answered {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("generation service reply was not usable: {0}")]
    MalformedReply(String),

    #[error("no teacher is present to cover {class} at {slot}")]
    Unsatisfiable { class: String, slot: String },
}

/// Produces a raw candidate timetable. Callers validate the shape with
/// [`schema::validate_timetable`] before trusting it.
#[async_trait]
pub trait TimetableGenerator: Send + Sync {
    async fn generate(&self, request: &TimetableRequest) -> Result<serde_json::Value, GenerationError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
