//! Timetable generation through a chat-completions language model.
//!
//! The model gets the school's scheduling rules as instructions and today's teachers and
//! classes as JSON, and is asked for a single JSON object. Nothing here checks that the model
//! honoured the rules; the caller validates the shape and reports rule problems.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{GenerationError, TimetableGenerator, TimetableRequest};
use crate::config::LlmConfig;

const INSTRUCTIONS: &str = r#"You plan the daily class schedule for a school.
Build a complete timetable for every class using only the teachers present today.

Rules:
1. The school day has exactly these slots, and every class schedule must contain every one of them as a key:
   "08:40 AM - 09:20 AM", "09:20 AM - 10:00 AM", "10:00 AM - 10:40 AM", "10:40 AM - 11:20 AM",
   "11:20 AM - 12:00 PM", "12:00 PM - 12:40 PM", "12:40 PM - 01:20 PM", "01:20 PM - 02:00 PM",
   "02:00 PM - 02:20 PM", "02:20 PM - 03:00 PM", "03:00 PM - 03:40 PM".
2. "12:40 PM - 01:20 PM" is lunch for everyone. Its value must be {"teacher": "LUNCH", "subject": "LUNCH"}.
3. "02:00 PM - 02:20 PM" is a short 20 minute period; give it a core subject where possible.
4. "02:20 PM - 03:00 PM" and "03:00 PM - 03:40 PM" are remedial periods. For classes 9 and above prefer Maths, Science and English teachers.
5. A teacher teaches at most one class in any slot. Never double-book.
6. Prefer teachers qualified for the class (their "classes" list) teaching their own "subject".
7. Spread periods evenly; avoid long back-to-back runs for one teacher while others are free.
8. Every slot except lunch must have a teacher and a subject. When qualified teachers run out, reassign sensibly (a Physics teacher can take junior Science) or schedule a Library or Study Hall period with a free teacher.

Answer with one JSON object only. Each key is a class name from "allClasses"; each value maps every slot above to {"teacher": <full name>, "subject": <subject>}."#;

/// Renders the user message: today's teachers and the classes to schedule.
pub fn render_prompt(request: &TimetableRequest) -> Result<String, GenerationError> {
    let teachers = serde_json::to_string_pretty(&request.present_teachers)
        .map_err(|e| GenerationError::MalformedReply(e.to_string()))?;
    let classes = serde_json::to_string_pretty(&request.all_classes)
        .map_err(|e| GenerationError::MalformedReply(e.to_string()))?;

    Ok(format!(
        "Present teachers:\n```json\n{teachers}\n```\n\nAll classes to schedule:\n```json\n{classes}\n```"
    ))
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Pulls the JSON object out of a chat-completions reply. Models sometimes wrap it in a
/// ```json fence even in JSON mode.
pub fn extract_timetable(body: &str) -> Result<Value, GenerationError> {
    let reply: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::MalformedReply(e.to_string()))?;

    let content = reply
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| GenerationError::MalformedReply("reply has no content".into()))?;

    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim()).map_err(|e| GenerationError::MalformedReply(e.to_string()))
}

pub struct LlmGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TimetableGenerator for LlmGenerator {
    async fn generate(&self, request: &TimetableRequest) -> Result<Value, GenerationError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": INSTRUCTIONS },
                { "role": "user", "content": render_prompt(request)? },
            ],
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body: text.trim().chars().take(500).collect(),
            });
        }

        extract_timetable(&text)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}
