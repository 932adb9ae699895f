//! # Solver Module
//!
//! Produces the solution text for a recognized task. The default backend only
//! echoes the task into a fixed template; the OpenAI backend asks a chat
//! completion model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{Config, SolverBackend};
use crate::errors::BotError;

pub const PLACEHOLDER_PREFIX: &str = "GPT-відповідь для тексту: ";
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const SYSTEM_PROMPT: &str =
    "Ти помічник, який розв'язує шкільні завдання. Дай розв'язок і коротке пояснення українською.";

#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(&self, task: &str) -> Result<String, BotError>;
}

/// Echoes the task into a fixed answer template
#[derive(Debug, Default, Clone)]
pub struct PlaceholderSolver;

#[async_trait]
impl Solver for PlaceholderSolver {
    async fn solve(&self, task: &str) -> Result<String, BotError> {
        Ok(format!("{PLACEHOLDER_PREFIX}{task}"))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completions backend
pub struct OpenAiSolver {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiSolver {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: OPENAI_CHAT_URL.to_string(),
        }
    }

    /// Point the solver at a different chat-completions endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Solver for OpenAiSolver {
    async fn solve(&self, task: &str) -> Result<String, BotError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: task,
                },
            ],
        };

        debug!(model = %self.model, task_chars = task.chars().count(), "Requesting solution");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Solver(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Solver(format!("HTTP {status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BotError::Solver(format!("unexpected response body: {e}")))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| BotError::Solver("response contained no answer".to_string()))?;

        info!(answer_chars = answer.chars().count(), "Solution received");
        Ok(answer)
    }
}

/// Build the solver selected by configuration
pub fn build_solver(config: &Config) -> Arc<dyn Solver> {
    match config.solver_backend {
        SolverBackend::Placeholder => Arc::new(PlaceholderSolver),
        SolverBackend::OpenAi => Arc::new(OpenAiSolver::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        )),
    }
}
