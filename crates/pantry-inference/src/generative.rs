//! Prompt-based classifier over an OpenAI-compatible chat endpoint.
//!
//! The model is asked to answer with one category name from the list. Its
//! free-text answer is never trusted: it is matched back against the
//! candidates and anything that does not resolve to exactly one candidate is
//! discarded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pantry_core::{ClassificationRequest, ClassificationResult, ItemClassifier, Result};

use crate::config::ClassifierConfig;
use crate::http::ClassifierHttp;

/// Confidence for an answer that equals a candidate name.
pub const EXACT_ANSWER_CONFIDENCE: f32 = 1.0;

/// Confidence for an answer that mentions exactly one candidate name.
pub const CONTAINED_ANSWER_CONFIDENCE: f32 = 0.6;

const SYSTEM_PROMPT: &str = "You sort shopping list items into categories. \
Reply with exactly one category name from the list and nothing else.";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Render the user prompt for one item.
pub fn build_prompt(request: &ClassificationRequest) -> String {
    format!(
        "Categories: {}\nItem: {}\nCategory:",
        request.candidates.join(", "),
        request.item.trim()
    )
}

/// Map a raw model answer onto the request's candidates.
pub fn interpret_answer(raw: &str, request: &ClassificationRequest) -> ClassificationResult {
    let answer = raw.trim().trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '"' | '\'' | '.' | '`' | '*')
    });
    if answer.is_empty() {
        return ClassificationResult::none();
    }

    if let Some(candidate) = request.candidate(answer) {
        return ClassificationResult::answer(candidate, EXACT_ANSWER_CONFIDENCE);
    }

    let lower = answer.to_lowercase();
    let mut mentioned = request
        .candidates
        .iter()
        .filter(|c| !c.is_empty() && mentions_whole(&lower, &c.to_lowercase()));
    match (mentioned.next(), mentioned.next()) {
        (Some(only), None) => ClassificationResult::answer(only, CONTAINED_ANSWER_CONFIDENCE),
        _ => ClassificationResult::none(),
    }
}

/// True when `needle` occurs in `haystack` and is not part of a longer word.
fn mentions_whole(haystack: &str, needle: &str) -> bool {
    let is_word = |c: Option<char>| c.is_some_and(char::is_alphanumeric);
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !is_word(before) && !is_word(after)
    })
}

/// Chat-completion classifier.
pub struct GenerativeClassifier {
    http: ClassifierHttp,
    model: String,
    threshold: f32,
}

impl GenerativeClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let http = ClassifierHttp::new(config)?;
        info!(
            subsystem = "inference",
            component = "generative",
            url = %config.base_url,
            model = %config.model,
            available = http.has_token(),
            "Initializing generative classifier"
        );
        Ok(Self {
            http,
            model: config.model.clone(),
            threshold: config.threshold(),
        })
    }

    async fn complete(&self, request: &ClassificationRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(request),
                },
            ],
            temperature: 0.0,
            max_tokens: 20,
        };

        let response: ChatCompletionResponse =
            self.http.post_json("/chat/completions", &body).await?;
        Ok(response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl ItemClassifier for GenerativeClassifier {
    fn name(&self) -> &str {
        "generative"
    }

    fn is_available(&self) -> bool {
        self.http.has_token()
    }

    fn confidence_threshold(&self) -> f32 {
        self.threshold
    }

    async fn classify(&self, request: &ClassificationRequest) -> ClassificationResult {
        if !self.is_available() || request.candidates.is_empty() {
            return ClassificationResult::none();
        }

        match self.complete(request).await {
            Ok(raw) => {
                let result = interpret_answer(&raw, request);
                debug!(
                    subsystem = "inference",
                    component = "generative",
                    raw_answer = %raw,
                    category = ?result.category,
                    confidence = result.confidence,
                    "Generative answer interpreted"
                );
                result
            }
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "generative",
                    op = "classify",
                    error = %e,
                    "Generative classifier failed, no answer"
                );
                ClassificationResult::none()
            }
        }
    }
}
