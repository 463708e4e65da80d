//! Classifier configuration.
//!
//! Built once per process from `PANTRY_CLASSIFIER*` environment variables
//! and handed to [`crate::create_classifier`]. Nothing reads the
//! environment per call.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use pantry_core::defaults::{
    CLASSIFIER_TIMEOUT_SECS, CLASSIFIER_WARMUP_BACKOFF_MS, CLASSIFIER_WARMUP_RETRIES,
    CLASSIFIER_WARMUP_RETRIES_MAX, EMBEDDING_CONFIDENCE_THRESHOLD, EMBEDDING_MODEL,
    GENERATIVE_CONFIDENCE_THRESHOLD, GENERATIVE_MODEL, OPENAI_URL,
    ZERO_SHOT_CONFIDENCE_THRESHOLD, ZERO_SHOT_MODEL, ZERO_SHOT_URL,
};
use pantry_core::{Error, Result};

/// Which classifier implementation backs the classifier tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierKind {
    /// No external classifier; the tier is skipped.
    #[default]
    Disabled,
    /// Prompted chat completion, answer validated against the candidates.
    Generative,
    /// Zero-shot classification endpoint returning ranked labels.
    ZeroShot,
    /// Embedding cosine similarity between item and candidate names.
    Embedding,
}

impl ClassifierKind {
    /// Stable identifier, also accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Generative => "generative",
            Self::ZeroShot => "zero_shot",
            Self::Embedding => "embedding",
        }
    }

    /// Acceptance threshold tuned to the method's score distribution.
    pub fn default_threshold(&self) -> f32 {
        match self {
            Self::Generative => GENERATIVE_CONFIDENCE_THRESHOLD,
            Self::ZeroShot | Self::Disabled => ZERO_SHOT_CONFIDENCE_THRESHOLD,
            Self::Embedding => EMBEDDING_CONFIDENCE_THRESHOLD,
        }
    }

    fn default_url(&self) -> &'static str {
        match self {
            Self::ZeroShot => ZERO_SHOT_URL,
            _ => OPENAI_URL,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Generative | Self::Disabled => GENERATIVE_MODEL,
            Self::ZeroShot => ZERO_SHOT_MODEL,
            Self::Embedding => EMBEDDING_MODEL,
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "" | "disabled" | "none" | "off" => Ok(Self::Disabled),
            "generative" | "llm" => Ok(Self::Generative),
            "zero_shot" | "zeroshot" => Ok(Self::ZeroShot),
            "embedding" | "embeddings" => Ok(Self::Embedding),
            other => Err(Error::Config(format!(
                "Unknown classifier '{}'. Valid: disabled, generative, zero_shot, embedding",
                other
            ))),
        }
    }
}

/// Configuration for one external classifier.
#[derive(Clone)]
pub struct ClassifierConfig {
    /// Implementation to construct.
    pub kind: ClassifierKind,
    /// Endpoint base URL (no trailing path).
    pub base_url: String,
    /// Bearer credential. `None` makes the classifier unavailable.
    pub token: Option<String>,
    /// Model identifier sent to the endpoint.
    pub model: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after a warming-up answer.
    pub warmup_retries: u32,
    /// Delay between warm-up retries.
    pub warmup_backoff: Duration,
    /// Overrides the kind's default acceptance threshold.
    pub confidence_threshold: Option<f32>,
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("warmup_retries", &self.warmup_retries)
            .field("warmup_backoff", &self.warmup_backoff)
            .field("confidence_threshold", &self.confidence_threshold)
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::for_kind(ClassifierKind::Disabled)
    }
}

impl ClassifierConfig {
    /// Defaults for `kind`, without a credential.
    pub fn for_kind(kind: ClassifierKind) -> Self {
        Self {
            kind,
            base_url: kind.default_url().to_string(),
            token: None,
            model: kind.default_model().to_string(),
            timeout: Duration::from_secs(CLASSIFIER_TIMEOUT_SECS),
            warmup_retries: CLASSIFIER_WARMUP_RETRIES,
            warmup_backoff: Duration::from_millis(CLASSIFIER_WARMUP_BACKOFF_MS),
            confidence_threshold: None,
        }
    }

    /// Set the endpoint base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set warm-up retry count (capped) and backoff.
    pub fn with_warmup(mut self, retries: u32, backoff: Duration) -> Self {
        self.warmup_retries = retries.min(CLASSIFIER_WARMUP_RETRIES_MAX);
        self.warmup_backoff = backoff;
        self
    }

    /// Override the acceptance threshold.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    /// Threshold in effect: the override if set, else the kind's default.
    pub fn threshold(&self) -> f32 {
        self.confidence_threshold
            .unwrap_or_else(|| self.kind.default_threshold())
    }

    /// Whether a non-empty credential is configured.
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `PANTRY_CLASSIFIER` | `disabled` |
    /// | `PANTRY_CLASSIFIER_TOKEN` | unset (classifier unavailable) |
    /// | `PANTRY_CLASSIFIER_URL` | per kind |
    /// | `PANTRY_CLASSIFIER_MODEL` | per kind |
    /// | `PANTRY_CLASSIFIER_TIMEOUT_SECS` | 8 |
    /// | `PANTRY_CLASSIFIER_WARMUP_RETRIES` | 2 (max 5) |
    /// | `PANTRY_CONFIDENCE_THRESHOLD` | per kind |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let kind: ClassifierKind = lookup("PANTRY_CLASSIFIER")
            .unwrap_or_default()
            .parse()?;
        let mut config = Self::for_kind(kind);

        config.token = lookup("PANTRY_CLASSIFIER_TOKEN").filter(|t| !t.trim().is_empty());
        if let Some(url) = lookup("PANTRY_CLASSIFIER_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(model) = lookup("PANTRY_CLASSIFIER_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model;
        }
        if let Some(secs) = lookup("PANTRY_CLASSIFIER_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("PANTRY_CLASSIFIER_TIMEOUT_SECS '{}' is not a number", secs))
            })?;
            if secs == 0 {
                return Err(Error::Config(
                    "PANTRY_CLASSIFIER_TIMEOUT_SECS must be at least 1".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = lookup("PANTRY_CLASSIFIER_WARMUP_RETRIES") {
            let retries: u32 = retries.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "PANTRY_CLASSIFIER_WARMUP_RETRIES '{}' is not a number",
                    retries
                ))
            })?;
            config.warmup_retries = retries.min(CLASSIFIER_WARMUP_RETRIES_MAX);
        }
        if let Some(threshold) = lookup("PANTRY_CONFIDENCE_THRESHOLD") {
            config.confidence_threshold = Some(parse_threshold(&threshold)?);
        }

        debug!(
            classifier = %config.kind,
            model = %config.model,
            has_token = config.has_token(),
            threshold = config.threshold(),
            "Classifier configuration loaded"
        );
        Ok(config)
    }
}

fn parse_threshold(raw: &str) -> Result<f32> {
    let value: f32 = raw.trim().parse().map_err(|_| {
        Error::Config(format!("PANTRY_CONFIDENCE_THRESHOLD '{}' is not a number", raw))
    })?;
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::Config(format!(
            "PANTRY_CONFIDENCE_THRESHOLD must be within [0, 1], got {}",
            value
        )));
    }
    Ok(value)
}
