//! # Fallback Assessor
//!
//! OpenAI-compatible chat-completions client used as the expensive second
//! opinion. The model is asked for a JSON object; anything it returns that
//! cannot be read as one becomes an `Unknown` verdict here, so the merger
//! never sees malformed output.

use super::{AdapterError, FallbackAssessor, USER_AGENT, check_status};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use verisift_core::{Confidence, FallbackLabel, FallbackVerdict, VerisiftError};

const SYSTEM_PROMPT: &str = "You are an expert fact-checker and credibility analyst. \
Your task is to analyze a given text and determine if it is \"Real\" or \"Fake\" news. \
You must respond ONLY with a valid JSON object that follows this exact structure: \
{\"verdict\": \"Real\" or \"Fake\", \
\"confidence\": <an integer between 0 and 100 representing your confidence>, \
\"explanation\": \"A concise, detailed explanation for your verdict.\", \
\"key_indicators\": [\"A list of 3-4 key phrases or reasons that led to your conclusion\"]} \
Do not include any text, greetings, or markdown before or after the JSON object.";

/// Chat-completions backed assessor.
pub struct OpenAiAssessor {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAssessor {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VerisiftError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VerisiftError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl FallbackAssessor for OpenAiAssessor {
    async fn assess(&self, text: &str) -> Result<FallbackVerdict, AdapterError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("Please analyze this text: \"{text}\"") },
            ],
            "response_format": { "type": "json_object" },
        });

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        // The envelope itself is the provider's contract; only its content is lenient.
        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AdapterError::Malformed(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(parse_assessment(&content))
    }
}

/// Read the model's JSON answer, normalising anything unusable to `Unknown`.
pub fn parse_assessment(content: &str) -> FallbackVerdict {
    let value: Value = match serde_json::from_str(content.trim()) {
        Ok(v @ Value::Object(_)) => v,
        Ok(_) | Err(_) => {
            tracing::warn!("Fallback model returned non-object output");
            return FallbackVerdict::unknown("Fallback model returned an unreadable answer.");
        }
    };

    let verdict = value
        .get("verdict")
        .and_then(Value::as_str)
        .map_or(FallbackLabel::Unknown, FallbackLabel::parse_lenient);

    // Models sometimes quote the number or send a float.
    let confidence = match value.get("confidence") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map_or(Confidence::zero(), Confidence::clamped),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_or(Confidence::zero(), Confidence::clamped),
        _ => Confidence::zero(),
    };

    let explanation = value
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or("Analysis incomplete.")
        .to_string();

    let key_indicators = value
        .get("key_indicators")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if verdict == FallbackLabel::Unknown {
        return FallbackVerdict::new(
            FallbackLabel::Unknown,
            Confidence::zero(),
            explanation,
            key_indicators,
        );
    }
    FallbackVerdict::new(verdict, confidence, explanation, key_indicators)
}

/// Used when no API key is configured.
pub struct DisabledAssessor;

#[async_trait]
impl FallbackAssessor for DisabledAssessor {
    async fn assess(&self, _text: &str) -> Result<FallbackVerdict, AdapterError> {
        Err(AdapterError::Unavailable(
            "Fallback model is not configured".to_string(),
        ))
    }
}
