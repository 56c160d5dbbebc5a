use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::Config;
use crate::models::Role;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("request to Gemini failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid Gemini endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed Gemini response: {0}")]
    MalformedResponse(String),
}

/// One piece of a turn: plain text or base64 inline bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: String },
}

impl Part {
    fn to_json(&self) -> Value {
        match self {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineData { mime_type, data } => json!({
                "inlineData": {
                    "mimeType": mime_type,
                    "data": data
                }
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Default)]
pub struct ContentRequest {
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    /// When set, the reply is constrained to JSON matching this schema.
    pub response_schema: Option<Value>,
}

impl ContentRequest {
    pub fn to_json(&self) -> Value {
        let contents = self
            .contents
            .iter()
            .map(|content| {
                json!({
                    "role": content.role.as_str(),
                    "parts": content.parts.iter().map(Part::to_json).collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let mut body = Map::new();
        body.insert("contents".to_string(), Value::Array(contents));

        if let Some(instruction) = &self.system_instruction {
            body.insert(
                "systemInstruction".to_string(),
                json!({ "parts": [{ "text": instruction }] }),
            );
        }

        if let Some(schema) = &self.response_schema {
            body.insert(
                "generationConfig".to_string(),
                json!({
                    "responseMimeType": "application/json",
                    "responseSchema": schema
                }),
            );
        }

        Value::Object(body)
    }
}

/// Body of an Imagen `predict` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub number_of_images: u32,
    pub aspect_ratio: String,
    pub mime_type: String,
}

impl ImageRequest {
    pub fn to_json(&self) -> Value {
        json!({
            "instances": [{ "prompt": self.prompt }],
            "parameters": {
                "sampleCount": self.number_of_images,
                "aspectRatio": self.aspect_ratio,
                "outputOptions": { "mimeType": self.mime_type }
            }
        })
    }
}

/// A generated image still in its base64 wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// The two provider calls everything else is built on.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Returns the concatenated text of the first candidate, possibly empty.
    async fn generate_content(&self, request: &ContentRequest) -> Result<String, GeminiError>;

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<InlineImage>, GeminiError>;
}

pub struct GeminiClient {
    api_key: String,
    api_base: String,
    text_model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> Result<Url, GeminiError> {
        let mut url = Url::parse(&format!("{}/models/{}:{}", self.api_base, model, method))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn post(&self, url: Url, body: &Value) -> Result<Value, GeminiError> {
        debug!(
            "Sending request to {}: {}",
            url.path(),
            pretty(&elide_inline_data(body.clone()))
        );

        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("API request failed with status {}: {}", status, body);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response.json().await?;
        debug!(
            "Received response from Gemini API: {}",
            pretty(&elide_inline_data(response_json.clone()))
        );
        Ok(response_json)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_content(&self, request: &ContentRequest) -> Result<String, GeminiError> {
        let url = self.endpoint(&self.text_model, "generateContent")?;
        let response = self.post(url, &request.to_json()).await?;
        extract_text(&response)
    }

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<InlineImage>, GeminiError> {
        let url = self.endpoint(&self.image_model, "predict")?;
        let response = self.post(url, &request.to_json()).await?;
        extract_images(&response, &request.mime_type)
    }
}

/// Pull the reply text out of a `generateContent` response.
pub fn extract_text(response: &Value) -> Result<String, GeminiError> {
    if let Some(reason) = response
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        warn!("Prompt was blocked: {}", reason);
        return Ok(String::new());
    }

    let candidates = response
        .get("candidates")
        .and_then(Value::as_array)
        .ok_or_else(|| GeminiError::MalformedResponse("missing candidates".to_string()))?;

    let Some(first_candidate) = candidates.first() else {
        return Ok(String::new());
    };

    if let Some(reason) = first_candidate.get("finishReason").and_then(Value::as_str) {
        if reason != "STOP" {
            warn!("Candidate finished with reason {}", reason);
        }
    }

    let mut result = String::new();
    if let Some(parts) = first_candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
    {
        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                result.push_str(text);
            }
        }
    }

    Ok(result)
}

/// Pull the generated images out of an Imagen `predict` response.
pub fn extract_images(response: &Value, default_mime: &str) -> Result<Vec<InlineImage>, GeminiError> {
    let predictions = response
        .get("predictions")
        .and_then(Value::as_array)
        .ok_or_else(|| GeminiError::MalformedResponse("missing predictions".to_string()))?;

    let images = predictions
        .iter()
        .filter_map(|prediction| {
            let data = prediction.get("bytesBase64Encoded").and_then(Value::as_str)?;
            let mime_type = prediction
                .get("mimeType")
                .and_then(Value::as_str)
                .unwrap_or(default_mime);
            Some(InlineImage {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            })
        })
        .collect();

    Ok(images)
}

/// Replace base64 payloads with their length so debug logs stay readable.
fn elide_inline_data(mut value: Value) -> Value {
    fn walk(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    let is_payload = key == "bytesBase64Encoded"
                        || (key == "data" && child.is_string());
                    if is_payload {
                        let len = child.as_str().map(str::len).unwrap_or(0);
                        *child = Value::String(format!("<{} base64 bytes>", len));
                    } else {
                        walk(child);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(walk),
            _ => {}
        }
    }

    walk(&mut value);
    value
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
