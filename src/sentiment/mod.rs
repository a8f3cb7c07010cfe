pub mod client;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use client::{AnalyzeError, Analyzer, HttpAnalyzer};

/// Backend model the server should run the text through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    #[default]
    Custom,
    Llama,
}

impl Model {
    /// Selector order
    pub const ALL: [Model; 2] = [Model::Custom, Model::Llama];

    /// Wire identifier sent in the request body
    pub fn id(self) -> &'static str {
        match self {
            Model::Custom => "custom",
            Model::Llama => "llama",
        }
    }

    /// Human-readable option label
    pub fn label(self) -> &'static str {
        match self {
            Model::Custom => "Custom Model",
            Model::Llama => "Llama 3",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Model::Custom => Model::Llama,
            Model::Llama => Model::Custom,
        }
    }

    pub fn prev(self) -> Self {
        // Two options, so prev and next coincide
        self.next()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Body of the outbound POST
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    pub model: Model,
}

/// Response body as returned by the server, kept verbatim.
///
/// The server is expected to answer with `sentiment` and optionally
/// `confidence_score`, but nothing is validated: whatever arrives is
/// what gets rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentResult(Value);

impl SentimentResult {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// Result shown when a request did not succeed
    pub fn error_sentinel() -> Self {
        Self(serde_json::json!({
            "sentiment": "Error",
            "confidence_score": 0,
        }))
    }

    /// The raw body
    pub fn body(&self) -> &Value {
        &self.0
    }

    /// Sentiment label for display; empty when the field is missing
    pub fn sentiment(&self) -> String {
        self.0.get("sentiment").map(render_value).unwrap_or_default()
    }

    /// Confidence score for display, `None` when the key is absent
    pub fn confidence_score(&self) -> Option<String> {
        self.0.get("confidence_score").map(render_value)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
