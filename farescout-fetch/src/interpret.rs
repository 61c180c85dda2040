//! Language-model query interpreter.
//!
//! Sends the query to a local Ollama server and reads the two cities and the
//! date out of the model's answer. When the server is unreachable or the
//! answer is unusable, the pattern interpreter answers instead.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use farescout_core::{
    AirportCode, AirportTable, FlightQuery, InterpretError, PatternInterpreter, QueryInterpreter,
};

/// Where a local Ollama server listens.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model asked by default.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3:8b";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

static ORIGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)origin_city["'\s:]+([a-z](?:[a-z ]*?[a-z])?)\s*(?:["',}\n]|$|destination|date)"#,
    )
    .expect("Invalid regex")
});

static DESTINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)destination_city["'\s:]+([a-z](?:[a-z ]*?[a-z])?)\s*(?:["',}\n]|$|date|origin)"#,
    )
    .expect("Invalid regex")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("Invalid regex"));

/// Builds the extraction prompt for `query`.
pub fn build_prompt(query: &str, today: NaiveDate) -> String {
    format!(
        "You are a flight data extraction API. Current Date: {today}\n\
         Extract origin_city, destination_city, and date (YYYY-MM-DD).\n\
         User Query: \"{query}\"\n\
         Output Format:\n\
         origin_city: \"City Name\"\n\
         destination_city: \"City Name\"\n\
         date: \"YYYY-MM-DD\"\n",
        today = today.format("%Y-%m-%d"),
    )
}

// ============================================================================
// Ollama wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

// ============================================================================
// Ollama Interpreter
// ============================================================================

/// A [`QueryInterpreter`] that asks a local language model.
#[derive(Debug, Clone)]
pub struct OllamaInterpreter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
    airports: Arc<AirportTable>,
    fallback: PatternInterpreter,
    today: Option<NaiveDate>,
}

impl OllamaInterpreter {
    /// Creates an interpreter talking to the default local server.
    pub fn new(airports: Arc<AirportTable>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            fallback: PatternInterpreter::new(Arc::clone(&airports)),
            airports,
            today: None,
        }
    }

    /// Uses another server.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Uses another model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets how long one model call may take.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pins "today" to a fixed date, for the prompt and the fallback alike.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self.fallback = self.fallback.with_today(today);
        self
    }

    /// The model asked.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    async fn ask(&self, prompt: &str) -> Result<String, InterpretError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url.trim_end_matches('/')))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| InterpretError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InterpretError::Backend(format!("HTTP {status}: {body}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| InterpretError::Backend(format!("Unreadable reply: {e}")))?;
        Ok(reply.message.content)
    }

    /// Reads a model answer in the prompt's output format.
    ///
    /// Quotes, extra prose and JSON-style punctuation around the fields are
    /// tolerated. Cities go through the airport table.
    ///
    /// # Errors
    ///
    /// Returns an [`InterpretError`] naming the first field that is missing
    /// or unusable.
    pub fn read_reply(&self, reply: &str, raw_query: &str) -> Result<FlightQuery, InterpretError> {
        let origin = capture_city(&ORIGIN_RE, reply)
            .and_then(|city| self.resolve(city))
            .ok_or_else(|| InterpretError::MissingOrigin(raw_query.to_string()))?;
        let destination = capture_city(&DESTINATION_RE, reply)
            .and_then(|city| self.resolve(city))
            .ok_or_else(|| InterpretError::MissingDestination(raw_query.to_string()))?;
        if origin == destination {
            return Err(InterpretError::SameAirport(origin.to_string()));
        }

        let date = DATE_RE
            .captures(reply)
            .and_then(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok())
            .ok_or_else(|| InterpretError::MissingDate(raw_query.to_string()))?;

        Ok(FlightQuery::new(origin, destination, date, raw_query))
    }

    fn resolve(&self, city: &str) -> Option<AirportCode> {
        self.airports.resolve_code(city).ok()
    }
}

fn capture_city<'a>(re: &Regex, reply: &'a str) -> Option<&'a str> {
    re.captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|city| !city.is_empty())
}

impl QueryInterpreter for OllamaInterpreter {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn interpret(&self, text: &str) -> Result<FlightQuery, InterpretError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InterpretError::Empty);
        }

        let prompt = build_prompt(trimmed, self.today());
        let answer = self
            .ask(&prompt)
            .await
            .and_then(|reply| self.read_reply(&reply, trimmed));

        match answer {
            Ok(query) => {
                debug!(route = %query.describe(), "Model interpreted query");
                Ok(query)
            }
            Err(e) => {
                warn!(error = %e, "Model interpretation failed, using patterns");
                self.fallback.parse(trimmed)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
