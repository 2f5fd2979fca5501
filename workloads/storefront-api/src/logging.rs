//! Structured request logging.
//!
//! One JSON line per event on stderr, which Spin captures per component.
//! Each request gets a logger carrying the request id and route so every
//! line from that request correlates.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// A single log line.
#[derive(Debug, Serialize)]
struct LogEntry {
    level: LogLevel,
    message: String,
    request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(flatten)]
    fields: HashMap<String, serde_json::Value>,
    /// Microseconds since the logger was created.
    elapsed_us: u128,
}

impl LogEntry {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"level":"error","message":"log serialization failed","request_id":"{}"}}"#,
                self.request_id
            )
        })
    }
}

/// Per-request structured logger.
pub struct RequestLogger {
    request_id: String,
    route: Option<String>,
    method: Option<String>,
    start: Instant,
    min_level: LogLevel,
}

impl RequestLogger {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            route: None,
            method: None,
            start: Instant::now(),
            min_level: LogLevel::Info,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Microseconds since this logger was created.
    pub fn elapsed_us(&self) -> u128 {
        self.start.elapsed().as_micros()
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, &[]);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, &[]);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, &[]);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, &[]);
    }

    pub fn info_with(&self, message: &str, fields: &[(&str, &dyn fmt::Debug)]) {
        self.log(LogLevel::Info, message, fields);
    }

    pub fn warn_with(&self, message: &str, fields: &[(&str, &dyn fmt::Debug)]) {
        self.log(LogLevel::Warn, message, fields);
    }

    pub fn error_with(&self, message: &str, fields: &[(&str, &dyn fmt::Debug)]) {
        self.log(LogLevel::Error, message, fields);
    }

    fn log(&self, level: LogLevel, message: &str, fields: &[(&str, &dyn fmt::Debug)]) {
        if level < self.min_level {
            return;
        }

        let fields: HashMap<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    serde_json::Value::String(format!("{:?}", v)),
                )
            })
            .collect();

        let entry = LogEntry {
            level,
            message: message.to_string(),
            request_id: self.request_id.clone(),
            route: self.route.clone(),
            method: self.method.clone(),
            fields,
            elapsed_us: self.elapsed_us(),
        };

        eprintln!("{}", entry.to_json());
    }
}

/// Generate a request id from the clock and a random word.
pub fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let entropy: u64 = rand::random();

    format!("req_{:011x}{:08x}", timestamp, entropy as u32)
}
