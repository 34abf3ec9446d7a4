//! One observed request and its audit representation.

use serde_json::{json, Map, Value};
use std::any::Any;
use std::time::Duration;

use crate::domain::AuditLevel;
use crate::security::Caller;

/// Unhandled failure raised while serving a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub name: String,
    pub message: String,
}

impl Fault {
    /// Build a fault from a caught panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        Self {
            name: "panic".to_string(),
            message,
        }
    }
}

/// Everything the observer learned about a finished request.
#[derive(Debug, Clone, Default)]
pub struct RequestRecord {
    pub method: String,
    /// Path plus query string, as requested.
    pub url: String,
    pub status: u16,
    pub duration: Duration,
    pub request_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub query: Map<String, Value>,
    pub body: Option<String>,
    pub caller: Option<Caller>,
    /// Error message reported by the handler for 4xx/5xx answers.
    pub error: Option<String>,
    pub fault: Option<Fault>,
}

impl RequestRecord {
    pub fn level(&self) -> AuditLevel {
        if self.fault.is_some() {
            AuditLevel::Error
        } else {
            AuditLevel::from_status(self.status)
        }
    }

    pub fn message(&self) -> String {
        match &self.fault {
            Some(fault) => format!("ERROR: {} {} - {}", self.method, self.url, fault.message),
            None => format!("{} {} - {}", self.method, self.url, self.status),
        }
    }

    pub fn meta(&self) -> Value {
        let millis = self.duration.as_millis() as u64;
        let mut meta = json!({
            "method": self.method,
            "url": self.url,
            "statusCode": self.status,
            "duration": format!("{millis}ms"),
            "durationMs": millis,
            "requestId": self.request_id,
            "userAgent": self.user_agent,
            "ip": self.ip,
            "query": Value::Object(self.query.clone()),
        });

        if let Some(caller) = &self.caller {
            meta["userId"] = json!(caller.subject);
            meta["userEmail"] = json!(caller.email);
        }
        if let Some(body) = &self.body {
            meta["body"] = json!(body);
        }
        match (&self.fault, &self.error) {
            (Some(fault), _) => {
                meta["error"] = json!({ "name": fault.name, "message": fault.message });
            }
            (None, Some(error)) => meta["error"] = json!(error),
            (None, None) => {}
        }
        meta
    }
}

/// Cut `body` to `max` characters, marking the cut with `...`.
pub fn truncate_body(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
