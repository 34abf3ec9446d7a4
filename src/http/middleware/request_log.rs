//! Request Log Middleware.
//! Records one audit entry per request, including panicking ones.

use axum::{
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::{header::USER_AGENT, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use crate::audit::AuditLog;
use crate::config::RequestLogConfig;
use crate::http::error::{ApiError, ErrorMessage};
use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::observer::{truncate_body, Fault, RequestRecord};
use crate::security::CallerSlot;

#[derive(Clone)]
pub struct RequestLogState {
    pub audit: AuditLog,
    pub config: Arc<RequestLogConfig>,
    /// Upper bound when buffering a body for capture.
    pub body_limit: usize,
}

impl RequestLogState {
    fn is_excluded(&self, path: &str) -> bool {
        !self.config.enabled || self.config.exclude_paths.iter().any(|p| p == path)
    }
}

pub async fn request_log_middleware(
    State(state): State<RequestLogState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();

    if state.is_excluded(req.uri().path()) {
        return next.run(req).await;
    }

    let slot = CallerSlot::default();
    req.extensions_mut().insert(slot.clone());

    let mut record = RequestRecord {
        method: req.method().to_string(),
        url: req.uri().to_string(),
        request_id: req.request_id(),
        user_agent: req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        ip: req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string()),
        query: query_map(&req),
        ..Default::default()
    };

    if state.config.include_body && [Method::POST, Method::PUT, Method::PATCH].contains(req.method()) {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, state.body_limit).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Request body rejected while capturing");
                let response = ApiError::PayloadTooLarge.into_response();
                finish(&state, record, &response, start);
                return response;
            }
        };
        if !bytes.is_empty() {
            record.body = Some(truncate_body(
                &String::from_utf8_lossy(&bytes),
                state.config.max_body_size,
            ));
        }
        req = Request::from_parts(parts, Body::from(bytes));
    }

    let response = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let fault = Fault::from_panic(payload.as_ref());
            tracing::error!(
                method = %record.method,
                url = %record.url,
                error = %fault.message,
                "Handler panicked"
            );
            let response = ApiError::Internal(fault.message.clone()).into_response();
            record.fault = Some(fault);
            response
        }
    };

    record.caller = slot.get();
    finish(&state, record, &response, start);
    response
}

fn finish(state: &RequestLogState, mut record: RequestRecord, response: &Response, start: Instant) {
    record.status = response.status().as_u16();
    record.duration = start.elapsed();
    if record.status >= 400 {
        record.error = response
            .extensions()
            .get::<ErrorMessage>()
            .map(|ErrorMessage(message)| message.clone());
    }

    metrics::record_request(&record.method, record.status, start);
    state
        .audit
        .append(record.level(), record.message(), record.meta());
}

fn query_map(req: &Request<Body>) -> Map<String, Value> {
    Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .map(|Query(params)| {
            params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect()
        })
        .unwrap_or_default()
}
