//! Access Control Middleware.
//! Resolves bearer tokens to caller identities.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::config::AuthConfig;
use crate::http::error::ApiError;

/// Verified identity attached to authenticated requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Subject id, recorded as `createdBy` / `actorId`.
    pub subject: String,
    pub email: Option<String>,
}

/// Slot the request observer places in the request so it can learn who the
/// caller was after the inner layers have consumed the request.
#[derive(Clone, Default, Debug)]
pub struct CallerSlot(Arc<OnceLock<Caller>>);

impl CallerSlot {
    pub fn fill(&self, caller: Caller) {
        let _ = self.0.set(caller);
    }

    pub fn get(&self) -> Option<Caller> {
        self.0.get().cloned()
    }
}

/// State required for access control.
#[derive(Clone, Default)]
pub struct AccessControlState {
    tokens: Arc<HashMap<String, Caller>>,
}

impl AccessControlState {
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|t| {
                (
                    t.token.clone(),
                    Caller {
                        subject: t.subject.clone(),
                        email: t.email.clone(),
                    },
                )
            })
            .collect();
        Self {
            tokens: Arc::new(tokens),
        }
    }

    /// Resolve an `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Option<Caller> {
        let token = header?.strip_prefix("Bearer ")?.trim();
        self.tokens.get(token).cloned()
    }
}

pub async fn access_control_middleware(
    State(state): State<AccessControlState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    match state.authenticate(header) {
        Some(caller) => {
            if let Some(slot) = req.extensions().get::<CallerSlot>() {
                slot.fill(caller.clone());
            }
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "Rejected unauthenticated request");
            ApiError::Unauthorized.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;

    fn state() -> AccessControlState {
        AccessControlState::from_config(&AuthConfig {
            tokens: vec![TokenConfig {
                token: "secret".into(),
                subject: "user-1".into(),
                email: Some("desk@example.com".into()),
            }],
        })
    }

    #[test]
    fn test_authenticate() {
        let state = state();
        let caller = state.authenticate(Some("Bearer secret")).unwrap();
        assert_eq!(caller.subject, "user-1");
        assert_eq!(caller.email.as_deref(), Some("desk@example.com"));

        assert!(state.authenticate(None).is_none());
        assert!(state.authenticate(Some("secret")).is_none());
        assert!(state.authenticate(Some("Bearer wrong")).is_none());
    }

    #[test]
    fn test_slot_keeps_first_caller() {
        let slot = CallerSlot::default();
        assert!(slot.get().is_none());
        slot.fill(Caller { subject: "a".into(), email: None });
        slot.clone().fill(Caller { subject: "b".into(), email: None });
        assert_eq!(slot.get().unwrap().subject, "a");
    }
}
