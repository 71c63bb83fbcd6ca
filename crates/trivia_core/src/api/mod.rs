//! Transport-neutral request boundary.
//!
//! # Responsibility
//! - Accept method/path/body requests and return status + JSON envelopes.
//! - Run the optional [`auth::AuthGuard`] uniformly before every handler.
//! - Translate service results into status codes; nothing below this module
//!   knows about status codes.
//!
//! # Invariants
//! - Every response body carries `success`.
//! - Dispatch never panics; unexpected failures become `500`.

pub mod auth;
pub mod error;
mod routes;

use crate::api::auth::AuthGuard;
use crate::api::error::ApiError;
use crate::repo::category_repo::CategoryRepository;
use crate::repo::question_repo::QuestionRepository;
use crate::service::trivia_service::TriviaService;
use log::{info, warn};
use rand::Rng;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Request method understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
}

impl ApiRequest {
    /// Builds a request from a target such as `/questions?page=2`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, raw_query) = target.split_once('?').unwrap_or((target, ""));
        let query = raw_query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key.to_string(), value.to_string())
            })
            .collect();

        Self {
            method,
            path: path.to_string(),
            query,
            body: None,
            authorization: None,
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: &str, body: Value) -> Self {
        Self::new(Method::Post, target).with_body(body)
    }

    pub fn delete(target: &str) -> Self {
        Self::new(Method::Delete, target)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

/// Outbound response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<ApiError> for ApiResponse {
    fn from(value: ApiError) -> Self {
        Self {
            status: value.status,
            body: value.to_body(),
        }
    }
}

/// Routes requests to trivia use cases.
pub struct Dispatcher<'svc, Q: QuestionRepository, C: CategoryRepository> {
    service: &'svc TriviaService<Q, C>,
    guard: Option<AuthGuard>,
}

impl<'svc, Q: QuestionRepository, C: CategoryRepository> Dispatcher<'svc, Q, C> {
    /// Creates an unguarded dispatcher.
    pub fn new(service: &'svc TriviaService<Q, C>) -> Self {
        Self {
            service,
            guard: None,
        }
    }

    /// Requires every request to pass `guard` for its route's permission.
    pub fn with_guard(mut self, guard: AuthGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Handles one request, drawing quiz randomness from `rng`.
    pub fn dispatch<R>(&self, request: &ApiRequest, rng: &mut R) -> ApiResponse
    where
        R: Rng + ?Sized,
    {
        let started_at = Instant::now();
        let response = match self.try_dispatch(request, rng) {
            Ok(body) => ApiResponse::ok(body),
            Err(err) => {
                if err.status >= 500 {
                    warn!(
                        "event=api_dispatch module=api status=error method={} path={} code={} error={}",
                        request.method, request.path, err.status, err.detail
                    );
                }
                ApiResponse::from(err)
            }
        };

        info!(
            "event=api_dispatch module=api status=done method={} path={} code={} duration_ms={}",
            request.method,
            request.path,
            response.status,
            started_at.elapsed().as_millis()
        );
        response
    }

    fn try_dispatch<R>(&self, request: &ApiRequest, rng: &mut R) -> Result<Value, ApiError>
    where
        R: Rng + ?Sized,
    {
        let route = routes::match_route(&request.path)
            .ok_or_else(|| ApiError::not_found(format!("no route for `{}`", request.path)))?;
        let permission = route.required_permission(request.method).ok_or_else(|| {
            ApiError::method_not_allowed(format!("{} {}", request.method, request.path))
        })?;

        if let Some(guard) = &self.guard {
            guard.authorize(request.authorization.as_deref(), permission)?;
        }

        routes::handle(self.service, route, request, rng)
    }
}
