//! Permission guard applied before request dispatch.
//!
//! # Responsibility
//! - Declare the permission strings routes can require.
//! - Parse bearer credentials and check verified claims against a route's
//!   required permission.
//!
//! # Invariants
//! - Token verification is delegated to a [`TokenVerifier`]; this module
//!   never inspects token contents itself.
//! - Missing or malformed credentials are `401`; a verified token without the
//!   required permission is `403`.
//! - Permission strings are matched exactly (case-sensitive).

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Permission a route may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    GetCategories,
    GetQuestions,
    PostQuestions,
    DeleteQuestions,
    PostQuizzes,
}

/// Permission string for listing categories.
pub const PERMISSION_GET_CATEGORIES: &str = "get:categories";
/// Permission string for listing questions.
pub const PERMISSION_GET_QUESTIONS: &str = "get:questions";
/// Permission string for creating or searching questions.
pub const PERMISSION_POST_QUESTIONS: &str = "post:questions";
/// Permission string for deleting questions.
pub const PERMISSION_DELETE_QUESTIONS: &str = "delete:questions";
/// Permission string for playing quizzes.
pub const PERMISSION_POST_QUIZZES: &str = "post:quizzes";

const SUPPORTED_PERMISSION_STRINGS: &[&str] = &[
    PERMISSION_GET_CATEGORIES,
    PERMISSION_GET_QUESTIONS,
    PERMISSION_POST_QUESTIONS,
    PERMISSION_DELETE_QUESTIONS,
    PERMISSION_POST_QUIZZES,
];

impl Permission {
    /// Stable string id carried in token claims.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetCategories => PERMISSION_GET_CATEGORIES,
            Self::GetQuestions => PERMISSION_GET_QUESTIONS,
            Self::PostQuestions => PERMISSION_POST_QUESTIONS,
            Self::DeleteQuestions => PERMISSION_DELETE_QUESTIONS,
            Self::PostQuizzes => PERMISSION_POST_QUIZZES,
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns every permission string the guard understands.
pub fn supported_permission_strings() -> &'static [&'static str] {
    SUPPORTED_PERMISSION_STRINGS
}

/// Parses one permission from its claim string.
pub fn parse_permission(value: &str) -> Result<Permission, AuthError> {
    match value.trim() {
        "" => Err(AuthError::InvalidClaims(
            "permission value must not be empty".to_string(),
        )),
        PERMISSION_GET_CATEGORIES => Ok(Permission::GetCategories),
        PERMISSION_GET_QUESTIONS => Ok(Permission::GetQuestions),
        PERMISSION_POST_QUESTIONS => Ok(Permission::PostQuestions),
        PERMISSION_DELETE_QUESTIONS => Ok(Permission::DeleteQuestions),
        PERMISSION_POST_QUIZZES => Ok(Permission::PostQuizzes),
        other => Err(AuthError::InvalidClaims(format!(
            "unsupported permission `{other}`"
        ))),
    }
}

/// Verified identity and permissions of a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: String,
    pub permissions: BTreeSet<Permission>,
}

impl Claims {
    pub fn new(subject: impl Into<String>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            subject: subject.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Guard failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header on the request.
    MissingAuthorization,
    /// Header present but not of the form `Bearer <token>`.
    MalformedAuthorization,
    /// The verifier rejected the token.
    InvalidToken(String),
    /// Claims carried an unknown or empty permission.
    InvalidClaims(String),
    /// Token is valid but lacks the route's permission.
    PermissionDenied { subject: String, required: Permission },
}

impl AuthError {
    /// HTTP-style status this failure maps to.
    pub fn status(&self) -> u16 {
        match self {
            Self::PermissionDenied { .. } => 403,
            _ => 401,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAuthorization => write!(f, "authorization header is expected"),
            Self::MalformedAuthorization => {
                write!(f, "authorization header must be `Bearer <token>`")
            }
            Self::InvalidToken(message) => write!(f, "invalid token: {message}"),
            Self::InvalidClaims(message) => write!(f, "invalid claims: {message}"),
            Self::PermissionDenied { subject, required } => {
                write!(f, "subject `{subject}` lacks permission `{required}`")
            }
        }
    }
}

impl Error for AuthError {}

/// Opaque token verification collaborator.
pub trait TokenVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Verifier backed by a fixed token table, for local use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: BTreeMap<String, Claims>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` with permission strings, rejecting unknown ones.
    pub fn with_token(
        mut self,
        token: impl Into<String>,
        subject: impl Into<String>,
        permissions: &[&str],
    ) -> Result<Self, AuthError> {
        let permissions = permissions
            .iter()
            .map(|value| parse_permission(value))
            .collect::<Result<BTreeSet<_>, _>>()?;
        self.tokens.insert(
            token.into(),
            Claims {
                subject: subject.into(),
                permissions,
            },
        );
        Ok(self)
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))
    }
}

/// Interceptor the dispatcher runs before every guarded handler.
pub struct AuthGuard {
    verifier: Box<dyn TokenVerifier + Send + Sync>,
}

impl AuthGuard {
    pub fn new(verifier: impl TokenVerifier + Send + Sync + 'static) -> Self {
        Self {
            verifier: Box::new(verifier),
        }
    }

    /// Verifies the `Authorization` header and checks `required`.
    pub fn authorize(
        &self,
        authorization: Option<&str>,
        required: Permission,
    ) -> Result<Claims, AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.verifier.verify(token)?;
        if !claims.allows(required) {
            return Err(AuthError::PermissionDenied {
                subject: claims.subject,
                required,
            });
        }
        Ok(claims)
    }
}

fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization.ok_or(AuthError::MissingAuthorization)?;
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedAuthorization),
    }
}
