//! Request context carrying the acting caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::types::UserId;
use haulmark_entity::user::UserRole;

/// Context for the current operation.
///
/// Built once by the caller (CLI, tests) and passed into service methods so
/// that every operation knows *who* is acting without an ambient session
/// lookup.
#[derive(Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID, `None` for an anonymous caller.
    pub user_id: Option<UserId>,
    /// The caller's marketplace role.
    pub role: UserRole,
    /// Access token issued by the hosted auth service.
    #[serde(skip)]
    pub access_token: Option<String>,
    /// When the context was created.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// A caller with no identity.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            role: UserRole::default(),
            access_token: None,
            request_time: Utc::now(),
        }
    }

    /// An authenticated caller.
    pub fn authenticated(user_id: UserId, role: UserRole) -> Self {
        Self {
            user_id: Some(user_id),
            role,
            access_token: None,
            request_time: Utc::now(),
        }
    }

    /// Attach the caller's access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Returns whether a caller identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Returns whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// The caller's id, or an authentication error for anonymous callers.
    pub fn require_user(&self) -> AppResult<UserId> {
        self.user_id
            .ok_or_else(|| AppError::authentication("You must be signed in to do this"))
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_time", &self.request_time)
            .finish()
    }
}
