//! Session context extraction
//!
//! Identity lives with the hosted auth provider in front of this service;
//! requests arrive with the authenticated principal's claims as trusted
//! headers set by that proxy. The extractors below read those claims —
//! permission checks built on them are UI gating parity with the portal,
//! not a security boundary.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::MemberRole;

/// The authenticated principal, read from identity-proxy headers.
#[derive(Debug, Clone)]
pub struct Session {
    pub member_id: Uuid,
    pub role: MemberRole,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member_id = parts
            .headers
            .get("x-member-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Missing or invalid session context".to_string())
            })?;

        let role = match parts
            .headers
            .get("x-member-role")
            .and_then(|v| v.to_str().ok())
        {
            Some("admin") => MemberRole::Admin,
            _ => MemberRole::Member,
        };

        Ok(Session { member_id, role })
    }
}

/// Extractor for admin-only endpoints.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role != MemberRole::Admin {
            return Err(ApiError::Forbidden(
                "This action requires an admin account".to_string(),
            ));
        }
        Ok(AdminSession(session))
    }
}
