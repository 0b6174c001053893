//! Shared data models for the cooperative credit backend

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Member model — the store's mirror of the identity provider plus the member
/// directory borrowers pick guarantors from.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Member {
    pub id: Uuid,
    pub full_name: String,
    pub member_number: String,
    pub email: String,
    pub role: MemberRole,
    pub registration_fee_paid: bool,
    pub joined_at: DateTime<Utc>,
}

/// Member roles
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Admin,
}

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying a payload
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
