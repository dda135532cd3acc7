//! Operator identity
//!
//! Authentication itself is out of scope: a trusted front layer
//! validates the session and injects the operator into each request as
//! headers. This module extracts them and carries the role into the
//! order engine's guards.
//!
//! Headers: `x-operator-id`, `x-operator-name`, `x-operator-role`
//! (admin | cashier | waiter). Mutating routes reject requests without
//! a valid operator.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use shared::order::StaffRole;
use shared::util::now_millis;

use crate::orders::CommandMetadata;
use crate::utils::AppError;

/// The operator behind the current request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub role: StaffRole,
}

impl CurrentUser {
    /// Command metadata stamped with the request time
    pub fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            operator_id: self.id,
            operator_name: self.name.clone(),
            role: self.role,
            timestamp: now_millis(),
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = header(parts, "x-operator-role")
            .and_then(StaffRole::parse)
            .ok_or(AppError::Unauthorized)?;
        let name = header(parts, "x-operator-name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(AppError::Unauthorized)?
            .to_string();
        let id = header(parts, "x-operator-id")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        Ok(CurrentUser { id, name, role })
    }
}
