//! User registration and role endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::UserId;
use domain::{NewUser, Role, User};
use serde::{Deserialize, Serialize};
use store::Store;

use super::{AppState, JsonBody, parse_id};
use crate::error::ApiError;

/// Sign-up payload. `identifier` is used as email or phone when neither is given.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub identifier: Option<String>,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        let mut user = NewUser {
            name: req.name,
            email: req.email.filter(|e| !e.trim().is_empty()),
            phone: req.phone.filter(|p| !p.trim().is_empty()),
        };

        if user.email.is_none() && user.phone.is_none() {
            match req.identifier {
                Some(id) if id.contains('@') => user.email = Some(id),
                Some(id) => user.phone = Some(id),
                None => {}
            }
        }
        user
    }
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct SetRoleResponse {
    pub message: String,
    pub user: User,
}

/// POST /api/users: register a user and send the welcome notification.
#[tracing::instrument(skip(state, req))]
pub async fn register<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.coordinator.register_user(req.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id}/role: promote or demote a user.
#[tracing::instrument(skip(state, req))]
pub async fn set_role<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<SetRoleRequest>,
) -> Result<Json<SetRoleResponse>, ApiError> {
    let id = UserId::new(parse_id(&id)?);
    let role: Role = req.role.parse()?;

    let user = state
        .store
        .set_role(id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    tracing::info!(user_id = %id, %role, "user role changed");

    Ok(Json(SetRoleResponse {
        message: format!("User role updated to {role}"),
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_with_at_sign_is_email() {
        let user: NewUser = RegisterRequest {
            identifier: Some("asha@example.com".to_string()),
            ..RegisterRequest::default()
        }
        .into();
        assert_eq!(user.email.as_deref(), Some("asha@example.com"));
        assert!(user.phone.is_none());
    }

    #[test]
    fn test_identifier_without_at_sign_is_phone() {
        let user: NewUser = RegisterRequest {
            identifier: Some("9876543210".to_string()),
            ..RegisterRequest::default()
        }
        .into();
        assert_eq!(user.phone.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_explicit_contact_wins_over_identifier() {
        let user: NewUser = RegisterRequest {
            phone: Some("9876543210".to_string()),
            identifier: Some("asha@example.com".to_string()),
            ..RegisterRequest::default()
        }
        .into();
        assert_eq!(user.phone.as_deref(), Some("9876543210"));
        assert!(user.email.is_none());
    }
}
