//! Notification inbox endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::UserId;
use domain::{NewNotification, Notification, NotificationKind, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::Store;

use super::{AppState, JsonBody, parse_id};
use crate::error::ApiError;

/// A notification posted directly, outside order placement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub user_id: Option<UserId>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

impl TryFrom<CreateNotificationRequest> for NewNotification {
    type Error = ValidationError;

    fn try_from(req: CreateNotificationRequest) -> Result<Self, Self::Error> {
        let user_id = req.user_id.ok_or(ValidationError::UserIdRequired)?;
        let title = req.title.ok_or(ValidationError::Required("Title"))?;
        let kind = req.kind.ok_or(ValidationError::Required("Type"))?;
        let metadata = match req.metadata {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        Ok(NewNotification::new(
            user_id,
            title,
            req.description.unwrap_or_default(),
            NotificationKind::new(kind),
            metadata,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub message: &'static str,
    pub updated: u64,
}

/// GET /api/notifications/{user_id}: newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let user_id = UserId::new(parse_id(&user_id)?);
    Ok(Json(state.store.list_notifications_for_user(user_id).await?))
}

/// PUT /api/notifications/read/{user_id}
#[tracing::instrument(skip(state))]
pub async fn mark_read<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let user_id = UserId::new(parse_id(&user_id)?);
    let updated = state.store.mark_all_read(user_id).await?;
    Ok(Json(MarkReadResponse {
        message: "Notifications marked as read",
        updated,
    }))
}

/// POST /api/notifications
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let notification = state.store.insert_notification(req.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}
