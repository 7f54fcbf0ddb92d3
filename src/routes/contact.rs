/**
 * Contact Routes
 * Contact form submissions and the admin inbox
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{default_true, is_valid_email, required, MessageResponse, Pagination, Payload, QueryParams};
use crate::db::models::{ContactMessage, CREATED_AT};
use crate::db::normalize::{new_id, now};
use crate::db::repository::{Entity, Repository};
use crate::db::store::{Filter, FindOptions, SortOrder};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    pub read: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReadFlagQuery {
    #[serde(default = "default_true")]
    pub read: bool,
}

/// POST /api/contact
pub async fn submit_message(
    State(state): State<AppState>,
    Payload(payload): Payload<ContactRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), ApiError> {
    let email = payload.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(ApiError::InvalidInput("Invalid email address".to_string()));
    }

    let message = ContactMessage {
        id: new_id(),
        full_name: required("full_name", &payload.full_name)?,
        email,
        phone: payload.phone.filter(|p| !p.trim().is_empty()),
        subject: required("subject", &payload.subject)?,
        message: required("message", &payload.message)?,
        created_at: now(),
        read: false,
    };
    Repository::<ContactMessage>::new(state.store.as_ref())
        .insert(&message)
        .await?;

    tracing::info!(id = %message.id, subject = %message.subject, "Contact message received");
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/contact/messages - newest first
pub async fn list_messages(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<MessageListQuery>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    let (skip, limit) = page.window(50, 200);
    let messages = Repository::<ContactMessage>::new(state.store.as_ref())
        .list(
            &Filter::new().eq_opt("read", query.read),
            &FindOptions::sorted(CREATED_AT, SortOrder::Descending).page(skip, limit),
        )
        .await?;
    Ok(Json(messages))
}

/// PUT /api/contact/messages/{id}/read?read=true
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<ReadFlagQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut set = serde_json::Map::new();
    set.insert("read".to_string(), query.read.into());

    let matched = state
        .store
        .update_one(ContactMessage::COLLECTION, &Filter::by("id", id), set)
        .await?;
    if matched == 0 {
        return Err(Repository::<ContactMessage>::not_found());
    }
    Ok(MessageResponse::new("Message updated successfully"))
}
