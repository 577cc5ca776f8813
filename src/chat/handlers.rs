use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    chat::{
        dto::{ChatRequest, DeleteChatResponse, SaveChatRequest, SaveChatResponse},
        engine::EngineReply,
        repo::ChatMessage,
    },
    error::ApiError,
    state::AppState,
};

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/save", post(save_chat))
        .route("/chat/history", get(chat_history))
        .route("/chat/history/:id", delete(delete_chat))
}

/// POST /chat — forward the message to the engine and return its reply.
/// Nothing is persisted here; saving is a separate explicit call.
#[instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<EngineReply>, ApiError> {
    let reply = state.engine.ask(user_id, &payload.message).await?;
    Ok(Json(reply))
}

/// POST /chat/save — persist one conversation turn for the caller.
#[instrument(skip(state, payload))]
pub async fn save_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveChatRequest>,
) -> Result<Json<SaveChatResponse>, ApiError> {
    if payload.message.trim().is_empty() || payload.reply.trim().is_empty() {
        return Err(ApiError::Validation(
            "Message and reply are required".into(),
        ));
    }

    let record = ChatMessage::create(&state.db, user_id, &payload.message, &payload.reply).await?;

    info!(user_id = %user_id, chat_id = %record.id, "chat saved");
    Ok(Json(SaveChatResponse {
        success: true,
        message: "Chat saved",
    }))
}

/// GET /chat/history — the caller's records, most recent first.
#[instrument(skip(state))]
pub async fn chat_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let history = ChatMessage::list_by_user(&state.db, user_id).await?;
    Ok(Json(history))
}

/// DELETE /chat/history/:id — remove one record if the caller owns it.
#[instrument(skip(state))]
pub async fn delete_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteChatResponse>, ApiError> {
    let deleted = ChatMessage::delete_owned(&state.db, user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFoundOrUnauthorized);
    }

    info!(user_id = %user_id, chat_id = %id, "chat deleted");
    Ok(Json(DeleteChatResponse {
        message: "Chat deleted",
    }))
}
