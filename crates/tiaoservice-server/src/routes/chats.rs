use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{now_iso, ChatMessage, User, UserRole, UserStatus};
use crate::routes::AppState;
use crate::services::assistant::FALLBACK_REPLY;
use crate::store::chat_key;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(professional_id): Path<String>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let key = chat_key(&user.id, &professional_id);
    Ok(Json(state.store.chat_history(&key)?))
}

/// Send a message to a professional. The professional's reply is produced by
/// the AI collaborator speaking in their persona; if the collaborator is
/// unreachable the reply degrades to a canned apology instead of an error.
pub async fn send(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(professional_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    if body.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let professional = state.store.user(&professional_id)?;
    if professional.role != UserRole::Professional
        || professional.status != UserStatus::Approved
    {
        return Err(AppError::BadRequest(
            "Professional is not available".to_string(),
        ));
    }

    let key = chat_key(&user.id, &professional.id);
    state.store.append_chat(
        &key,
        ChatMessage {
            sender_id: user.id.clone(),
            text: body.text.clone(),
            timestamp: now_iso(),
            is_ai: false,
        },
    )?;

    let context = format!(
        "Você é {}, um profissional de {}. Responda de forma prestativa, profissional e amigável.",
        professional.name,
        professional.services.join(", ")
    );
    let message = format!("O cliente {} disse: \"{}\"", user.name, body.text);

    let reply = match state.assistant.converse(&context, &message).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Chat reply failed for professional {}: {e}", professional.id);
            FALLBACK_REPLY.to_string()
        }
    };

    state.store.append_chat(
        &key,
        ChatMessage {
            sender_id: professional.id,
            text: reply,
            timestamp: now_iso(),
            is_ai: true,
        },
    )?;

    Ok(Json(state.store.chat_history(&key)?))
}
