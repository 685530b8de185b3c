use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{AiHelpResponse, User};
use crate::routes::AppState;
use crate::services::assistant::FALLBACK_REPLY;
use crate::services::ranking::{self, Coordinates, Recommendation};

#[derive(Debug, Deserialize)]
pub struct HelpRequest {
    pub problem: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct HelpResponse {
    pub analysis: AiHelpResponse,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EmergencyResponse {
    pub reply: String,
}

/// Analyze a problem description and, when the assistant recommends hiring,
/// rank matching professionals for display.
pub async fn help(
    State(state): State<AppState>,
    Extension(_user): Extension<User>,
    Json(body): Json<HelpRequest>,
) -> AppResult<Json<HelpResponse>> {
    if body.problem.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Problem description is required".to_string(),
        ));
    }

    let analysis = state.assistant.analyze_problem(&body.problem).await?;

    let recommendations = if analysis.recommend_professional {
        let caller = match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };
        ranking::recommend(
            &state.store.approved_professionals()?,
            &analysis.recommended_categories,
            caller,
        )
    } else {
        Vec::new()
    };

    Ok(Json(HelpResponse {
        analysis,
        recommendations,
    }))
}

/// Emergency assistant chat. Degrades to the canned apology instead of
/// surfacing an error.
pub async fn emergency(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<EmergencyRequest>,
) -> AppResult<Json<EmergencyResponse>> {
    if body.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let context = "Você é Mia, a assistente de emergências da plataforma TiãoService. \
                   Acompanhe o caso com calma e objetividade. Se houver risco imediato à vida, \
                   instrua ligar 190 (Polícia), 192 (SAMU) ou 193 (Bombeiros).";
    let message = format!("O usuário {} disse: \"{}\"", user.name, body.message);

    let reply = match state.assistant.converse(context, &message).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Emergency assistant reply failed: {e}");
            FALLBACK_REPLY.to_string()
        }
    };

    Ok(Json(EmergencyResponse { reply }))
}
