use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{UserPublic, SERVICE_CATEGORIES};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

pub async fn categories() -> Json<Vec<&'static str>> {
    Json(SERVICE_CATEGORIES.to_vec())
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<UserPublic>>> {
    let professionals = state
        .store
        .approved_professionals()?
        .into_iter()
        .filter(|p| {
            query
                .category
                .as_ref()
                .map_or(true, |c| p.services.contains(c))
        })
        .map(UserPublic::from)
        .collect();

    Ok(Json(professionals))
}
