use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{now_iso, User, UserPublic, UserRole, UserStatus};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

fn ensure_admin(user: &User) -> AppResult<()> {
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
) -> AppResult<Json<Vec<UserPublic>>> {
    ensure_admin(&admin)?;
    let users = state
        .store
        .users()?
        .into_iter()
        .map(UserPublic::from)
        .collect();
    Ok(Json(users))
}

/// Approve, block or re-pend an account. Professionals only show up in
/// search and recommendations once approved.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Json<UserPublic>> {
    ensure_admin(&admin)?;

    let mut user = state.store.user(&id)?;
    user.status = body.status;
    user.updated_at = now_iso();
    state.store.update_user(user.clone())?;

    tracing::info!("Admin {} set user {} status to {:?}", admin.id, id, body.status);
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    ensure_admin(&admin)?;

    state.store.delete_user(&id)?;
    tracing::info!("Admin {} deleted user {id}", admin.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn approve_service_change(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    Path(id): Path<String>,
) -> AppResult<Json<UserPublic>> {
    ensure_admin(&admin)?;

    let mut user = state.store.user(&id)?;
    let services = user.services_change_request.take().ok_or_else(|| {
        AppError::BadRequest("User has no pending service change".to_string())
    })?;
    user.services = services;
    user.updated_at = now_iso();
    state.store.update_user(user.clone())?;

    Ok(Json(user.into()))
}

pub async fn approve_profile_change(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    Path(id): Path<String>,
) -> AppResult<Json<UserPublic>> {
    ensure_admin(&admin)?;

    let mut user = state.store.user(&id)?;
    let change = user.profile_change_request.take().ok_or_else(|| {
        AppError::BadRequest("User has no pending profile change".to_string())
    })?;

    if let Some(name) = change.name {
        user.name = name;
    }
    if change.nickname.is_some() {
        user.nickname = change.nickname;
    }
    if let Some(phone) = change.phone {
        user.phone = phone;
    }
    if change.bio.is_some() {
        user.bio = change.bio;
    }
    if change.pricing.is_some() {
        user.pricing = change.pricing;
    }
    user.updated_at = now_iso();
    state.store.update_user(user.clone())?;

    Ok(Json(user.into()))
}
