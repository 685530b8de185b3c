use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{now_iso, ProfileChange, User, UserPublic, UserRole, SERVICE_CATEGORIES};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub bio: Option<String>,
    pub pricing: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub services: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceChangeRequest {
    pub services: Vec<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserPublic>> {
    let mut user = state.store.user(&user.id)?;

    if let Some(services) = &body.services {
        if user.role != UserRole::Professional {
            return Err(AppError::BadRequest(
                "Only professionals offer services".to_string(),
            ));
        }
        validate_services(services)?;
        user.services = services.clone();
    }

    if let Some(name) = body.name {
        if name.is_empty() {
            return Err(AppError::BadRequest("Name cannot be empty".to_string()));
        }
        user.name = name;
    }
    if body.nickname.is_some() {
        user.nickname = body.nickname;
    }
    if let Some(phone) = body.phone {
        user.phone = phone;
    }
    if let Some(street) = body.street {
        user.street = street;
    }
    if let Some(neighborhood) = body.neighborhood {
        user.neighborhood = neighborhood;
    }
    if let Some(city) = body.city {
        user.city = city;
    }
    if let Some(uf) = body.state {
        user.state = uf;
    }
    if body.cpf_cnpj.is_some() {
        user.cpf_cnpj = body.cpf_cnpj;
    }
    if body.bio.is_some() {
        user.bio = body.bio;
    }
    if body.pricing.is_some() {
        user.pricing = body.pricing;
    }
    if body.latitude.is_some() {
        user.latitude = body.latitude;
    }
    if body.longitude.is_some() {
        user.longitude = body.longitude;
    }

    user.is_profile_complete = true;
    user.updated_at = now_iso();

    state.store.update_user(user.clone())?;
    Ok(Json(user.into()))
}

/// A professional's change to their offered services takes effect only after
/// admin approval; until then it sits on the profile as a pending request.
pub async fn request_service_change(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<ServiceChangeRequest>,
) -> AppResult<Json<UserPublic>> {
    if user.role != UserRole::Professional {
        return Err(AppError::Forbidden(
            "Only professionals can change services".to_string(),
        ));
    }
    if body.services.is_empty() {
        return Err(AppError::BadRequest(
            "At least one service is required".to_string(),
        ));
    }
    validate_services(&body.services)?;

    let mut user = state.store.user(&user.id)?;
    user.services_change_request = Some(body.services);
    user.updated_at = now_iso();

    state.store.update_user(user.clone())?;
    Ok(Json(user.into()))
}

pub async fn request_profile_change(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<ProfileChange>,
) -> AppResult<Json<UserPublic>> {
    if user.role != UserRole::Professional {
        return Err(AppError::Forbidden(
            "Only professionals submit profile changes for approval".to_string(),
        ));
    }

    let mut user = state.store.user(&user.id)?;
    user.profile_change_request = Some(body);
    user.updated_at = now_iso();

    state.store.update_user(user.clone())?;
    Ok(Json(user.into()))
}

fn validate_services(services: &[String]) -> AppResult<()> {
    for service in services {
        if !SERVICE_CATEGORIES.contains(&service.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unknown service category: {service}"
            )));
        }
    }
    Ok(())
}
