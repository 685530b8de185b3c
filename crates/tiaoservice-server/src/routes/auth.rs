use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{middleware::SESSION_COOKIE, password, session};
use crate::error::{AppError, AppResult};
use crate::models::{now_iso, User, UserPublic, UserRole, UserStatus};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    // Validate input
    if body.email.is_empty() || !body.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if body.name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if body.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if body.role == UserRole::Admin {
        return Err(AppError::BadRequest(
            "Cannot register an admin account".to_string(),
        ));
    }

    let password_hash = password::hash_password(&body.password)?;
    let now = now_iso();
    let is_professional = body.role == UserRole::Professional;

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: body.email,
        password_hash,
        name: body.name,
        nickname: None,
        role: body.role,
        phone: body.phone,
        street: String::new(),
        neighborhood: String::new(),
        city: String::new(),
        state: String::new(),
        region_id: rand::thread_rng().gen_range(1..=3),
        // Clients are ready to go; professionals still need to fill in
        // services and await admin approval.
        is_profile_complete: !is_professional,
        status: if is_professional {
            UserStatus::Pending
        } else {
            UserStatus::Approved
        },
        latitude: None,
        longitude: None,
        services: Vec::new(),
        cpf_cnpj: None,
        bio: None,
        rating: is_professional.then_some(5.0),
        reviews_count: is_professional.then_some(1),
        pricing: None,
        services_change_request: None,
        profile_change_request: None,
        balance_tc: 0.0,
        balance_brl: 0.0,
        transactions: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    };

    let user_public: UserPublic = user.clone().into();
    state.store.insert_user(user)?;

    let sess = session::create_session(&state.store, &user_public.id)?;
    let cookie = build_session_cookie(sess.token, state.config.secure_cookies);

    Ok((StatusCode::CREATED, jar.add(cookie), Json(user_public)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .store
        .user_by_email(&body.email)?
        .ok_or(AppError::Unauthorized)?;

    let valid = password::verify_password(&body.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    if user.status == UserStatus::Blocked {
        return Err(AppError::AccountBlocked);
    }

    let sess = session::create_session(&state.store, &user.id)?;
    let cookie = build_session_cookie(sess.token, state.config.secure_cookies);
    let user_public: UserPublic = user.into();

    Ok((jar.add(cookie), Json(user_public)))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        session::delete_session(&state.store, cookie.value())?;
    }

    let removal = Cookie::build(SESSION_COOKIE)
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .build();

    Ok((jar.add(removal), Json(serde_json::json!({"ok": true}))))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserPublic> {
    Json(user.into())
}

fn build_session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .max_age(time::Duration::days(30))
        .http_only(true)
        .secure(secure)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .build()
}
