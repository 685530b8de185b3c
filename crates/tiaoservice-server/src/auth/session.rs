use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{now_iso, Session, User};
use crate::store::Store;

const SESSION_DURATION_DAYS: i64 = 30;

pub fn create_session(store: &Store, user_id: &str) -> AppResult<Session> {
    let expires_at = (Utc::now() + Duration::days(SESSION_DURATION_DAYS))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    let session = Session {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        token: generate_token(),
        expires_at,
        created_at: now_iso(),
    };

    store.insert_session(session.clone())?;
    Ok(session)
}

pub fn validate_session(store: &Store, token: &str) -> AppResult<(Session, User)> {
    let session = store
        .session_by_token(token)?
        .ok_or(AppError::Unauthorized)?;

    if session.expires_at <= now_iso() {
        store.remove_session(token)?;
        return Err(AppError::Unauthorized);
    }

    let user = store
        .user(&session.user_id)
        .map_err(|_| AppError::Unauthorized)?;

    Ok((session, user))
}

pub fn delete_session(store: &Store, token: &str) -> AppResult<()> {
    store.remove_session(token)
}

fn generate_token() -> String {
    use base64::Engine;
    let mut bytes = [0u8; 32];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserRole, UserStatus};

    fn store_with_user(id: &str) -> Store {
        let store = Store::new();
        let now = now_iso();
        store
            .insert_user(User {
                id: id.to_string(),
                email: format!("{id}@example.com"),
                password_hash: "x".to_string(),
                name: "Test".to_string(),
                nickname: None,
                role: UserRole::Client,
                phone: String::new(),
                street: String::new(),
                neighborhood: String::new(),
                city: String::new(),
                state: String::new(),
                region_id: 1,
                is_profile_complete: true,
                status: UserStatus::Approved,
                latitude: None,
                longitude: None,
                services: Vec::new(),
                cpf_cnpj: None,
                bio: None,
                rating: None,
                reviews_count: None,
                pricing: None,
                services_change_request: None,
                profile_change_request: None,
                balance_tc: 0.0,
                balance_brl: 0.0,
                transactions: Vec::new(),
                created_at: now.clone(),
                updated_at: now,
            })
            .unwrap();
        store
    }

    #[test]
    fn session_round_trip() {
        let store = store_with_user("u1");
        let session = create_session(&store, "u1").unwrap();
        let (validated, user) = validate_session(&store, &session.token).unwrap();
        assert_eq!(validated.user_id, "u1");
        assert_eq!(user.id, "u1");
    }

    #[test]
    fn deleted_session_is_unauthorized() {
        let store = store_with_user("u1");
        let session = create_session(&store, "u1").unwrap();
        delete_session(&store, &session.token).unwrap();
        assert!(matches!(
            validate_session(&store, &session.token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let store = store_with_user("u1");
        assert!(matches!(
            validate_session(&store, "nope"),
            Err(AppError::Unauthorized)
        ));
    }
}
