//! In-memory application state. All entities live here for the lifetime of
//! the process, seeded from fixtures at startup; nothing is persisted.
//! Handlers clone entities out under the read lock, compute, then write the
//! result back. Last write wins; there is no transaction boundary beyond
//! the lock itself.

mod seed;

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{AppError, AppResult};
use crate::models::{ChatMessage, ServiceRequest, Session, User, UserRole, UserStatus};

#[derive(Default)]
struct StoreInner {
    users: Vec<User>,
    requests: Vec<ServiceRequest>,
    chats: HashMap<String, Vec<ChatMessage>>,
    sessions: HashMap<String, Session>,
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<StoreInner>>,
}

/// Chat histories are keyed by the participant pair, ordered so either side
/// resolves to the same key.
pub fn chat_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}:{b}")
    } else {
        format!("{b}:{a}")
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
        }
    }

    /// Build a store pre-populated with the mock marketplace fixtures.
    pub fn seeded() -> AppResult<Self> {
        let store = Self::new();
        seed::populate(&store)?;
        Ok(store)
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, StoreInner>> {
        self.inner
            .read()
            .map_err(|_| AppError::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, StoreInner>> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal("store lock poisoned".to_string()))
    }

    // --- users ---

    pub fn insert_user(&self, user: User) -> AppResult<()> {
        let mut inner = self.write()?;
        if inner
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        inner.users.push(user);
        Ok(())
    }

    pub fn user(&self, id: &str) -> AppResult<User> {
        self.read()?
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    pub fn users(&self) -> AppResult<Vec<User>> {
        Ok(self.read()?.users.clone())
    }

    /// Approved professionals are the only ones visible in search and
    /// recommendation results.
    pub fn approved_professionals(&self) -> AppResult<Vec<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .filter(|u| u.role == UserRole::Professional && u.status == UserStatus::Approved)
            .cloned()
            .collect())
    }

    /// Replace a user wholesale. The caller is expected to have cloned the
    /// user out, mutated it, and handed it back.
    pub fn update_user(&self, user: User) -> AppResult<()> {
        let mut inner = self.write()?;
        let slot = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        *slot = user;
        Ok(())
    }

    /// Replace several users under a single write lock. Used by service
    /// payment, which touches both payer and payee.
    pub fn update_users(&self, users: Vec<User>) -> AppResult<()> {
        let mut inner = self.write()?;
        for user in users {
            let slot = inner
                .users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            *slot = user;
        }
        Ok(())
    }

    pub fn delete_user(&self, id: &str) -> AppResult<()> {
        let mut inner = self.write()?;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        if inner.users.len() == before {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        inner.sessions.retain(|_, s| s.user_id != id);
        Ok(())
    }

    // --- service requests ---

    pub fn insert_request(&self, request: ServiceRequest) -> AppResult<()> {
        self.write()?.requests.push(request);
        Ok(())
    }

    pub fn request(&self, id: &str) -> AppResult<ServiceRequest> {
        self.read()?
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Service request not found".to_string()))
    }

    pub fn requests_for(&self, user_id: &str) -> AppResult<Vec<ServiceRequest>> {
        Ok(self
            .read()?
            .requests
            .iter()
            .filter(|r| r.client_id == user_id || r.professional_id == user_id)
            .cloned()
            .collect())
    }

    pub fn update_request(&self, request: ServiceRequest) -> AppResult<()> {
        let mut inner = self.write()?;
        let slot = inner
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| AppError::NotFound("Service request not found".to_string()))?;
        *slot = request;
        Ok(())
    }

    // --- chats ---

    pub fn chat_history(&self, key: &str) -> AppResult<Vec<ChatMessage>> {
        Ok(self.read()?.chats.get(key).cloned().unwrap_or_default())
    }

    pub fn append_chat(&self, key: &str, message: ChatMessage) -> AppResult<()> {
        self.write()?
            .chats
            .entry(key.to_string())
            .or_default()
            .push(message);
        Ok(())
    }

    // --- sessions ---

    pub fn insert_session(&self, session: Session) -> AppResult<()> {
        self.write()?
            .sessions
            .insert(session.token.clone(), session);
        Ok(())
    }

    pub fn session_by_token(&self, token: &str) -> AppResult<Option<Session>> {
        Ok(self.read()?.sessions.get(token).cloned())
    }

    pub fn remove_session(&self, token: &str) -> AppResult<()> {
        self.write()?.sessions.remove(token);
        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now_iso;

    fn bare_user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
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
            created_at: now_iso(),
            updated_at: now_iso(),
        }
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let store = Store::new();
        store.insert_user(bare_user("u1", "ze@example.com")).unwrap();
        let err = store
            .insert_user(bare_user("u2", "ZE@example.com"))
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn delete_user_drops_their_sessions() {
        let store = Store::new();
        store.insert_user(bare_user("u1", "a@example.com")).unwrap();
        store
            .insert_session(Session {
                id: "s1".to_string(),
                user_id: "u1".to_string(),
                token: "tok".to_string(),
                expires_at: "2999-01-01T00:00:00.000Z".to_string(),
                created_at: now_iso(),
            })
            .unwrap();

        store.delete_user("u1").unwrap();
        assert!(store.session_by_token("tok").unwrap().is_none());
        assert!(matches!(store.user("u1"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn chat_key_is_order_independent() {
        assert_eq!(chat_key("a", "b"), chat_key("b", "a"));
    }

    #[test]
    fn seeded_store_has_approved_professionals() {
        let store = Store::seeded().unwrap();
        let pros = store.approved_professionals().unwrap();
        assert!(!pros.is_empty());
        assert!(pros
            .iter()
            .all(|p| p.role == UserRole::Professional && p.status == UserStatus::Approved));
    }
}
