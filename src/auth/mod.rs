/*!
 * Account and session management.
 *
 * Login issues an opaque `sp_`-prefixed token backed by a server-side
 * [`sessions::Session`]; only the token's SHA-256 hash is kept. Passwords
 * hash with argon2. The [`AuthUser`] extractor turns a bearer token into the
 * authenticated user for the handlers that need one.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{User, UserProfile, UserRole};
use crate::store::Datastore;

pub mod sessions;

use sessions::{hash_token, issue_session, SessionStore};

/// Authenticated user data resolved from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

pub struct AuthService {
    store: Arc<Datastore>,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<Datastore>, sessions: Arc<dyn SessionStore>, session_ttl: Duration) -> Self {
        Self {
            store,
            sessions,
            session_ttl,
        }
    }

    /// Create an account and open a session for it.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<(UserProfile, String), ServiceError> {
        let email = normalize_email(email);

        if self.store.users.find(|u| u.email == email).is_some() {
            return Err(ServiceError::ValidationError(
                "A user with this email already exists".into(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            name: name.trim().to_string(),
            role: UserRole::User,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        self.store.users.insert(user.id, user.clone());

        let token = self.open_session(user.id).await;
        Ok((UserProfile::from(&user), token))
    }

    /// Verify credentials and open a session. The failure message never says
    /// which half was wrong.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserProfile, String), ServiceError> {
        let email = normalize_email(email);

        let user = self
            .store
            .users
            .find(|u| u.email == email)
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        let token = self.open_session(user.id).await;
        Ok((UserProfile::from(&user), token))
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let session = self
            .sessions
            .get(&hash_token(token))
            .await
            .ok_or_else(|| ServiceError::AuthError("Invalid or expired session".into()))?;

        let user = self
            .store
            .users
            .get(&session.user_id)
            .ok_or_else(|| ServiceError::AuthError("Invalid or expired session".into()))?;

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        })
    }

    /// Revoke the presented session. Revoking an already-gone session is fine.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &str) -> Result<(), ServiceError> {
        self.sessions.revoke(&hash_token(token)).await;
        Ok(())
    }

    /// Public view of a stored account.
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, ServiceError> {
        self.store
            .users
            .get(&user_id)
            .map(|user| UserProfile::from(&user))
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    async fn open_session(&self, user_id: Uuid) -> String {
        let (token, session) = issue_session(user_id, self.session_ttl);
        self.sessions.put(session).await;
        token
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn invalid_credentials() -> ServiceError {
    ServiceError::AuthError("Invalid credentials".into())
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Pull the token out of an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ServiceError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ServiceError::AuthError("Missing bearer token".into()))
}

#[async_trait]
impl FromRequestParts<crate::AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?.to_string();
        state.services.auth.authenticate(&token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessions::MemorySessionStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(Datastore::new()),
            Arc::new(MemorySessionStore::new()),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn register_then_login_and_authenticate() {
        let auth = service();

        let (profile, token) = auth
            .register("Ada@Example.com", "Ada", "correct horse")
            .await
            .unwrap();
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.role, UserRole::User);

        let who = auth.authenticate(&token).await.unwrap();
        assert_eq!(who.user_id, profile.id);

        let (again, second_token) = auth.login("ada@example.com", "correct horse").await.unwrap();
        assert_eq!(again.id, profile.id);
        assert_ne!(second_token, token);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = service();
        auth.register("a@example.com", "A", "password one")
            .await
            .unwrap();

        let err = auth
            .register("A@EXAMPLE.COM", "Other", "password two")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_identically() {
        let auth = service();
        auth.register("a@example.com", "A", "right password")
            .await
            .unwrap();

        let wrong_password = auth
            .login("a@example.com", "wrong password")
            .await
            .unwrap_err();
        let unknown_email = auth.login("b@example.com", "whatever").await.unwrap_err();

        assert_eq!(
            wrong_password.response_message(),
            unknown_email.response_message()
        );
    }

    #[tokio::test]
    async fn logout_invalidates_the_session() {
        let auth = service();
        let (_, token) = auth.register("a@example.com", "A", "password").await.unwrap();

        auth.logout(&token).await.unwrap();
        assert!(auth.authenticate(&token).await.is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, "Bearer sp_abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "sp_abc");

        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
    }
}
