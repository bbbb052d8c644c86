//! Back-office authentication.
//!
//! JSON Web Tokens signed with a shared secret authenticate the management
//! UI; passwords are hashed with Argon2. The shop-floor portal uses its own
//! opaque-token session (see `services::portal`), deliberately separate from
//! this module.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::user;
use crate::errors::ServiceError;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated back-office user extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub token_id: String,
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_expiration: Duration,
}

/// Issues and verifies back-office credentials.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    /// Hash a clear-text secret with Argon2 for storage.
    pub fn hash_secret(secret: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::HashError(e.to_string()))
    }

    /// Verify a clear-text secret against a stored Argon2 hash.
    pub fn verify_secret(secret: &str, stored_hash: &str) -> Result<bool, ServiceError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }

    /// Verify credentials and issue a signed access token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ServiceError> {
        let db = &*self.db;
        let account = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::Active.eq(true))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::AuthError("Invalid credentials".to_string()))?;

        if !Self::verify_secret(password, &account.password_hash)? {
            debug!(username = %username, "Password verification failed");
            return Err(ServiceError::AuthError("Invalid credentials".to_string()));
        }

        self.issue_token(&account)
    }

    /// Sign an access token for a verified account.
    pub fn issue_token(&self, account: &user::Model) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::from_std(self.config.access_token_expiration)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?)
            .timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::AuthError(format!("Failed to sign token: {}", e)))
    }

    /// Decode and validate a bearer token, returning the authenticated user.
    pub fn verify_token(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.clone()]);
        validation.set_audience(&[self.config.jwt_audience.clone()]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::Unauthorized(format!("Invalid token: {}", e)))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))?;

        Ok(AuthUser {
            user_id,
            username: data.claims.username,
            token_id: data.claims.jti,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ServiceError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("Missing bearer token".to_string()))
}

#[async_trait]
impl FromRequestParts<crate::AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        state.auth.verify_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DatabaseConnection;

    fn test_service() -> AuthService {
        let config = AuthConfig {
            jwt_secret: "unit_test_secret_that_is_long_enough_for_hs256_signing_0123456789"
                .to_string(),
            jwt_issuer: "lasline-api".to_string(),
            jwt_audience: "lasline-backoffice".to_string(),
            access_token_expiration: Duration::from_secs(3600),
        };
        AuthService::new(config, Arc::new(DatabaseConnection::Disconnected))
    }

    fn test_account() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            username: "planner".to_string(),
            email: "planner@lasline.it".to_string(),
            password_hash: String::new(),
            full_name: None,
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn issued_token_verifies_back_to_same_user() {
        let service = test_service();
        let account = test_account();

        let token = service.issue_token(&account).unwrap();
        let auth_user = service.verify_token(&token).unwrap();

        assert_eq!(auth_user.user_id, account.id);
        assert_eq!(auth_user.username, "planner");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service();
        let token = service.issue_token(&test_account()).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.verify_token(&tampered).is_err());
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = AuthService::hash_secret("s3gr3to").unwrap();
        assert!(AuthService::verify_secret("s3gr3to", &hash).unwrap());
        assert!(!AuthService::verify_secret("wrong", &hash).unwrap());
    }
}
