use crate::db::models::{User, UserSession};
use crate::db::operations::DbOperations;
use crate::error::{AppError, AuthError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

const SALT_SIZE: usize = 16;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User ID
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

pub struct AuthService {
    db: DbOperations,
    jwt_secret: String,
    token_expiry_hours: i64,
}

impl AuthService {
    pub fn new(db: DbOperations, jwt_secret: String, token_expiry_hours: i64) -> Self {
        Self {
            db,
            jwt_secret,
            token_expiry_hours,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User, AppError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user = User::new(email.to_string(), hash_password(password));
        self.db.create_user(&user).await
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .db
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active || !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.generate_token(&user.id.to_string())?;

        let session = UserSession::new(user.id, token.clone(), self.token_expiry_hours);
        self.db.create_session(&session).await?;
        self.db.record_login(user.id).await?;

        Ok(token)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        // First check if session exists and is not expired
        let session = self
            .db
            .get_session_by_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if session.is_expired() {
            return Err(AuthError::TokenExpired.into());
        }

        // Validate JWT
        let claims = self.decode_token(token)?;

        // Get user
        let user = self
            .db
            .get_user_by_id(Uuid::parse_str(&claims.sub)?)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        // Update session activity
        self.db.update_session_activity(token).await?;

        Ok(user)
    }

    pub async fn invalidate_token(&self, token: &str) -> Result<(), AppError> {
        self.db.delete_session(token).await
    }

    fn generate_token(&self, user_id: &str) -> Result<String, AppError> {
        encode_claims(&self.jwt_secret, user_id, self.token_expiry_hours)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode_claims(&self.jwt_secret, token)
    }
}

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!("{}${}", BASE64.encode(salt), BASE64.encode(digest))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = BASE64.decode(salt) else {
        return false;
    };
    let Ok(digest) = BASE64.decode(digest) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());

    hasher.finalize().as_slice() == digest.as_slice()
}

fn encode_claims(secret: &str, user_id: &str, expiry_hours: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::hours(expiry_hours)).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(claims.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let a = hash_password("same password");
        let b = hash_password("same password");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", "!!!$!!!"));
    }

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4().to_string();
        let token = encode_claims("test_secret", &user_id, 1).unwrap();
        let claims = decode_claims("test_secret", &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = encode_claims("test_secret", "user", 1).unwrap();
        let result = decode_claims("other_secret", &token);
        assert!(matches!(
            result,
            Err(AppError::AuthError(AuthError::InvalidToken))
        ));
    }
}
