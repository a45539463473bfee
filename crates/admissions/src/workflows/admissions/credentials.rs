//! Password hashing and access-token issuance.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::Argon2;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{User, UserId, UserRole, UserStatus};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token rejected: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    Expired,
}

pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String, CredentialError>;
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hash(err.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub trait TokenService: Send + Sync {
    fn generate_token(&self, user: &User, now: DateTime<Utc>)
        -> Result<IssuedToken, CredentialError>;

    fn validate_token(&self, token: &str, now: DateTime<Utc>)
        -> Result<TokenClaims, CredentialError>;

    fn user_id_from_token(&self, token: &str, now: DateTime<Utc>) -> Option<UserId> {
        self.validate_token(token, now).ok().map(|claims| claims.sub)
    }
}

/// Settings for HMAC-signed access tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_minutes: i64,
}

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            ttl: Duration::minutes(settings.expiry_minutes),
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, CredentialError> {
        let expires_at = now + self.ttl;
        let claims = TokenClaims {
            sub: user.id,
            email: user.email.clone(),
            given_name: user.first_name.clone(),
            family_name: user.last_name.clone(),
            role: user.role,
            status: user.status,
            email_verified: user.is_email_verified,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(CredentialError::Signing)?;
        Ok(IssuedToken { token, expires_at })
    }

    fn validate_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, CredentialError> {
        // Expiry is checked against the injected clock instead of the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|err| CredentialError::InvalidToken(err.to_string()))?
            .claims;

        match Utc.timestamp_opt(claims.exp, 0).single() {
            Some(expires_at) if expires_at > now => Ok(claims),
            _ => Err(CredentialError::Expired),
        }
    }
}

/// One-time token mailed to a new account to confirm its address.
pub fn verification_token() -> String {
    Uuid::new_v4().simple().to_string()
}
