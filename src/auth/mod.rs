use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtPayload {
    pub sub: String,
    pub iss: String,
    pub exp: u64,
    pub iat: u64,
    pub jti: Option<String>,
}

fn secret(settings: &Settings) -> Result<&[u8], AppError> {
    if settings.jwt_secret_key.is_empty() {
        return Err(AppError::unauthorized("JWT_SECRET_KEY is not configured"));
    }
    Ok(settings.jwt_secret_key.as_bytes())
}

/// Sign an HS256 token for `subject`, valid for `jwt_expires_seconds`.
pub fn generate_token(settings: &Settings, subject: &str) -> Result<String, AppError> {
    if subject.is_empty() {
        return Err(AppError::unauthorized("Cannot issue a token without a subject"));
    }

    let now = Utc::now().timestamp().max(0) as u64;
    let payload = JwtPayload {
        sub: subject.to_string(),
        iss: settings.jwt_issuer.clone(),
        exp: now.saturating_add(settings.jwt_expires_seconds),
        iat: now,
        jti: Some(crate::utils::common::create_uuid()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &payload,
        &EncodingKey::from_secret(secret(settings)?),
    )
    .map_err(|e| AppError::unauthorized(format!("Failed to sign token: {e}")))
}

/// Hash `password` with bcrypt at `bcrypt_cost`.
pub fn hash_password(settings: &Settings, password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, settings.bcrypt_cost)?)
}

/// `true` when `password` matches a hash produced by [`hash_password`].
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    Ok(bcrypt::verify(password, hash)?)
}

pub fn verify_token(settings: &Settings, token: &str) -> Result<JwtPayload, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[settings.jwt_issuer.as_str()]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);
    validation.validate_aud = false;

    let token_data = decode::<JwtPayload>(
        token,
        &DecodingKey::from_secret(secret(settings)?),
        &validation,
    )
    .map_err(|e| AppError::unauthorized(format!("Invalid token: {e}")))?;

    let payload = token_data.claims;

    if payload.sub.is_empty() {
        return Err(AppError::unauthorized("Invalid token: missing sub"));
    }

    Ok(payload)
}
