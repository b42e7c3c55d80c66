use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::Role;

pub mod guard;

/// JWT claims issued by the platform's auth collaborator. This service only
/// verifies them; session management lives elsewhere.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, role: Role, email: String) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            role: role.as_str().to_string(),
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// The authenticated actor performing an action.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
}

impl TryFrom<Claims> for Principal {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = Role::parse(&claims.role)
            .ok_or_else(|| format!("Unknown role in token: {}", claims.role))?;
        Ok(Self {
            id: claims.sub,
            role,
            email: claims.email,
        })
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Validate a bearer token and extract its claims.
pub fn verify_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_principal() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, Role::Teacher, "t@example.com".into());
        let token = generate_jwt(&claims).unwrap();

        let decoded = verify_jwt(&token).unwrap();
        let principal = Principal::try_from(decoded).unwrap();
        assert_eq!(principal.id, id);
        assert_eq!(principal.role, Role::Teacher);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "superuser".into(),
            email: "x@example.com".into(),
            exp: 0,
            iat: 0,
        };
        assert!(Principal::try_from(claims).is_err());
    }
}
