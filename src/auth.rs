// ABOUTME: JWT-based authentication for the academy server's REST surface
// ABOUTME: Token generation and validation carrying the user id and role as claims
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Authentication.
//!
//! Tokens are HS256-signed JWTs carrying the user id and role. Routes
//! validate the bearer token and then check the role against the
//! endpoint's requirement; user CRUD and login live outside this
//! service, so there is no password handling here.

use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for an authenticated user
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User role
    pub role: UserRole,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Outcome of a successful token validation
#[derive(Debug, Clone, Copy)]
pub struct AuthResult {
    /// The authenticated user's id
    pub user_id: Uuid,
    /// The authenticated user's role
    pub role: UserRole,
}

/// Issues and validates access tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl AuthManager {
    /// Create a new manager from the shared signing secret
    #[must_use]
    pub fn new(jwt_secret: &[u8], expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret),
            decoding_key: DecodingKey::from_secret(jwt_secret),
            expiry_hours,
        }
    }

    /// Generate an access token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if token signing fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and extract the authenticated identity
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for expired, malformed, or badly signed
    /// tokens
    pub fn validate_token(&self, token: &str) -> AppResult<AuthResult> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::auth_invalid(format!("Invalid token: {e}")))?;

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid token subject"))?;

        Ok(AuthResult {
            user_id,
            role: token_data.claims.role,
        })
    }
}
