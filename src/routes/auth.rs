use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::{header, StatusCode};
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid bearer token: {0}")]
    InvalidToken(String),

    #[error("authentication is not configured")]
    Misconfigured,
}

impl actix_web::ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Decoding material for bearer tokens, registered as app data.
#[derive(Clone)]
pub struct AuthKeys {
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// The person identity carried by a validated bearer token.
///
/// Person-scoped handlers take this extractor; there is no fallback
/// identity, so an unauthenticated request never reaches the core.
#[derive(Debug, Clone)]
pub struct AuthenticatedPerson {
    pub person_id: String,
}

impl FromRequest for AuthenticatedPerson {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthenticatedPerson, AuthError> {
    let keys = req
        .app_data::<web::Data<AuthKeys>>()
        .ok_or(AuthError::Misconfigured)?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingToken)?;

    let data = decode::<Claims>(token, &keys.decoding, &keys.validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(AuthenticatedPerson {
        person_id: data.claims.sub,
    })
}
