//! Bearer token authentication and role based authorization.
//!
//! Tokens are HS256 JWTs carrying `{id, role}`. They are not issued with an
//! expiry claim and none is required when verifying.
//!
//! Each protected route group is wrapped in [`authorize`], parameterized by an
//! [`Access`] implementation listing the roles allowed through. The verified
//! [`Identity`] is placed in the request extensions for the handler.

use crate::backend::AppointmentBackend;
use crate::error::AppError;
use crate::types::{Identity, Role};
use crate::AppState;
use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub trait Access: Send + Sync + 'static {
    const ROLES: &'static [Role];
}

pub struct StudentAccess;

impl Access for StudentAccess {
    const ROLES: &'static [Role] = &[Role::Student];
}

pub struct ProfessorAccess;

impl Access for ProfessorAccess {
    const ROLES: &'static [Role] = &[Role::Professor];
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i32>,
    role: String,
}

#[derive(Clone)]
pub struct Authenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    hash_cost: u32,
}

impl Authenticator {
    pub fn new(secret: &str, hash_cost: u32) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            hash_cost,
        }
    }

    pub fn issue_token(&self, identity: Identity) -> Result<String, AppError> {
        let claims = Claims {
            id: Some(identity.id),
            role: identity.role.to_string(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AppError::Internal(format!("Token signing failed: {err}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<Identity, AppError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| {
                warn!(?err, "Token verification failed");
                AppError::InvalidToken
            })?
            .claims;

        let Some(id) = claims.id else {
            warn!("Token without user id rejected");
            return Err(AppError::InvalidToken);
        };

        // A validly signed role outside the known set passes no role gate.
        let role = claims.role.parse::<Role>().map_err(|err| {
            warn!(user_id = id, %err, "Token with unknown role rejected");
            AppError::Forbidden
        })?;

        Ok(Identity { id, role })
    }

    /// Reads `Authorization: Bearer <token>` and verifies the token.
    pub fn identify(&self, headers: &HeaderMap) -> Result<Identity, AppError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(' ').nth(1))
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        self.verify_token(token)
    }

    pub async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|err| AppError::Internal(format!("Hashing task failed: {err}")))?
            .map_err(|err| AppError::Internal(format!("Password hashing failed: {err}")))
    }

    pub async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|err| AppError::Internal(format!("Hashing task failed: {err}")))?
            .map_err(|err| AppError::Internal(format!("Password verification failed: {err}")))
    }
}

pub async fn authorize<A: Access, T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = state.authenticator.identify(request.headers())?;

    if !A::ROLES.contains(&identity.role) {
        warn!(
            user_id = identity.id,
            role = %identity.role,
            path = %request.uri().path(),
            "Role not permitted on route"
        );
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
