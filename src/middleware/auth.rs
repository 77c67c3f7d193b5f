use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Claims issued by the hosted auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

pub const HR_ROLES: [&str; 2] = ["hr", "admin"];

#[derive(Clone)]
pub struct AuthKeys {
    decoding: Arc<DecodingKey>,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| data.claims)
    }
}

fn unauthorized(code: &str) -> Error {
    Error::Unauthorized(code.to_string())
}

/// Lets the request through only with a valid bearer token whose role is HR or admin.
/// The verified claims are placed in the request extensions.
pub async fn require_hr_role(
    State(keys): State<AuthKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("missing_authorization"))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("bad_authorization"))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("unsupported_scheme"))?;
    let claims = keys
        .verify(token)
        .ok_or_else(|| unauthorized("invalid_token"))?;

    let role = claims.role.clone().unwrap_or_default();
    if !HR_ROLES.iter().any(|r| r.eq_ignore_ascii_case(&role)) {
        tracing::warn!(sub = %claims.sub, role = %role, "Rejected non-HR caller");
        return Err(Error::Forbidden("forbidden".into()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
