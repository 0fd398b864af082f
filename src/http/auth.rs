//! Bearer-JWT extractor for editor endpoints.
//!
//! Tokens are minted by the external identity provider; this server only
//! validates them. The token says *who* the caller is. Whether that caller
//! may edit is looked up in the editor directory on every request.

use actix_web::{
    dev::Payload,
    error::{ErrorInternalServerError, ErrorUnauthorized},
    http::header,
    web, FromRequest, HttpRequest, Result as ActixResult,
};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::DirectoryEditor;
use crate::state::AppState;

/// Token payload issued by the identity provider. `sub` is the caller's user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Validated caller identity.
#[derive(Debug, Clone)]
pub struct JwtAuth {
    pub user_id: Uuid,
}

impl JwtAuth {
    /// Capability check bound to this caller.
    pub fn editor<'a>(&self, state: &'a AppState) -> DirectoryEditor<'a> {
        DirectoryEditor::new(state.editors.as_ref(), self.user_id)
    }
}

/// `Authorization: Bearer <jwt>` → verified user id.
fn bearer_user(req: &HttpRequest) -> ActixResult<Uuid> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ErrorInternalServerError("application state not registered"))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ErrorUnauthorized("missing Authorization header"))?
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ErrorUnauthorized("malformed Authorization header"))?;

    let key = DecodingKey::from_secret(state.jwt_secret.as_bytes());
    let claims = decode::<Claims>(token, &key, &Validation::default())
        .map_err(|_| ErrorUnauthorized("token rejected"))?
        .claims;

    Uuid::parse_str(&claims.sub).map_err(|_| ErrorUnauthorized("subject is not a user id"))
}

impl FromRequest for JwtAuth {
    type Error = actix_web::Error;
    type Future = Ready<ActixResult<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(bearer_user(req).map(|user_id| JwtAuth { user_id }))
    }
}
