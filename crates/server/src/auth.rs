//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs carrying the user's id, role and laboratory. Handlers
//! take [`CurrentUser`] or [`AdminUser`] as an argument to require one.

use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use database::context::RequestContext;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use models::user_type::UserType;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub user_type: UserType,
    pub lab_id: Option<i32>,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    const TOKEN_LIFETIME_DAYS: i64 = 7;

    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a token valid for seven days
    pub fn generate_token(
        &self,
        user_id: &str,
        user_type: UserType,
        lab_id: Option<i32>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.to_string(),
            user_type,
            lab_id,
            exp: (now + Duration::days(Self::TOKEN_LIFETIME_DAYS)).timestamp(),
            iat: now.timestamp(),
        };

        self.encode(&claims)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }
}

/// An authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub claims: Claims,
    pub ip_address: Option<String>,
}

impl CurrentUser {
    /// Identity handed to the services for authorization and auditing
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.claims.user_id.clone(), self.claims.user_type)
            .with_lab(self.claims.lab_id)
            .with_ip(self.ip_address.clone())
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing authorization token"))?;

        // The scheme prefix is optional
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

        let claims = state.jwt.verify_token(token).map_err(|e| {
            log::debug!("rejected token: {e}");
            ApiError::unauthorized("invalid or expired token")
        })?;

        Ok(Self {
            claims,
            ip_address: client_ip(parts, state.trust_proxy),
        })
    }
}

/// An authenticated admin
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.claims.user_type.is_admin() {
            return Err(ApiError::forbidden("admin privileges required"));
        }

        Ok(Self(user))
    }
}

/// Peer address of the connection, or the first `x-forwarded-for` hop when
/// the server sits behind a trusted proxy
fn client_ip(parts: &Parts, trust_proxy: bool) -> Option<String> {
    let forwarded = trust_proxy
        .then(|| parts.headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    forwarded.or_else(|| {
        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    })
}

#[cfg(test)]
mod test {
    use crate::auth::{Claims, JwtKeys, client_ip};
    use axum::{extract::ConnectInfo, http::Request};
    use chrono::Utc;
    use models::user_type::UserType;
    use std::net::SocketAddr;

    fn parts_from(peer: &str, forwarded: &str) -> axum::http::request::Parts {
        let mut request = Request::builder()
            .header("x-forwarded-for", forwarded)
            .body(())
            .unwrap();
        let peer: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request.into_parts().0
    }

    #[test]
    fn test_forwarded_header_ignored_without_trusted_proxy() {
        let parts = parts_from("10.0.0.7:51000", "203.0.113.9");
        assert_eq!(client_ip(&parts, false).as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn test_forwarded_header_used_behind_trusted_proxy() {
        let parts = parts_from("10.0.0.7:51000", "203.0.113.9, 10.0.0.1");
        assert_eq!(client_ip(&parts, true).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_token_carries_identity() {
        let keys = JwtKeys::new("test-secret");
        let token = keys
            .generate_token("2023001", UserType::Student, Some(1))
            .unwrap();
        let claims = keys.verify_token(&token).unwrap();

        assert_eq!(claims.user_id, "2023001");
        assert_eq!(claims.user_type, UserType::Student);
        assert_eq!(claims.lab_id, Some(1));
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = JwtKeys::new("one")
            .generate_token("admin", UserType::Admin, None)
            .unwrap();
        assert!(JwtKeys::new("two").verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = JwtKeys::new("test-secret");
        let issued = Utc::now().timestamp() - 8 * 24 * 60 * 60;
        let token = keys
            .encode(&Claims {
                user_id: "T001".to_string(),
                user_type: UserType::Teacher,
                lab_id: Some(1),
                exp: issued + 24 * 60 * 60,
                iat: issued,
            })
            .unwrap();

        assert!(keys.verify_token(&token).is_err());
    }
}
