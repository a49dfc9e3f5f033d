//! Request extractors for caller identity and submission origin

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use formforge_core::OwnerId;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated creator, as asserted by the fronting auth proxy
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Caller(pub OwnerId);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(|id| Caller(OwnerId::new(id)))
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Network origin of a submission, used as the throttle key
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientOrigin(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(ClientOrigin(forwarded_origin(&parts.headers).or(peer)))
    }
}

fn forwarded_origin(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .or_else(|| header("x-real-ip"))
        .map(str::to_string)
}
