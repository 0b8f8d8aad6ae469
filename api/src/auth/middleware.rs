use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::TypedHeader;
use headers::{Origin, UserAgent};
use std::{net::SocketAddr, time::Instant};

use crate::auth::claims::AuthUser;

/// Logs one line per request once the response is ready: method, path,
/// status, latency, peer address, caller (0 when anonymous), origin and
/// user-agent. CORS preflights pass through silently.
///
/// ```ignore
/// let app = Router::new().layer(axum::middleware::from_fn(log_request));
/// ```
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    if parts.method == Method::OPTIONS {
        return next.run(Request::from_parts(parts, body)).await;
    }

    let ip = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".into());

    let user_id = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map(|AuthUser(c)| c.sub)
        .unwrap_or(0);

    let origin = TypedHeader::<Origin>::from_request_parts(&mut parts, &())
        .await
        .map(|TypedHeader(o)| o.to_string())
        .unwrap_or_else(|_| "unknown".into());

    let user_agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &())
        .await
        .map(|TypedHeader(ua)| ua.to_string())
        .unwrap_or_else(|_| "unknown".into());

    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    let started = Instant::now();

    let response = next.run(Request::from_parts(parts, body)).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        %ip,
        user = user_id,
        %origin,
        %user_agent,
        "request"
    );
    response
}
