use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as CookieDuration;
use tracing::debug;

use crate::models::Identity;
use crate::services::{SessionData, SessionService, UsageService, SESSION_COOKIE};
use crate::utils::AppError;

/// Per-request identity resolved by the session middleware and stored in
/// request extensions.
#[derive(Clone, Debug)]
pub struct RequestIdentity {
    pub session: SessionData,
    /// Whether the session already existed in the store when this request
    /// arrived. Brand-new sessions don't count for usage until a handler
    /// persists them.
    pub persisted: bool,
    pub user_id: Option<String>,
    pub ip: Option<String>,
}

impl RequestIdentity {
    pub fn identity(&self) -> Identity {
        UsageService::resolve_identity(
            self.user_id.as_deref(),
            Some(&self.session.id),
            self.persisted,
            self.ip.as_deref(),
        )
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Client address for rate limiting, falling back to a shared bucket.
    pub fn client_ip(&self) -> &str {
        self.ip.as_deref().unwrap_or("unknown")
    }
}

/// Resolve the caller's session from the `vb_sid` cookie.
///
/// Unknown or missing cookies get a fresh guest session. The cookie is set
/// on the way out; the session itself is only written to Redis once a
/// handler has a reason to keep it.
pub async fn resolve_session(
    State(sessions): State<Arc<SessionService>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request, addr);

    let cookie_sid = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (session, persisted) = match &cookie_sid {
        Some(sid) => match sessions.load(sid).await? {
            Some(session) => (session, true),
            None => (SessionData::new_guest(), false),
        },
        None => (SessionData::new_guest(), false),
    };

    let needs_cookie = cookie_sid.as_deref() != Some(session.id.as_str());
    let session_id = session.id.clone();
    let identity = RequestIdentity {
        user_id: session.user_id.clone(),
        session,
        persisted,
        ip,
    };
    debug!(
        "🪪 Request identity: {} (persisted: {})",
        identity.identity().key(),
        persisted
    );
    request.extensions_mut().insert(identity);

    let mut response = next.run(request).await;

    if needs_cookie {
        let cookie = session_cookie(&session_id, sessions.ttl_secs());
        let value = cookie
            .to_string()
            .parse()
            .map_err(|_| AppError::InternalError("Invalid session cookie".to_string()))?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// Expired cookie sent on logout to clear the browser's session id.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::ZERO)
        .build()
}

fn session_cookie(session_id: &str, ttl_secs: u64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(ttl_secs as i64))
        .build()
}

/// Prefer the first X-Forwarded-For hop, fall back to the socket peer.
fn client_ip(request: &Request, addr: SocketAddr) -> Option<String> {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }
    Some(addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc123", 604800);
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("vb_sid=abc123"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
    }
}
