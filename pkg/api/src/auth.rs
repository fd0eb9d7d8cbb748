//! Identity middleware for the aggregated apiserver.
//!
//! The front proxy (the main apiserver) authenticates the caller and passes
//! its identity in `X-Remote-User` / `X-Remote-Group` / `X-Remote-Extra-*`
//! headers. This middleware parses those into an `Identity` request extension.
//!
//! Missing headers are not rejected here: each handler applies its own
//! policy (the bulk review handler treats an anonymous caller as a server
//! error, the accessible-namespace handlers answer with an empty list or
//! NotFound without disclosing anything).

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use std::collections::HashMap;
use tracing::debug;

use pkg_constants::auth::{
    REMOTE_EXTRA_HEADER_PREFIX, REMOTE_GROUP_HEADER, REMOTE_USER_HEADER,
};
use pkg_types::user::UserInfo;

/// The caller's identity as resolved by `identity_middleware`. `None` means
/// the request carried no identity headers.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<UserInfo>);

/// Middleware: parse front-proxy identity headers into an `Identity`
/// extension. Always inserts the extension, so handlers can rely on it.
pub async fn identity_middleware(mut req: Request, next: Next) -> Response {
    let user = user_from_headers(req.headers());
    if let Some(user) = &user {
        debug!("Authenticated request from {}", user.name);
    }
    req.extensions_mut().insert(Identity(user));
    next.run(req).await
}

/// Build a `UserInfo` from front-proxy headers, or `None` when no user
/// header is present. Group headers may repeat; extra headers contribute one
/// value per occurrence under their suffix key.
pub fn user_from_headers(headers: &HeaderMap) -> Option<UserInfo> {
    let name = headers
        .get(REMOTE_USER_HEADER)?
        .to_str()
        .ok()
        .filter(|s| !s.is_empty())?
        .to_string();

    let groups = headers
        .get_all(REMOTE_GROUP_HEADER)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let mut extra: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in headers.iter() {
        let Some(extra_key) = key.as_str().strip_prefix(REMOTE_EXTRA_HEADER_PREFIX) else {
            continue;
        };
        if let Ok(value) = value.to_str() {
            extra
                .entry(extra_key.to_string())
                .or_default()
                .push(value.to_string());
        }
    }

    Some(UserInfo {
        name,
        groups,
        extra,
    })
}
