//! Header handling shared by both directions of a forward.
//!
//! # Responsibilities
//! - Identify hop-by-hop headers, which only describe a single connection
//! - Copy end-to-end headers between header maps with append semantics
//! - Tag responses with the backend that served them
//!
//! # Design Decisions
//! - Hop-by-hop headers are dropped; each HTTP stack frames its own connection
//! - Multi-valued headers keep every value

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

/// Response header naming the backend that served the request.
pub const LB_FROM: HeaderName = HeaderName::from_static("lb-from");

/// Headers that apply to one connection only.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == header::CONNECTION
        || name == header::TE
        || name == header::TRAILER
        || name == header::TRANSFER_ENCODING
        || name == header::UPGRADE
        || name == header::PROXY_AUTHENTICATE
        || name.as_str() == "keep-alive"
        || name.as_str() == "proxy-connection"
}

/// Append every end-to-end header of `from` onto `to`.
pub fn copy_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from.iter() {
        if is_hop_by_hop(name) {
            continue;
        }
        to.append(name.clone(), value.clone());
    }
}

/// Set `lb-from` to the backend address.
pub fn tag_backend(headers: &mut HeaderMap, address: &str) {
    match HeaderValue::from_str(address) {
        Ok(value) => {
            headers.insert(LB_FROM, value);
        }
        Err(e) => tracing::warn!(addr = %address, error = %e, "Backend address is not a valid header value"),
    }
}
