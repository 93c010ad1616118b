use std::net::IpAddr;

use poem::Request;

use crate::errors::InternalError;
use crate::providers::AuthorizationProvider;
use crate::types::internal::{ClientMeta, RequestContext};

/// Client IP, honouring reverse-proxy headers before the socket address
pub fn extract_ip_address(req: &Request) -> Option<IpAddr> {
    // Check X-Forwarded-For header (proxy/load balancer)
    if let Some(forwarded) = req.header("X-Forwarded-For") {
        if let Some(ip) = forwarded.split(',').next() {
            if let Ok(ip) = ip.trim().parse() {
                return Some(ip);
            }
        }
    }

    // Check X-Real-IP header (nginx)
    if let Some(real_ip) = req.header("X-Real-IP") {
        if let Ok(ip) = real_ip.trim().parse() {
            return Some(ip);
        }
    }

    req.remote_addr().as_socket_addr().map(|addr| addr.ip())
}

pub fn extract_user_agent(req: &Request) -> Option<String> {
    req.header("User-Agent")
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .map(str::to_string)
}

pub fn client_meta(req: &Request) -> ClientMeta {
    ClientMeta::new(extract_ip_address(req), extract_user_agent(req))
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &Request) -> Option<&str> {
    let header = req.header("Authorization")?;
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Unauthenticated context carrying the client metadata
pub fn create_request_context(req: &Request) -> RequestContext {
    RequestContext::for_api(client_meta(req))
}

/// Context with the verified caller attached
///
/// Fails with an authentication error when the header is missing or the
/// token does not verify.
pub fn authenticated_context(
    req: &Request,
    authorization_provider: &AuthorizationProvider,
) -> Result<RequestContext, InternalError> {
    authorization_provider.authenticate(create_request_context(req), bearer_token(req))
}
