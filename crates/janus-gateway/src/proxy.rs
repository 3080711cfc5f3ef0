//! Upstream forwarding for served requests.
//!
//! Once the auth gate decides to serve, the request is forwarded to the
//! upstream application with the session's identity context attached as
//! headers, so downstream handlers can do their own per-route checks
//! without talking to the authority again.

use std::time::Duration;

use http_body_util::{BodyExt, Full};
use reqwest::Client;
use tracing::debug;
use uuid::Uuid;

use janus_core::{GateContext, GateError, GateResult};
use janus_middleware::{Request, Response};

/// Header carrying the opaque user descriptor downstream.
pub const AUTH_USER_HEADER: &str = "x-auth-user";

/// Header carrying the session roles downstream, comma-joined.
pub const AUTH_ROLES_HEADER: &str = "x-auth-roles";

/// Header carrying the plan tier downstream.
pub const AUTH_PLAN_HEADER: &str = "x-auth-plan";

/// Header carrying the gateway request ID downstream and back.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identity context attached to a forwarded request.
///
/// Captured from the [`GateContext`] before forwarding, so the forward
/// future does not need to borrow the context.
#[derive(Debug, Clone, Default)]
pub struct ForwardIdentity {
    /// Gateway request ID.
    pub request_id: Option<Uuid>,
    /// String form of the user descriptor.
    pub user: Option<String>,
    /// Comma-joined roles.
    pub roles: Option<String>,
    /// Plan tier.
    pub plan: Option<String>,
}

impl From<&GateContext> for ForwardIdentity {
    fn from(ctx: &GateContext) -> Self {
        let session = ctx.session();
        Self {
            request_id: Some(ctx.request_id()),
            user: session.map(|s| s.user_label()),
            roles: session.map(|s| s.roles().join(",")),
            plan: session.map(|s| s.plan.as_str().to_string()),
        }
    }
}

/// HTTP client for forwarding served requests to the upstream application.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    /// HTTP client with the timeout baked in.
    client: Client,
    /// Upstream base URL.
    upstream_url: String,
}

impl UpstreamClient {
    /// Create a new upstream client.
    pub fn new(upstream_url: impl Into<String>, timeout: Duration) -> GateResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(100)
            .build()
            .map_err(|e| GateError::config(format!("failed to create client: {e}")))?;

        Ok(Self {
            client,
            upstream_url: upstream_url.into(),
        })
    }

    /// Get the upstream base URL.
    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    /// Forward a served request to the upstream application.
    pub async fn forward(&self, identity: &ForwardIdentity, request: Request) -> GateResult<Response> {
        let (parts, body) = request.into_parts();
        let path = parts
            .uri
            .path_and_query()
            .map_or_else(|| "/".to_string(), ToString::to_string);
        let url = format!("{}{}", self.upstream_url, path);

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        debug!(url = %url, method = %parts.method, "forwarding upstream");

        let mut builder = self.client.request(parts.method, &url).body(body);

        for (name, value) in &parts.headers {
            if !is_hop_by_hop_header(name.as_str()) {
                builder = builder.header(name, value);
            }
        }

        if let Some(request_id) = identity.request_id {
            builder = builder.header(REQUEST_ID_HEADER, request_id.to_string());
        }
        if let Some(ref user) = identity.user {
            builder = builder.header(AUTH_USER_HEADER, user);
        }
        if let Some(ref roles) = identity.roles {
            builder = builder.header(AUTH_ROLES_HEADER, roles);
        }
        if let Some(ref plan) = identity.plan {
            builder = builder.header(AUTH_PLAN_HEADER, plan);
        }

        let upstream = builder
            .send()
            .await
            .map_err(|e| GateError::upstream(format!("request failed: {e}")))?;

        let status = upstream.status();
        let headers = upstream.headers().clone();
        let body = upstream
            .bytes()
            .await
            .map_err(|e| GateError::upstream(format!("failed to read body: {e}")))?;

        let mut builder = http::Response::builder().status(status);
        for (name, value) in &headers {
            if !is_hop_by_hop_header(name.as_str()) {
                builder = builder.header(name, value);
            }
        }

        builder
            .body(Full::new(body))
            .map_err(|e| GateError::upstream(format!("invalid upstream response: {e}")))
    }
}

/// Check if a header is hop-by-hop (must not be forwarded).
pub fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}
