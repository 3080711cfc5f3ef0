//! Per-request gate context.
//!
//! A [`GateContext`] is created when a request enters the gateway, enriched
//! by the auth gate as it works through the request, and dropped when the
//! response leaves. Nothing in it survives the request.

use uuid::Uuid;

use crate::identity::SessionIdentity;

/// Context that accompanies a single request through the auth gate.
///
/// # Example
///
/// ```
/// use janus_core::GateContext;
///
/// let mut ctx = GateContext::new("/orders", "https://svc.example/orders", Some("text/html"));
/// assert!(ctx.accepts_html());
/// assert!(ctx.credential().is_none());
///
/// ctx.set_credential("tok-123");
/// assert_eq!(ctx.credential(), Some("tok-123"));
/// ```
#[derive(Debug, Clone)]
pub struct GateContext {
    /// Unique identifier for this request (UUID v7).
    request_id: Uuid,

    /// The requested route, without query string.
    path: String,

    /// The full original URL, used as a redirect target.
    original_url: String,

    /// Content-negotiation hint from the client.
    accept: Option<String>,

    /// Bearer credential extracted from the request, if any.
    credential: Option<String>,

    /// Session metadata attached after a successful introspection.
    session: Option<SessionIdentity>,
}

impl GateContext {
    /// Creates a context for an inbound request.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        original_url: impl Into<String>,
        accept: Option<&str>,
    ) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            path: path.into(),
            original_url: original_url.into(),
            accept: accept.map(ToString::to_string),
            credential: None,
            session: None,
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the requested path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the full original URL of the request.
    #[must_use]
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Returns the Accept header value, if the client sent one.
    #[must_use]
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Returns true if the client negotiates for HTML.
    ///
    /// Browser clients can be redirected to a login or admin surface;
    /// everything else gets machine-readable status codes instead.
    #[must_use]
    pub fn accepts_html(&self) -> bool {
        self.accept
            .as_deref()
            .is_some_and(|accept| accept.contains("text/html"))
    }

    /// Returns the extracted credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Sets the extracted credential.
    ///
    /// This should only be called by the credential extractor.
    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.credential = Some(credential.into());
    }

    /// Returns the attached session identity, if introspection succeeded.
    #[must_use]
    pub fn session(&self) -> Option<&SessionIdentity> {
        self.session.as_ref()
    }

    /// Attaches session metadata from an active introspection result.
    ///
    /// This should only be called by the auth gate.
    pub fn set_session(&mut self, session: SessionIdentity) {
        self.session = Some(session);
    }
}
