//! The decision engine.
//!
//! A pure, deterministic mapping from request metadata and an introspection
//! result to exactly one [`Action`]. All I/O stays in the gate; re-running
//! [`decide`] on the same inputs always yields the same action.
//!
//! The table is evaluated in order, first match wins:
//!
//! 1. Public path → serve, bypassing all authentication.
//! 2. No credential → redirect HTML clients to login, 401 everyone else.
//! 3. Authority unavailable → 503, regardless of client type.
//! 4. Session inactive → 401 with a session-expired detail.
//! 5. Active → plan/redirect sub-policy for HTML clients, serve otherwise.
//!
//! The public bypass must precede all credential logic: health checks and
//! API documentation must never be gated, even while the authority is down.

use std::collections::HashSet;

use janus_core::{GateContext, Plan, RedirectHint, SessionIdentity};

/// Detail message for requests carrying no credential.
pub const UNAUTHORIZED_DETAIL: &str = "Unauthorized";

/// Detail message for inactive or expired sessions.
pub const SESSION_EXPIRED_DETAIL: &str = "Session expired";

/// Detail message when the introspection authority cannot be reached.
pub const AUTH_UNREACHABLE_DETAIL: &str = "Auth service unreachable";

/// The single outcome of the decision engine for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Forward the request to downstream handlers.
    Serve,
    /// Issue a 302 to the given URL.
    RedirectTo(String),
    /// Short-circuit with a 401 carrying the given detail message.
    Unauthorized(&'static str),
    /// Short-circuit with a 503; the authority is unreachable.
    ServiceUnavailable,
}

/// The introspection input to the decision engine.
#[derive(Debug, Clone, Copy)]
pub enum Introspection<'a> {
    /// No credential was present, so no introspection was attempted.
    NotAttempted,
    /// The authority could not be reached or answered unusably.
    Unavailable,
    /// The authority answered: the session is not valid.
    Inactive,
    /// The authority answered: the session is valid.
    Active(&'a SessionIdentity),
}

/// Immutable policy configuration for the decision engine.
///
/// Constructed once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    /// Login page URL, the target of unauthenticated browser redirects.
    login_url: String,
    /// Paths exempt from authentication entirely.
    public_paths: HashSet<String>,
}

impl GatePolicy {
    /// Paths that are always public: health checks and API documentation.
    pub const DEFAULT_PUBLIC_PATHS: [&'static str; 3] = ["/health", "/docs", "/openapi.json"];

    /// Creates a policy with the default public path set.
    #[must_use]
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            public_paths: Self::DEFAULT_PUBLIC_PATHS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Adds a path to the public set.
    #[must_use]
    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.insert(path.into());
        self
    }

    /// Returns the login page URL.
    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Returns true if the path is exempt from authentication.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    /// The login redirect target, carrying the original URL back.
    fn login_redirect(&self, original_url: &str) -> String {
        format!("{}?redirect_url={}", self.login_url, original_url)
    }

    /// The admin surface URL.
    fn admin_url(&self) -> String {
        format!("{}/admin", self.login_url)
    }
}

/// Maps one request to exactly one action. Pure; performs no I/O.
#[must_use]
pub fn decide(policy: &GatePolicy, ctx: &GateContext, introspection: Introspection<'_>) -> Action {
    if policy.is_public(ctx.path()) {
        return Action::Serve;
    }

    if ctx.credential().is_none() {
        return if ctx.accepts_html() {
            Action::RedirectTo(policy.login_redirect(ctx.original_url()))
        } else {
            Action::Unauthorized(UNAUTHORIZED_DETAIL)
        };
    }

    match introspection {
        // A credentialed request whose introspection never produced an
        // answer is indistinguishable from an unreachable authority.
        Introspection::NotAttempted | Introspection::Unavailable => Action::ServiceUnavailable,
        Introspection::Inactive => Action::Unauthorized(SESSION_EXPIRED_DETAIL),
        Introspection::Active(session) => decide_active(policy, ctx, session),
    }
}

/// The plan/redirect sub-policy for an active session.
///
/// Only browser clients are ever redirected; API clients proceed to serve
/// once the session is active.
fn decide_active(policy: &GatePolicy, ctx: &GateContext, session: &SessionIdentity) -> Action {
    if !ctx.accepts_html() {
        return Action::Serve;
    }

    match (&session.plan, &session.redirect) {
        (Plan::Free, RedirectHint::Microservice) => {
            Action::RedirectTo(ctx.original_url().to_string())
        }
        (Plan::Paid, RedirectHint::Admin) => Action::RedirectTo(policy.admin_url()),
        _ => Action::Serve,
    }
}
