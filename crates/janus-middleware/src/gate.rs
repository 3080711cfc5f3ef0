//! The auth gate.
//!
//! [`AuthGate`] orchestrates the interception pipeline for every inbound
//! request: public-path check, credential extraction, remote introspection,
//! the pure decision, and finally executing exactly the returned action.
//!
//! The gate holds no state across requests beyond the immutable
//! [`GatePolicy`] and the introspection client; concurrent requests share
//! nothing mutable.

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, warn};

use janus_core::GateContext;
use janus_introspect::{Introspect, IntrospectionOutcome};

use crate::decision::{decide, Action, GatePolicy, Introspection, AUTH_UNREACHABLE_DETAIL};
use crate::extract;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Middleware that authenticates every request against the central
/// authority before it can reach downstream handlers.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use janus_introspect::IntrospectionClient;
/// use janus_middleware::{AuthGate, GatePolicy};
///
/// let client = IntrospectionClient::new(
///     "https://auth.internal/introspect",
///     "orders-svc",
///     "s3cret",
/// )?;
/// let gate = AuthGate::new(
///     GatePolicy::new("https://auth.internal/login"),
///     Arc::new(client),
/// );
/// ```
pub struct AuthGate {
    /// Immutable decision policy, built once at startup.
    policy: GatePolicy,
    /// Client for the remote introspection authority.
    introspector: Arc<dyn Introspect>,
}

impl AuthGate {
    /// Creates a new auth gate.
    #[must_use]
    pub fn new(policy: GatePolicy, introspector: Arc<dyn Introspect>) -> Self {
        Self {
            policy,
            introspector,
        }
    }

    /// Returns the gate's policy.
    #[must_use]
    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Executes a short-circuit action as a response. `Serve` is handled by
    /// the caller, which owns `next`.
    fn short_circuit(&self, ctx: &GateContext, action: &Action) -> Response {
        match action {
            Action::RedirectTo(url) => {
                if url == ctx.original_url() {
                    // The deployment must route the second pass differently
                    // (e.g. a different host in front of the gate) or the
                    // client will loop on this URL.
                    warn!(
                        request_id = %ctx.request_id(),
                        url = %url,
                        "redirecting request back to its own URL"
                    );
                }
                debug!(request_id = %ctx.request_id(), url = %url, "redirect");
                Response::redirect(url)
            }
            Action::Unauthorized(detail) => {
                debug!(request_id = %ctx.request_id(), detail, "unauthorized");
                Response::detail_json(StatusCode::UNAUTHORIZED, detail)
            }
            Action::ServiceUnavailable => {
                warn!(request_id = %ctx.request_id(), "auth service unreachable");
                Response::detail_json(StatusCode::SERVICE_UNAVAILABLE, AUTH_UNREACHABLE_DETAIL)
            }
            Action::Serve => unreachable!("serve is executed by the caller"),
        }
    }
}

impl Middleware for AuthGate {
    fn name(&self) -> &'static str {
        "auth_gate"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut GateContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if self.policy.is_public(ctx.path()) {
                debug!(request_id = %ctx.request_id(), path = %ctx.path(), "public path bypass");
                return next.run(ctx, request).await;
            }

            let credential = extract::credential_from(request.headers());
            if let Some(ref credential) = credential {
                ctx.set_credential(credential.clone());
            }

            // The one suspension point: a fresh, bounded introspection per
            // credentialed request. No retry, no cache.
            let outcome = match &credential {
                Some(credential) => Some(self.introspector.introspect(credential).await),
                None => None,
            };

            // Active sessions annotate the context before the sub-policy
            // runs, so downstream handlers see identity/roles/plan even
            // when the final action is a redirect.
            if let Some(IntrospectionOutcome::Active(session)) = &outcome {
                ctx.set_session(session.clone());
            }

            let introspection = match &outcome {
                None => Introspection::NotAttempted,
                Some(IntrospectionOutcome::Unavailable) => Introspection::Unavailable,
                Some(IntrospectionOutcome::Inactive) => Introspection::Inactive,
                Some(IntrospectionOutcome::Active(session)) => Introspection::Active(session),
            };

            let action = decide(&self.policy, ctx, introspection);
            match action {
                Action::Serve => next.run(ctx, request).await,
                other => self.short_circuit(ctx, &other),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::header::{AUTHORIZATION, LOCATION};
    use http::{Request as HttpRequest, Response as HttpResponse};
    use http_body_util::Full;
    use janus_core::{Plan, RedirectHint, SessionIdentity};

    /// A fabricated authority that always answers the same way.
    struct StaticAuthority {
        outcome: IntrospectionOutcome,
    }

    impl Introspect for StaticAuthority {
        fn introspect<'a>(&'a self, _credential: &'a str) -> BoxFuture<'a, IntrospectionOutcome> {
            Box::pin(async move { self.outcome.clone() })
        }
    }

    fn gate(outcome: IntrospectionOutcome) -> AuthGate {
        AuthGate::new(
            GatePolicy::new("https://auth.example/login"),
            Arc::new(StaticAuthority { outcome }),
        )
    }

    fn request(path: &str, token: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    fn ok_handler() -> Next<'static> {
        Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from("downstream")))
                    .unwrap()
            })
        })
    }

    fn active_session() -> SessionIdentity {
        SessionIdentity {
            user: serde_json::json!("alice"),
            roles: vec!["user".to_string()],
            plan: Plan::Paid,
            redirect: RedirectHint::Microservice,
        }
    }

    #[test]
    fn test_gate_name() {
        let gate = gate(IntrospectionOutcome::Inactive);
        assert_eq!(gate.name(), "auth_gate");
    }

    #[tokio::test]
    async fn test_public_path_skips_introspection() {
        // An unavailable authority must not gate health checks.
        let gate = gate(IntrospectionOutcome::Unavailable);
        let mut ctx = GateContext::new("/health", "https://svc/health", None);

        let response = gate
            .process(&mut ctx, request("/health", None), ok_handler())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_active_session_is_attached_and_served() {
        let gate = gate(IntrospectionOutcome::Active(active_session()));
        let mut ctx = GateContext::new("/orders", "https://svc/orders", Some("application/json"));

        let response = gate
            .process(&mut ctx, request("/orders", Some("tok")), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let session = ctx.session().expect("session attached");
        assert_eq!(session.user_label(), "alice");
        assert_eq!(session.plan, Plan::Paid);
    }

    #[tokio::test]
    async fn test_inactive_session_short_circuits() {
        let gate = gate(IntrospectionOutcome::Inactive);
        let mut ctx = GateContext::new("/orders", "https://svc/orders", Some("application/json"));

        let response = gate
            .process(&mut ctx, request("/orders", Some("tok")), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(ctx.session().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_authority_short_circuits_with_503() {
        let gate = gate(IntrospectionOutcome::Unavailable);
        let mut ctx = GateContext::new("/orders", "https://svc/orders", Some("text/html"));

        let response = gate
            .process(&mut ctx, request("/orders", Some("tok")), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_missing_credential_redirects_browser() {
        let gate = gate(IntrospectionOutcome::Inactive);
        let mut ctx = GateContext::new("/orders", "https://svc/orders", Some("text/html"));

        let response = gate
            .process(&mut ctx, request("/orders", None), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "https://auth.example/login?redirect_url=https://svc/orders"
        );
    }

    #[tokio::test]
    async fn test_session_attached_even_when_redirecting() {
        let gate = gate(IntrospectionOutcome::Active(SessionIdentity {
            user: serde_json::json!("bob"),
            roles: vec![],
            plan: Plan::Paid,
            redirect: RedirectHint::Admin,
        }));
        let mut ctx = GateContext::new("/app", "https://svc/app", Some("text/html"));

        let response = gate
            .process(&mut ctx, request("/app", Some("tok")), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(ctx.session().is_some());
    }
}
