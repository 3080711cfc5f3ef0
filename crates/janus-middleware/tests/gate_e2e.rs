//! End-to-end gate integration tests.
//!
//! These drive the full interception pipeline: credential extraction,
//! introspection against a fabricated authority, the decision engine, and
//! action execution, verifying the user-visible contract for each scenario.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, COOKIE, LOCATION};
use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
use http_body_util::{BodyExt, Full};

use janus_core::{GateContext, Plan, RedirectHint, SessionIdentity};
use janus_introspect::{BoxFuture, Introspect, IntrospectionOutcome};
use janus_middleware::{decision, AuthGate, GatePolicy, Middleware, Next, Request, Response};

/// A fabricated introspection authority with a fixed answer.
struct StaticAuthority {
    outcome: IntrospectionOutcome,
}

impl Introspect for StaticAuthority {
    fn introspect<'a>(&'a self, _credential: &'a str) -> BoxFuture<'a, IntrospectionOutcome> {
        Box::pin(async move { self.outcome.clone() })
    }
}

fn gate_with(outcome: IntrospectionOutcome) -> AuthGate {
    AuthGate::new(
        GatePolicy::new("https://auth.example/login"),
        Arc::new(StaticAuthority { outcome }),
    )
}

fn make_request(path: &str, accept: Option<&str>, token: Option<&str>) -> Request {
    let mut builder = HttpRequest::builder().uri(path);
    if let Some(accept) = accept {
        builder = builder.header(ACCEPT, accept);
    }
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Full::new(Bytes::new())).unwrap()
}

fn make_context(path: &str, accept: Option<&str>) -> GateContext {
    GateContext::new(path, format!("https://x{path}"), accept)
}

fn downstream_handler() -> Next<'static> {
    Next::handler(|_ctx, _req| {
        Box::pin(async {
            HttpResponse::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::from(r#"{"status":"ok"}"#)))
                .unwrap()
        })
    })
}

async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

fn active(plan: Plan, redirect: RedirectHint) -> IntrospectionOutcome {
    IntrospectionOutcome::Active(SessionIdentity {
        user: serde_json::json!("alice"),
        roles: vec!["user".to_string()],
        plan,
        redirect,
    })
}

// Scenario 1: /health with no credential is served.
#[tokio::test]
async fn health_is_served_without_credential() {
    let gate = gate_with(IntrospectionOutcome::Unavailable);
    let mut ctx = make_context("/health", None);

    let response = gate
        .process(
            &mut ctx,
            make_request("/health", None, None),
            downstream_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

// Scenario 2: browser with no credential is redirected to login with the
// original URL carried along.
#[tokio::test]
async fn browser_without_credential_is_redirected_to_login() {
    let gate = gate_with(IntrospectionOutcome::Inactive);
    let mut ctx = make_context("/orders", Some("text/html"));

    let response = gate
        .process(
            &mut ctx,
            make_request("/orders", Some("text/html"), None),
            downstream_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "https://auth.example/login?redirect_url=https://x/orders"
    );
}

// Scenario 3: API client with no credential gets a 401 JSON body.
#[tokio::test]
async fn api_client_without_credential_gets_401() {
    let gate = gate_with(IntrospectionOutcome::Inactive);
    let mut ctx = make_context("/api/orders", Some("application/json"));

    let response = gate
        .process(
            &mut ctx,
            make_request("/api/orders", Some("application/json"), None),
            downstream_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(response).await, r#"{"detail":"Unauthorized"}"#);
}

// Scenario 4: free plan + microservice hint redirects the browser back to
// the original request URL.
#[tokio::test]
async fn free_plan_browser_is_redirected_to_same_url() {
    let gate = gate_with(active(Plan::Free, RedirectHint::Microservice));
    let mut ctx = make_context("/app", Some("text/html"));

    let response = gate
        .process(
            &mut ctx,
            make_request("/app", Some("text/html"), Some("tok")),
            downstream_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "https://x/app");
}

// Scenario 5: paid plan + admin hint redirects the browser to the admin
// surface under the login URL.
#[tokio::test]
async fn paid_plan_browser_is_redirected_to_admin() {
    let gate = gate_with(active(Plan::Paid, RedirectHint::Admin));
    let mut ctx = make_context("/app", Some("text/html"));

    let response = gate
        .process(
            &mut ctx,
            make_request("/app", Some("text/html"), Some("tok")),
            downstream_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "https://auth.example/login/admin"
    );
}

// Scenario 6: authority unreachable yields a 503 with the unreachable detail.
#[tokio::test]
async fn unreachable_authority_yields_503() {
    let gate = gate_with(IntrospectionOutcome::Unavailable);
    let mut ctx = make_context("/orders", Some("application/json"));

    let response = gate
        .process(
            &mut ctx,
            make_request("/orders", Some("application/json"), Some("tok")),
            downstream_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_string(response).await,
        r#"{"detail":"Auth service unreachable"}"#
    );
}

#[tokio::test]
async fn expired_session_detail_differs_from_missing_credential() {
    let gate = gate_with(IntrospectionOutcome::Inactive);
    let mut ctx = make_context("/orders", Some("application/json"));

    let response = gate
        .process(
            &mut ctx,
            make_request("/orders", Some("application/json"), Some("tok")),
            downstream_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_string(response).await,
        r#"{"detail":"Session expired"}"#
    );
}

#[tokio::test]
async fn cookie_credential_reaches_the_authority() {
    let gate = gate_with(active(Plan::Paid, RedirectHint::Microservice));
    let mut ctx = make_context("/orders", Some("application/json"));

    let request = HttpRequest::builder()
        .uri("/orders")
        .header(ACCEPT, "application/json")
        .header(COOKIE, "access_token=tok-cookie")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = gate.process(&mut ctx, request, downstream_handler()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.credential(), Some("tok-cookie"));
    assert!(ctx.session().is_some());
}

/// Downstream stage asserting the session annotation is visible.
struct SessionAssertingStage;

impl Middleware for SessionAssertingStage {
    fn name(&self) -> &'static str {
        "session_asserting"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut GateContext,
        request: Request,
        next: Next<'a>,
    ) -> janus_middleware::BoxFuture<'a, Response> {
        Box::pin(async move {
            assert_eq!(
                ctx.session().map(|s| s.plan.as_str()),
                Some("paid"),
                "downstream stage sees the attached session"
            );
            next.run(ctx, request).await
        })
    }
}

#[tokio::test]
async fn served_request_carries_session_to_downstream_stage() {
    let gate = gate_with(active(Plan::Paid, RedirectHint::Microservice));
    let inspect = SessionAssertingStage;

    let mut ctx = make_context("/orders", Some("application/json"));
    let chain = Next::chain(&inspect, downstream_handler());
    let response = gate
        .process(
            &mut ctx,
            make_request("/orders", Some("application/json"), Some("tok")),
            chain,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

// Purity: the decision engine gives the same action for the same inputs,
// every time.
#[test]
fn decision_engine_is_pure() {
    let policy = GatePolicy::new("https://auth.example/login");
    let mut ctx = make_context("/app", Some("text/html"));
    ctx.set_credential("tok");

    let session = SessionIdentity {
        user: serde_json::json!("alice"),
        roles: vec![],
        plan: Plan::Free,
        redirect: RedirectHint::Microservice,
    };

    let first = decision::decide(&policy, &ctx, decision::Introspection::Active(&session));
    for _ in 0..100 {
        let again = decision::decide(&policy, &ctx, decision::Introspection::Active(&session));
        assert_eq!(again, first);
    }
}
