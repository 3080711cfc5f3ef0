//! HTTP client for the introspection authority.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use janus_core::{GateError, GateResult};

use crate::outcome::{IntrospectionOutcome, IntrospectionResponse};

/// Header carrying the service-level client identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Header carrying the service-level client secret.
pub const CLIENT_SECRET_HEADER: &str = "x-client-secret";

/// Default timeout for the introspection call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// A boxed future returned by [`Introspect`] implementations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Credential validation seam.
///
/// The auth gate talks to the authority through this trait so tests can
/// substitute a fabricated authority without any network.
pub trait Introspect: Send + Sync + 'static {
    /// Validates a credential, returning exactly one outcome.
    ///
    /// Implementations must not panic on any authority behavior: a broken
    /// response maps to [`IntrospectionOutcome::Unavailable`].
    fn introspect<'a>(&'a self, credential: &'a str) -> BoxFuture<'a, IntrospectionOutcome>;
}

/// Client for the remote introspection endpoint.
///
/// One outbound `POST` per call, authenticated with the service client id
/// and secret alongside the user's bearer credential, bounded by a fixed
/// timeout so a hung authority cannot stall the gateway's serving capacity.
#[derive(Debug, Clone)]
pub struct IntrospectionClient {
    /// HTTP client with the timeout baked in.
    client: Client,
    /// Introspection endpoint URL.
    endpoint: String,
    /// Service-level client identifier.
    client_id: String,
    /// Service-level client secret.
    client_secret: String,
}

impl IntrospectionClient {
    /// Create a new introspection client with the default timeout.
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> GateResult<Self> {
        Self::with_timeout(endpoint, client_id, client_secret, DEFAULT_TIMEOUT)
    }

    /// Create a new introspection client with an explicit timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> GateResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::config(format!("failed to create client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    /// Get the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Perform one introspection call.
    ///
    /// Network failures, timeouts, and unparseable bodies all collapse into
    /// `Unavailable`; only a well-formed `active: false` answer becomes
    /// `Inactive`.
    pub async fn call(&self, credential: &str) -> IntrospectionOutcome {
        let result = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(CLIENT_SECRET_HEADER, &self.client_secret)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "introspection request failed");
                return IntrospectionOutcome::Unavailable;
            }
        };

        match response.json::<IntrospectionResponse>().await {
            Ok(parsed) => {
                debug!(active = parsed.active, "introspection answered");
                parsed.into_outcome()
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "unparseable introspection response");
                IntrospectionOutcome::Unavailable
            }
        }
    }
}

impl Introspect for IntrospectionClient {
    fn introspect<'a>(&'a self, credential: &'a str) -> BoxFuture<'a, IntrospectionOutcome> {
        Box::pin(self.call(credential))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client = IntrospectionClient::new("http://auth.internal/introspect", "svc", "secret")
            .expect("client builds");
        assert_eq!(client.endpoint(), "http://auth.internal/introspect");
    }

    #[tokio::test]
    async fn test_unreachable_authority_is_unavailable() {
        // Port 9 (discard) is not listening; the connect fails immediately.
        let client = IntrospectionClient::with_timeout(
            "http://127.0.0.1:9/introspect",
            "svc",
            "secret",
            Duration::from_millis(500),
        )
        .expect("client builds");

        let outcome = client.call("tok-123").await;
        assert_eq!(outcome, IntrospectionOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let client: std::sync::Arc<dyn Introspect> = std::sync::Arc::new(
            IntrospectionClient::with_timeout(
                "http://127.0.0.1:9/introspect",
                "svc",
                "secret",
                Duration::from_millis(500),
            )
            .expect("client builds"),
        );

        let outcome = client.introspect("tok-123").await;
        assert_eq!(outcome, IntrospectionOutcome::Unavailable);
    }
}
