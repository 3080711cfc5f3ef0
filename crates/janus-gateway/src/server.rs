//! Gateway HTTP server implementation.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn, Instrument};

use janus_core::{ErrorBody, GateContext, GateError, GateResult};
use janus_introspect::IntrospectionClient;
use janus_middleware::{AuthGate, Middleware, Next};

use crate::config::GatewayConfig;
use crate::proxy::{ForwardIdentity, UpstreamClient, REQUEST_ID_HEADER};

/// Gateway server.
pub struct GatewayServer {
    /// Configuration.
    config: Arc<GatewayConfig>,
    /// Authentication gate.
    gate: Arc<AuthGate>,
    /// Upstream client.
    upstream: Arc<UpstreamClient>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(config: GatewayConfig) -> GateResult<Self> {
        let introspector = IntrospectionClient::with_timeout(
            &config.auth.introspect_url,
            &config.auth.client_id,
            &config.auth.client_secret,
            config.auth.introspect_timeout,
        )?;
        let gate = Arc::new(AuthGate::new(config.gate_policy(), Arc::new(introspector)));
        let upstream = Arc::new(UpstreamClient::new(
            &config.server.upstream_url,
            config.server.upstream_timeout,
        )?);

        Ok(Self {
            config: Arc::new(config),
            gate,
            upstream,
        })
    }

    /// Run the gateway server.
    pub async fn run(self) -> GateResult<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .listen_addr
                .parse()
                .map_err(|e| GateError::config(format!("invalid listen address: {e}")))?,
            self.config.server.listen_port,
        );

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GateError::server(format!("failed to bind: {e}")))?;

        info!("Janus gateway listening on {}", addr);
        info!("Proxying to upstream: {}", self.config.server.upstream_url);

        // Accept connections
        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let gate = self.gate.clone();
            let upstream = self.upstream.clone();

            // Spawn handler for this connection
            tokio::spawn(async move {
                let io = TokioIo::new(stream);

                let service = service_fn(move |req| {
                    let gate = gate.clone();
                    let upstream = upstream.clone();
                    async move {
                        handle_request(req, gate, upstream, peer_addr)
                            .await
                            .map_err(|_| -> Infallible { unreachable!() })
                    }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Connection error: {}", e);
                }
            });
        }
    }
}

/// Handle an incoming request.
async fn handle_request(
    req: http::Request<Incoming>,
    gate: Arc<AuthGate>,
    upstream: Arc<UpstreamClient>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);

    // Reconstruct the URL the client requested, for login redirects.
    let original_url = req
        .headers()
        .get(http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map_or_else(
            || path_and_query.clone(),
            |host| format!("http://{host}{path_and_query}"),
        );

    let accept = req
        .headers()
        .get(http::header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .map(ToString::to_string);

    let mut ctx = GateContext::new(&path, &original_url, accept.as_deref());
    let request_id = ctx.request_id();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        peer = %peer_addr,
    );

    async move {
        // Extract request body
        let (parts, body) = req.into_parts();
        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!("Failed to read request body: {}", e);
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    "failed to read request body",
                    request_id,
                ));
            }
        };

        let request = http::Request::from_parts(parts, Full::new(body_bytes));

        // Terminal handler forwards to the upstream. The identity snapshot
        // is taken synchronously, after the gate has annotated the context.
        let forward = Next::handler(move |ctx: &mut GateContext, request| {
            let identity = ForwardIdentity::from(&*ctx);
            Box::pin(async move {
                match upstream.forward(&identity, request).await {
                    Ok(response) => response,
                    Err(e) => {
                        error!(error = %e, "upstream error");
                        error_response(
                            StatusCode::from_u16(e.status_code())
                                .unwrap_or(StatusCode::BAD_GATEWAY),
                            &e.to_string(),
                            identity.request_id.unwrap_or(request_id),
                        )
                    }
                }
            })
        });

        let response = gate.process(&mut ctx, request, forward).await;

        let duration = start.elapsed();
        info!(
            status = %response.status(),
            duration_ms = %duration.as_millis(),
            "request completed"
        );

        // Attach the request ID so responses are correlatable.
        let (mut parts, body) = response.into_parts();
        if let Ok(value) = http::HeaderValue::from_str(&request_id.to_string()) {
            parts.headers.insert(REQUEST_ID_HEADER, value);
        }

        Ok(Response::from_parts(parts, body))
    }
    .instrument(span)
    .await
}

/// Create an error response with a JSON detail body.
fn error_response(status: StatusCode, message: &str, request_id: uuid::Uuid) -> Response<Full<Bytes>> {
    let body = ErrorBody::new(message);
    let json = serde_json::to_string(&body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header(REQUEST_ID_HEADER, request_id.to_string())
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::from("{}")))
                .unwrap()
        })
}
