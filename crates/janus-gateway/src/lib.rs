//! Janus Gateway - Authenticating reverse proxy
//!
//! The Janus gateway is a standalone binary that sits in front of an
//! application service and centralizes authentication: every request is
//! checked against a remote session authority before it reaches the app.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐       ┌─────────────────────────┐       ┌──────────────────┐
//! │   Client   │ ────► │      Janus Gateway      │ ────► │   Application    │
//! │ (browser / │       │                         │       │     Service      │
//! │  API call) │ ◄──── │  ┌───────────────────┐  │ ◄──── │                  │
//! └────────────┘       │  │ Credential extract│  │       │ - Business logic │
//!                      │  │ Introspection     │  │       │ - Reads x-auth-* │
//!                      │  │ Decision engine   │  │       │   headers        │
//!                      │  └───────────────────┘  │       └──────────────────┘
//!                      └──────────┬──────────────┘
//!                                 │ POST (bearer + client creds)
//!                                 ▼
//!                      ┌─────────────────────────┐
//!                      │    Session Authority    │
//!                      └─────────────────────────┘
//! ```
//!
//! Requests without a valid session are redirected to the login page
//! (browsers) or rejected with a JSON error (API clients). Served requests
//! are forwarded upstream with the session identity attached as headers.
//!
//! # Example Usage
//!
//! ```bash
//! # Run the gateway with a configuration file
//! $ janus-gateway --config /etc/janus/gateway.toml
//!
//! # Run with environment variable overrides
//! $ JANUS_GATEWAY_UPSTREAM_URL=http://localhost:3000 \
//!   JANUS_GATEWAY_INTROSPECT_URL=https://auth.example/introspect \
//!   JANUS_GATEWAY_LOGIN_URL=https://auth.example/login \
//!   janus-gateway
//! ```

#![doc(html_root_url = "https://docs.rs/janus-gateway/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod proxy;
pub mod server;

pub use config::{AuthSettings, GatewayConfig, ServerSettings};
pub use proxy::{ForwardIdentity, UpstreamClient};
pub use server::GatewayServer;

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
