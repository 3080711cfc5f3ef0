//! # Janus Core
//!
//! Shared value types for the Janus central-auth gateway.
//!
//! This crate defines the per-request [`GateContext`], the
//! [`SessionIdentity`] attached to authenticated requests, and the
//! [`GateError`] taxonomy that every failure path in the gateway maps to.
//! It deliberately contains no I/O: everything here is plain data so the
//! decision logic built on top of it stays pure and testable.

#![doc(html_root_url = "https://docs.rs/janus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod identity;

pub use context::GateContext;
pub use error::{ErrorBody, GateError, GateResult};
pub use identity::{Plan, RedirectHint, SessionIdentity};
