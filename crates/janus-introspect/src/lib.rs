//! # Janus Introspect
//!
//! Remote credential introspection for the Janus gateway.
//!
//! Validating a credential means one bounded-timeout `POST` to the central
//! auth authority. The authority answers with identity, role, plan, and
//! redirect metadata; this crate parses that answer into an
//! [`IntrospectionOutcome`] the decision engine can act on.
//!
//! Two failure kinds must never be conflated:
//!
//! - **`Inactive`** - the authority answered and the session is not valid
//!   (expired, revoked). The caller turns this into a 401.
//! - **`Unavailable`** - the authority could not be reached, timed out, or
//!   answered with something unparseable. The caller turns this into a 503.
//!
//! The client never retries and never caches; every request gets a fresh
//! introspection.

#![doc(html_root_url = "https://docs.rs/janus-introspect/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod client;
pub mod outcome;

pub use client::{BoxFuture, Introspect, IntrospectionClient};
pub use outcome::{IntrospectionOutcome, IntrospectionResponse};
