//! # Janus Middleware
//!
//! The interception layer of the Janus central-auth gateway.
//!
//! Every inbound request flows through the [`AuthGate`] before it can reach
//! application logic:
//!
//! ```text
//! Request → public-path check → credential extraction → introspection → decision
//!                                                                          ↓
//!               Serve (annotated) | 302 login | 302 target | 401 | 503 ←──┘
//! ```
//!
//! The stages are deliberately separable:
//!
//! | Module       | Purpose                                                |
//! |--------------|--------------------------------------------------------|
//! | [`extract`]  | Pull a bearer credential from header or cookie          |
//! | [`decision`] | Pure mapping from request + introspection to an Action  |
//! | [`gate`]     | Orchestrate the stages and execute exactly one Action   |
//!
//! The [`Middleware`] trait and [`Next`] continue-capability make the gate a
//! composable interception shape: a stage either calls `next.run` once or
//! short-circuits with its own response, never both.

#![doc(html_root_url = "https://docs.rs/janus-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod decision;
pub mod extract;
pub mod gate;
pub mod middleware;
pub mod types;

pub use decision::{decide, Action, GatePolicy, Introspection};
pub use gate::AuthGate;
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use types::{Request, Response, ResponseExt};
