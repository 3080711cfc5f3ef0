//! Session identity attached to authenticated requests.
//!
//! The introspection authority answers with identity, role, plan, and
//! redirect metadata for an active session. This module models that answer.
//! Both [`Plan`] and [`RedirectHint`] are open sets: the authority may start
//! emitting new values at any time, and an unknown value must be carried
//! through rather than rejected.

use serde::{Deserialize, Serialize};

/// Subscription tier associated with an authenticated identity.
///
/// Unknown tiers round-trip through [`Plan::Other`] so a new tier introduced
/// by the authority never becomes a parse error here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Plan {
    /// Free tier.
    Free,
    /// Paid tier.
    Paid,
    /// A tier this layer does not recognize.
    Other(String),
}

impl Plan {
    /// Returns the wire representation of this plan.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Other(s) => s,
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::Free
    }
}

impl From<String> for Plan {
    fn from(s: String) -> Self {
        match s.as_str() {
            "free" => Self::Free,
            "paid" => Self::Paid,
            _ => Self::Other(s),
        }
    }
}

impl From<Plan> for String {
    fn from(plan: Plan) -> Self {
        plan.as_str().to_string()
    }
}

/// Server-supplied suggestion of which service surface a browser client
/// should be routed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RedirectHint {
    /// Route to the microservice UI surface.
    Microservice,
    /// Route to the admin surface.
    Admin,
    /// A destination this layer does not recognize.
    Other(String),
}

impl RedirectHint {
    /// Returns the wire representation of this hint.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Microservice => "microservice",
            Self::Admin => "admin",
            Self::Other(s) => s,
        }
    }
}

impl Default for RedirectHint {
    fn default() -> Self {
        Self::Microservice
    }
}

impl From<String> for RedirectHint {
    fn from(s: String) -> Self {
        match s.as_str() {
            "microservice" => Self::Microservice,
            "admin" => Self::Admin,
            _ => Self::Other(s),
        }
    }
}

impl From<RedirectHint> for String {
    fn from(hint: RedirectHint) -> Self {
        hint.as_str().to_string()
    }
}

/// Identity and policy metadata for an active session.
///
/// The `user` descriptor is opaque to the gateway: the authority may send a
/// bare string, an object, or anything else, and it is forwarded downstream
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Opaque user descriptor from the authority.
    pub user: serde_json::Value,
    /// Roles granted to the session. Order carries no meaning.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Subscription tier.
    #[serde(default)]
    pub plan: Plan,
    /// Suggested destination surface for browser clients.
    #[serde(default)]
    pub redirect: RedirectHint,
}

impl SessionIdentity {
    /// Returns a string form of the user descriptor suitable for logging
    /// and for propagation in a header.
    ///
    /// A JSON string is returned without its quotes; any other shape is
    /// serialized compactly.
    #[must_use]
    pub fn user_label(&self) -> String {
        match &self.user {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the session roles.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}
