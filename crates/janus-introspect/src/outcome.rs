//! Introspection wire format and outcome types.

use serde::{Deserialize, Serialize};

use janus_core::{Plan, RedirectHint, SessionIdentity};

/// The structured response body the introspection authority sends.
///
/// Absent `plan` and `redirect` fields fall back to their defaults
/// (`free` and `microservice`); absent `user` and `roles` fields are
/// tolerated the same way. Only `active` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    /// Whether the credential is currently valid.
    pub active: bool,
    /// Opaque identity descriptor.
    #[serde(default)]
    pub user: serde_json::Value,
    /// Roles granted to the session.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Subscription tier.
    #[serde(default)]
    pub plan: Plan,
    /// Suggested destination surface.
    #[serde(default)]
    pub redirect: RedirectHint,
}

impl IntrospectionResponse {
    /// Converts the parsed response into an outcome for the decision engine.
    #[must_use]
    pub fn into_outcome(self) -> IntrospectionOutcome {
        if self.active {
            IntrospectionOutcome::Active(SessionIdentity {
                user: self.user,
                roles: self.roles,
                plan: self.plan,
                redirect: self.redirect,
            })
        } else {
            IntrospectionOutcome::Inactive
        }
    }
}

/// The result of one introspection attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum IntrospectionOutcome {
    /// The credential is valid; session metadata is attached.
    Active(SessionIdentity),
    /// The authority answered and the session is expired or revoked.
    Inactive,
    /// The authority could not be reached or answered unusably.
    Unavailable,
}

impl IntrospectionOutcome {
    /// Returns true if the credential was validated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_response_becomes_session() {
        let response: IntrospectionResponse = serde_json::from_str(
            r#"{"active": true, "user": "alice", "roles": ["admin"], "plan": "paid", "redirect": "admin"}"#,
        )
        .expect("valid response");

        match response.into_outcome() {
            IntrospectionOutcome::Active(session) => {
                assert_eq!(session.user_label(), "alice");
                assert_eq!(session.roles(), &["admin".to_string()]);
                assert_eq!(session.plan, Plan::Paid);
                assert_eq!(session.redirect, RedirectHint::Admin);
            }
            other => panic!("expected active outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_inactive_response() {
        let response: IntrospectionResponse =
            serde_json::from_str(r#"{"active": false}"#).expect("valid response");
        assert_eq!(response.into_outcome(), IntrospectionOutcome::Inactive);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let response: IntrospectionResponse =
            serde_json::from_str(r#"{"active": true}"#).expect("valid response");

        match response.into_outcome() {
            IntrospectionOutcome::Active(session) => {
                assert_eq!(session.plan, Plan::Free);
                assert_eq!(session.redirect, RedirectHint::Microservice);
                assert!(session.roles().is_empty());
            }
            other => panic!("expected active outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_active_field_is_a_parse_error() {
        let result = serde_json::from_str::<IntrospectionResponse>(r#"{"user": "alice"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_active() {
        assert!(!IntrospectionOutcome::Inactive.is_active());
        assert!(!IntrospectionOutcome::Unavailable.is_active());
    }
}
