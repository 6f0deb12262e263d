use std::collections::HashMap;

use crate::oauth::STATE_SESSION_KEY;

/// Outcome of inspecting an inbound callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    /// No usable authorization code: answer with an empty response and stop
    pub abort: bool,
    /// The session holds a state token the callback must match
    pub enforce_state: bool,
}

/// First step of every callback
///
/// State enforcement is lenient on purpose: it is skipped when the session
/// holds no state token, since there is nothing to compare against. A callback
/// that reaches us without going through the request phase is therefore
/// accepted without CSRF verification.
pub struct CallbackGate;

impl CallbackGate {
    #[must_use]
    pub fn evaluate(
        params: &HashMap<String, String>,
        session: &HashMap<String, String>,
    ) -> GateDecision {
        GateDecision {
            abort: params.get("code").map_or(true, String::is_empty),
            enforce_state: session.contains_key(STATE_SESSION_KEY),
        }
    }
}

/// Flow-scoped options read by the state verification step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowOptions {
    pub provider_ignores_state: bool,
}

impl FlowOptions {
    #[must_use]
    pub fn from_decision(decision: &GateDecision) -> Self {
        Self {
            provider_ignores_state: !decision.enforce_state,
        }
    }
}
