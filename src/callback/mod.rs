//! Callback handling for the Microsoft Live strategy
//!
//! - [`gate`] - decides whether a callback proceeds and whether state is enforced
//! - [`flow`] - request phase and callback phase orchestration

pub mod flow;
pub mod gate;

pub use flow::{AuthenticatedCallback, CallbackOutcome, MicrosoftLiveStrategy};
pub use gate::{CallbackGate, FlowOptions, GateDecision};
