//! Who answers next, and when.
//!
//! - `selector`: pinned, direct and round-robin responder choice
//! - `auto_flow`: cancellable timer that keeps an arena talking

pub mod auto_flow;
pub mod selector;

pub use auto_flow::{AutoFlowScheduler, FlowDecision, FlowEligibility};
pub use selector::{Responder, assistants_for, responders_for, select_responder};
