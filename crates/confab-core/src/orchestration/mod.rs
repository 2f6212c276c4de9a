//! Response orchestration: responder resolution, credential checks,
//! gateway call and the single message committed per turn.

pub mod controller;
pub mod in_flight;

pub use controller::{OrchestrationController, RespondContext, RespondOutcome};
pub use in_flight::{InFlightGuard, InFlightRegistry};
