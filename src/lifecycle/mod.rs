// ABOUTME: Deployment lifecycle: the status enum and the transition guard.
// ABOUTME: Encodes the legal edge table as exhaustive matches.

mod guard;
mod status;

pub use guard::{ReasonCode, StateTransitionGuard, TransitionResult};
pub use status::DeploymentStatus;
