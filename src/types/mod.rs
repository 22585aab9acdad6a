// ABOUTME: Type-safe identifiers shared across the deployment core.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;

pub use id::{CorrelationId, CorrelationMarker, DeploymentId, DeploymentMarker, Id};
