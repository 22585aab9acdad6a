// ABOUTME: Error taxonomy and the retry policy classifier.
// ABOUTME: Decides whether and how a failed operation should be retried.

mod classifier;
mod policy;
mod taxonomy;

pub use classifier::RetryClassifier;
pub use policy::{RetryDecision, RetryPolicy};
pub use taxonomy::{DeploymentError, DeploymentErrorCategory, ErrorCode, UnknownErrorCode};
