//! Error type for use-case operations.

use tribute_gateway::GatewayError;
use tribute_rules::RuleError;

/// Failures of a use case: either a local rule rejected the input or the
/// gateway call failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UseCaseError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl UseCaseError {
    /// True when the failure was raised locally, before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, UseCaseError::Rule(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            UseCaseError::Rule(e) => e.to_string(),
            UseCaseError::Gateway(e) => e.user_message(),
        }
    }
}
