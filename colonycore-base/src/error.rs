// We want a few things here:
// 1. A typed taxonomy callers can match on (ValidationError, NotFoundError, ...)
// 2. A single place that centralizes tracing emission for errors as they're created,
//    so nothing silently disappears on its way back up through a `?`.
// 3. A way to wrap arbitrary I/O/persistence failures with a backtrace without forcing
//    every other variant to pay for one it doesn't need.

use backtrace_error::DynBacktraceError;
use thiserror::Error;
use tracing::error;

use crate::RuleResult;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("commit blocked by rule violations")]
    RuleViolation(RuleResult),

    #[error("transaction callback failed: {0}")]
    User(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("plugin installation failed: {0}")]
    Plugin(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("store error: {0:?}")]
    Store(DynBacktraceError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> CoreError {
        let err = CoreError::Validation(msg.into());
        error!(target: "colonycore", "{err}");
        err
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> CoreError {
        let err = CoreError::NotFound { entity, id: id.into() };
        error!(target: "colonycore", "{err}");
        err
    }

    pub fn plugin(msg: impl Into<String>) -> CoreError {
        let err = CoreError::Plugin(msg.into());
        error!(target: "colonycore", "{err}");
        err
    }

    pub fn dataset(msg: impl Into<String>) -> CoreError {
        let err = CoreError::Dataset(msg.into());
        error!(target: "colonycore", "{err}");
        err
    }

    pub fn user<E: std::error::Error + Send + Sync + 'static>(err: E) -> CoreError {
        CoreError::User(Box::new(err))
    }

    pub fn store<E: std::error::Error + Send + Sync + 'static>(err: E) -> CoreError {
        error!(target: "colonycore", "{:?}", err);
        CoreError::Store(DynBacktraceError::from(err))
    }

    /// True for errors that should discard the in-flight shadow copy rather than retry.
    pub fn aborts_transaction(&self) -> bool {
        !matches!(self, CoreError::RuleViolation(_))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_found_carries_entity_and_id() {
        let err = CoreError::not_found("Organism", "abc-123");
        assert_eq!(err.to_string(), "Organism abc-123 not found");
    }

    #[test]
    fn rule_violation_is_not_a_hard_abort() {
        // RuleViolation is returned alongside a rolled-back commit but still carries a
        // meaningful Result payload, so callers can tell it apart from a hard abort.
        let err = CoreError::RuleViolation(RuleResult::default());
        assert!(!err.aborts_transaction());
    }
}
