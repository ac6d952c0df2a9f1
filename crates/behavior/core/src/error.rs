//! Error infrastructure for behaviour decisions.
//!
//! Decision faults never escape the manager: they are logged, counted and
//! isolated to the instance that produced them.

use crate::types::CreatureId;

/// Severity level of an error, used for logging and containment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Bad data handed in by a collaborator.
    Validation,
    /// Internal bookkeeping disagrees with itself. Indicates a bug.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common interface of every error type in this crate.
pub trait EngineError: core::error::Error {
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code, e.g. `"BEHAVIOR_INVALID_HEALTH"`.
    fn error_code(&self) -> &'static str;
}

/// Fault raised while an instance makes a decision.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BehaviorError {
    #[error("deferred action `{action}` for creature {creature} is malformed: {reason}")]
    InvalidDeferred {
        creature: CreatureId,
        action: &'static str,
        reason: &'static str,
    },

    #[error("creature {creature} reported non-finite health {health}")]
    InvalidHealth { creature: CreatureId, health: f32 },
}

impl EngineError for BehaviorError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidDeferred { .. } => ErrorSeverity::Internal,
            Self::InvalidHealth { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDeferred { .. } => "BEHAVIOR_INVALID_DEFERRED",
            Self::InvalidHealth { .. } => "BEHAVIOR_INVALID_HEALTH",
        }
    }
}

pub type BehaviorResult<T = ()> = Result<T, BehaviorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_severity() {
        let err = BehaviorError::InvalidDeferred {
            creature: CreatureId(3),
            action: "shockwave",
            reason: "wave index past the last wave",
        };
        assert_eq!(err.error_code(), "BEHAVIOR_INVALID_DEFERRED");
        assert!(err.severity().is_internal());
        assert_eq!(
            err.to_string(),
            "deferred action `shockwave` for creature c#3 is malformed: wave index past the last wave"
        );

        let health = BehaviorError::InvalidHealth {
            creature: CreatureId(1),
            health: f32::NAN,
        };
        assert_eq!(health.error_code(), "BEHAVIOR_INVALID_HEALTH");
        assert_eq!(health.severity().as_str(), "validation");
        assert!(!health.severity().is_internal());
    }
}
