//! Error types for the nino-pipeline crate.

use nino_stats::StatsError;

/// Error type for pipeline construction and execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// Returned when an operator's settings cannot be parsed.
    #[error("invalid settings for '{key}': {reason}")]
    InvalidConfig {
        /// The pipeline key, e.g. `2--average`.
        key: String,
        /// Parser message.
        reason: String,
    },

    /// Returned when a step does not apply to its input (for example, no
    /// time axis). Execution stops without a fault.
    #[error("pipeline halted at '{step}': {reason}")]
    Halted {
        /// The step that could not run.
        step: String,
        /// Why it could not run.
        reason: String,
    },

    /// Returned when a step fails.
    #[error("step '{step}' failed")]
    Step {
        /// The failing step.
        step: String,
        /// Underlying error.
        #[source]
        source: StatsError,
    },
}

impl PipelineError {
    /// Routes an operator error: soft failures halt, others fail the step.
    pub fn from_step(step: impl Into<String>, source: StatsError) -> Self {
        let step = step.into();
        if source.is_soft() {
            Self::Halted {
                step,
                reason: source.to_string(),
            }
        } else {
            Self::Step { step, source }
        }
    }

    /// Whether execution stopped because a step did not apply.
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halted { .. })
    }
}

#[cfg(test)]
mod tests {
    use nino_grid::GridError;

    use super::*;

    #[test]
    fn soft_errors_halt() {
        let err = PipelineError::from_step(
            "1--season_mean",
            StatsError::Grid(GridError::UnresolvedAxis { axis: "T".to_string() }),
        );
        assert!(err.is_halt());
        assert_eq!(
            err.to_string(),
            "pipeline halted at '1--season_mean': axis 'T' could not be resolved"
        );
    }

    #[test]
    fn hard_errors_keep_their_source() {
        let source = StatsError::InvalidWindow {
            window: 0,
            reason: "must be at least 1".to_string(),
        };
        let err = PipelineError::from_step("average_moving", source.clone());
        assert!(!err.is_halt());
        assert_eq!(err.to_string(), "step 'average_moving' failed");
        let inner = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(inner, Some(source.to_string()));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PipelineError>();
    }
}
