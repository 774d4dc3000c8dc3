use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and its collaborators.
///
/// Configuration and sequencing problems surface here immediately; nothing is
/// clamped or retried silently. Each variant carries enough context to act on.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter (rejected at construction).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// `simulate` was called without a preceding `initialize`.
    #[error("engine not initialized: call initialize() before simulate()")]
    NotInitialized,

    /// The physical system was asked to move backward in time.
    #[error("cannot advance backwards in time (from t={from} to t={to})")]
    TimeReversal { from: f64, to: f64 },

    /// No valid event is left although the run has not reached its duration.
    #[error("no valid events left at t={now} before the end of the run (t={duration})")]
    QueueStarvation { now: f64, duration: f64 },

    /// Numerical issue (e.g., a non-finite predicted instant).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Malformed YAML run parameters.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Propagated I/O errors (configuration files, data savers).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_reversal_reports_both_instants() {
        let msg = Error::TimeReversal { from: 4.5, to: 2.25 }.to_string();
        assert!(msg.contains("backwards"));
        assert!(msg.contains("t=4.5") && msg.contains("t=2.25"));
    }

    #[test]
    fn yaml_errors_convert() {
        let yaml = serde_yaml::from_str::<Vec<f64>>("[1.0, oops").unwrap_err();
        let e: Error = yaml.into();
        assert!(matches!(e, Error::Yaml(_)));
    }

    #[test]
    fn starvation_reports_both_instants() {
        let msg = Error::QueueStarvation {
            now: 1.5,
            duration: 10.0,
        }
        .to_string();
        assert!(msg.contains("1.5"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
