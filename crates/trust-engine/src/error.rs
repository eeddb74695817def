//! Engine error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("population size must be positive, got {0}")]
    InvalidPopulationSize(usize),

    #[error("round count must be positive, got {0}")]
    InvalidRoundCount(u32),

    #[error("{field} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("match is already complete after {rounds} rounds")]
    MatchComplete { rounds: u32 },

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject NaN and anything outside [0, 1]
pub(crate) fn check_probability(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::ProbabilityOutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_bounds() {
        assert!(check_probability("noise_rate", 0.0).is_ok());
        assert!(check_probability("noise_rate", 1.0).is_ok());
        assert!(check_probability("noise_rate", 0.5).is_ok());
        assert!(check_probability("noise_rate", -0.01).is_err());
        assert!(check_probability("noise_rate", 1.01).is_err());
        assert!(check_probability("noise_rate", f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = check_probability("mutation_rate", 2.0).unwrap_err();
        assert_eq!(err.to_string(), "mutation_rate must be a probability in [0, 1], got 2");
    }
}
