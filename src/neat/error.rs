use thiserror::Error;

/// Failure to evaluate a decoded network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("input vector has {actual} values but the network has {expected} input nodes")]
    InvalidInputSize { expected: usize, actual: usize },
}

/// A [`Settings`](super::common::Settings) value that cannot drive a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("population size must be at least 1")]
    EmptyPopulation,
    #[error("networks need at least one sensor node and one output node (got {n_sensor_nodes} sensors, {n_output_nodes} outputs)")]
    MissingNodes { n_sensor_nodes: usize, n_output_nodes: usize },
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidMagnitude { name: &'static str, value: f64 },
    #[error("tournament size must be at least 1")]
    EmptyTournament,
    #[error("survival threshold must be a percentage in 0..=100, got {0}")]
    InvalidSurvivalThreshold(usize),
}
