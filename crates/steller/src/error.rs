use crate::solver::SolverError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidGraph(#[from] steller_dag::GraphError),

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error(
        "optimal decrossing would need {variables} ordering variables, over the {limit} limit; \
         raise the size gate or use the two-layer heuristic"
    )]
    GraphTooLarge { variables: usize, limit: usize },

    #[error("layering constraints are unsatisfiable: {message}")]
    IllDefinedConstraints { message: String },

    #[error("quadratic objective is not positive definite; too many weights are zero")]
    IllDefinedObjective,

    #[error("nodes overlap in layer {layer} at position {index}")]
    InvalidCoordAssignment { layer: usize, index: usize },

    #[error("no node has a positive width")]
    ZeroWidth,

    #[error("the graph has zero total height")]
    ZeroHeight,
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<SolverError> for Error {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::NotPositiveDefinite => Error::IllDefinedObjective,
            other => Error::IllDefinedConstraints {
                message: other.to_string(),
            },
        }
    }
}
