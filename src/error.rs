use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An input vector did not match the width of the layer it was fed to
    #[error("input width {got} does not match layer input width {want}")]
    InputWidth { want: usize, got: usize },

    /// A topology or configuration that cannot build a network
    #[error("invalid topology {topology:?}: {reason}")]
    Topology {
        topology: Vec<usize>,
        reason: &'static str,
    },

    /// A loaded brain that is malformed or does not fit where it is attached
    #[error("brain rejected: {0}")]
    Validation(String),

    /// A training target that no run can meet
    #[error("unreachable training target {0:?}")]
    Target(crate::trainer::EvolutionTarget),

    #[error("population is empty")]
    EmptyPopulation,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
