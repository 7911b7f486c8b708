//! Error taxonomy for malformed planner input.
//!
//! Infeasible days and missing hotels are not errors: the scheduler always
//! produces a plan and annotates it instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("need at least {min} nodes to reorder, got {nodes}")]
    InsufficientNodes { nodes: usize, min: usize },
    #[error("exact solver is limited to {limit} nodes, got {nodes}")]
    ExactSolverLimit { nodes: usize, limit: usize },
    #[error("travel-time matrix shape mismatch: expected {expected}x{expected}, found {found}")]
    ShapeMismatch { expected: usize, found: String },
    #[error("index {index} out of range for {len} nodes")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("fixed first and last positions both point at node {index}")]
    FixedEndpoints { index: usize },
    #[error("duplicate stop id {0}")]
    DuplicateStop(String),
    #[error("invalid time of day: {0:?}")]
    InvalidTime(String),
    #[error(transparent)]
    Routing(#[from] reqwest::Error),
    #[error("routing service response: {0}")]
    RoutingResponse(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    pub(crate) fn shape(expected: usize, rows: usize, cols: Option<usize>) -> Self {
        let found = match cols {
            Some(cols) => format!("{rows}x{cols}"),
            None => format!("{rows} ragged rows"),
        };
        Self::ShapeMismatch { expected, found }
    }
}
