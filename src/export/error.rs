use thiserror::Error;

use crate::error::{BodyrepError, GeometryError, TopologyError};

/// Why a pipeline stage could not represent a solid.
///
/// Every variant except [`FallbackReason::Kernel`] is an expected outcome
/// that sends the solid to the next, less compact tier.
#[derive(Debug, Error)]
pub enum FallbackReason {
    #[error("degenerate solid: {0}")]
    DegenerateSolid(String),

    #[error("no candidate axis gives an extrusion")]
    NoExtrusionAxis,

    #[error("face is neither a side nor a cap for the axis")]
    FaceNotAligned,

    #[error("solid is not prismatic: {0}")]
    NotPrismatic(String),

    #[error("cannot express as sweep: {0}")]
    SweepMismatch(String),

    #[error("sweep export is disabled")]
    SweepsDisabled,

    #[error("output profile does not allow {0}")]
    DisallowedByProfile(&'static str),

    #[error("shell is not closed: {0}")]
    NonManifold(String),

    #[error("tessellation has {count} triangles, limit is {limit}")]
    TriangleLimit { count: usize, limit: usize },

    #[error("nothing to export")]
    NothingToExport,

    #[error(transparent)]
    Kernel(#[from] BodyrepError),
}

/// Result alias for pipeline stages.
pub type StageResult<T> = std::result::Result<T, FallbackReason>;

impl From<TopologyError> for FallbackReason {
    fn from(err: TopologyError) -> Self {
        Self::Kernel(err.into())
    }
}

impl From<GeometryError> for FallbackReason {
    fn from(err: GeometryError) -> Self {
        Self::Kernel(err.into())
    }
}
