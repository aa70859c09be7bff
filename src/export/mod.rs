pub mod body;
pub mod brep;
pub mod classify;
pub mod error;
pub mod extrusion;
pub mod facet_merge;
mod loops;
pub mod mapping;
pub mod material;
pub mod options;
pub mod representation;
pub mod session;
pub mod sweep;

pub use body::{export_bodies, export_body, BodyElement, ParameterValue, SymbolInstance};
pub use brep::{brep_from_mesh, faceted_from_mesh, BrepConversion, FacetFace, FacetShell, FacetedBody};
pub use classify::{BodyGeometry, BodyKind, Classify};
pub use error::{FallbackReason, StageResult};
pub use extrusion::{ExtrusionAnalysis, ExtrusionDescriptor, OpeningData};
pub use facet_merge::{merge_coplanar, MergedFacet};
pub use mapping::ParameterMapping;
pub use material::{resolve_geometry, resolve_parameter, ResolvedMaterial};
pub use options::{ExportOptions, OutputProfile};
pub use representation::{
    assemble, ItemGeometry, ItemKind, RepresentationItem, RepresentationType, ShapeRepresentation,
};
pub use session::{
    ContextId, ExportSession, ExportStats, GeometricContext, GeometryKey, RepresentationId,
};
pub use sweep::{SweepAnalysis, SweepDescriptor};
