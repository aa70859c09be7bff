pub mod curve;
pub mod curve_loop;
pub mod placement;
pub mod surface;

pub use curve::{Arc, Curve, CurveDomain, Helix, Line};
pub use curve_loop::{CurveLoop, CurveSegment, RectangleFit, SegmentKind};
pub use placement::CoordinateSystem;
pub use surface::{Cylinder, Plane};
