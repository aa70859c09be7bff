mod extrude;
mod profile;
mod sweep;

pub use extrude::Extrude;
pub use sweep::{PathSegment, Sweep};
