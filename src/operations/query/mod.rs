mod area;
mod length;
mod volume;

pub use area::Area;
pub use length::Length;
pub use volume::Volume;
