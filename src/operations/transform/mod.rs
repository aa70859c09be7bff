mod general;
mod transformed_copy;

pub use general::GeneralTransform;
pub use transformed_copy::TransformedCopy;
