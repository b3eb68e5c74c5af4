pub mod bounding_box;
pub mod closest_point;
pub mod distance;
pub mod flatten;
pub mod locate;

pub use bounding_box::{BoundingBox, ParameterBounds};
pub use closest_point::{ClosestPoint, ClosestPointResult};
pub use distance::DistanceSolver;
pub use flatten::flatten;
pub use locate::{Location, ParameterMapper};
