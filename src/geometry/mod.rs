mod arc;
mod plane;
mod segment;

pub use arc::{Arc, ArcBuilder, ArcParam};
pub use plane::Plane;
pub use segment::{Segment, SegmentBuilder, SegmentParam};
