pub mod error;
pub mod geometry;
pub mod math;
pub mod resolve;

pub use error::{GeodefError, Result};
pub use geometry::{Arc, ArcParam, Plane, Segment, SegmentParam};
pub use resolve::{Entity, Param, RawValue, Value};
