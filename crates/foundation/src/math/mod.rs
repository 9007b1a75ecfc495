pub mod offset;
pub mod polygon;
pub mod polyline;

pub use offset::*;
pub use polygon::*;
pub use polyline::*;

/// Earth radius used by the local equirectangular approximations (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
