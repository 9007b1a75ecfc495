pub mod labels;
pub mod symbology;
pub mod visibility;

pub use symbology::*;
pub use visibility::*;
