//! Image inspection and layout inference.
//!
//! # Modules
//!
//! - [`probe`]: intrinsic dimensions and dominant colour of a persisted asset
//! - [`layout`]: final width/height/URL of a placeholder element

mod color;
pub mod layout;
pub mod probe;

pub use color::{Rgb, dominant_color};
pub use layout::{Layout, LayoutError, RequestedSize, infer_layout};
pub use probe::{Dimensions, ImageProbe, ProbeError, RasterProbe};
