//! Layout inference: final width, height and URL of a placeholder.
//!
//! | requested       | intrinsic read | size                          | URL         |
//! |-----------------|----------------|-------------------------------|-------------|
//! | neither         | yes            | intrinsic                     | default     |
//! | width only      | yes            | height keeps the aspect ratio | dimensioned |
//! | height only     | yes            | width keeps the aspect ratio  | dimensioned |
//! | width + height  | no             | as requested                  | dimensioned |
//!
//! The dominant colour is read once in every case, after the size is known.

use thiserror::Error;

use super::color::Rgb;
use super::probe::{Dimensions, ImageProbe, ProbeError};
use crate::asset::AssetRecord;

/// Width/height written on the element. `None` means not requested;
/// an explicit `0`, a negative or a non-finite value is treated the same way.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestedSize {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl RequestedSize {
    pub const fn new(width: Option<f64>, height: Option<f64>) -> Self {
        Self { width, height }
    }

    fn normalized(self) -> (Option<f64>, Option<f64>) {
        let usable = |v: f64| v > 0.0 && v.is_finite();
        (self.width.filter(|&w| usable(w)), self.height.filter(|&h| usable(h)))
    }
}

/// Resolved layout of one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub url: String,
    pub color: Rgb,
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("intrinsic size {}x{} cannot preserve an aspect ratio", .0.width, .0.height)]
    MissingDimensions(Dimensions),

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// Compute the final layout of a persisted asset.
pub async fn infer_layout(
    requested: RequestedSize,
    record: &AssetRecord,
    probe: &dyn ImageProbe,
) -> Result<Layout, LayoutError> {
    let (width, height, url) = match requested.normalized() {
        (None, None) => {
            let intrinsic = probe.dimensions(&record.local_path).await?;
            (
                f64::from(intrinsic.width),
                f64::from(intrinsic.height),
                record.public_url.clone(),
            )
        }
        (Some(width), None) => {
            let intrinsic = aspect_source(probe, record).await?;
            let height = scale(intrinsic.height, width, intrinsic.width);
            (width, height, record.dimensioned_url(width, height))
        }
        (None, Some(height)) => {
            let intrinsic = aspect_source(probe, record).await?;
            let width = scale(intrinsic.width, height, intrinsic.height);
            (width, height, record.dimensioned_url(width, height))
        }
        (Some(width), Some(height)) => (width, height, record.dimensioned_url(width, height)),
    };

    let color = probe.dominant_color(&record.local_path).await?;
    Ok(Layout {
        width,
        height,
        url,
        color,
    })
}

/// Intrinsic size usable as an aspect ratio (both sides non-zero).
async fn aspect_source(
    probe: &dyn ImageProbe,
    record: &AssetRecord,
) -> Result<Dimensions, LayoutError> {
    let intrinsic = probe.dimensions(&record.local_path).await?;
    if intrinsic.width == 0 || intrinsic.height == 0 {
        return Err(LayoutError::MissingDimensions(intrinsic));
    }
    Ok(intrinsic)
}

/// `other * requested / known`, rounded to whole pixels.
#[inline]
fn scale(other: u32, requested: f64, known: u32) -> f64 {
    (f64::from(other) * requested / f64::from(known)).round()
}
