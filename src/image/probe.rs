//! Image metadata and statistics engine.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::ImageReader;
use thiserror::Error;

use super::color::{Rgb, dominant_color};

/// Intrinsic pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot open `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("cannot decode `{0}`")]
    Decode(PathBuf, #[source] image::ImageError),

    #[error("image probe task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Reads dimensions and colour statistics of a persisted asset.
///
/// The two reads are separate so callers only pay for what they use.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError>;
    async fn dominant_color(&self, path: &Path) -> Result<Rgb, ProbeError>;
}

/// [`ImageProbe`] backed by the `image` crate.
///
/// Decoding runs on the blocking pool. The format is sniffed from content,
/// so assets persisted without an extension still work.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterProbe;

impl RasterProbe {
    fn open(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, ProbeError> {
        ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|err| ProbeError::Io(path.to_path_buf(), err))
    }

    fn read_dimensions(path: &Path) -> Result<Dimensions, ProbeError> {
        let (width, height) = Self::open(path)?
            .into_dimensions()
            .map_err(|err| ProbeError::Decode(path.to_path_buf(), err))?;
        Ok(Dimensions { width, height })
    }

    fn read_dominant_color(path: &Path) -> Result<Rgb, ProbeError> {
        let img = Self::open(path)?
            .decode()
            .map_err(|err| ProbeError::Decode(path.to_path_buf(), err))?;
        Ok(dominant_color(&img.to_rgb8()))
    }
}

#[async_trait]
impl ImageProbe for RasterProbe {
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::read_dimensions(&path)).await?
    }

    async fn dominant_color(&self, path: &Path) -> Result<Rgb, ProbeError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::read_dominant_color(&path)).await?
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, RgbImage};

    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, image::Rgb([40, 120, 200]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn reads_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 100, 50);

        let dims = RasterProbe.dimensions(&path).await.unwrap();
        assert_eq!(dims, Dimensions { width: 100, height: 50 });
    }

    #[tokio::test]
    async fn sniffs_format_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 3, 7);
        let bare = dir.path().join("avatar");
        std::fs::rename(&path, &bare).unwrap();

        let dims = RasterProbe.dimensions(&bare).await.unwrap();
        assert_eq!(dims, Dimensions { width: 3, height: 7 });
    }

    #[tokio::test]
    async fn reads_dominant_color() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 8, 8);

        let color = RasterProbe.dominant_color(&path).await.unwrap();
        assert_eq!(color, Rgb::new(40, 120, 200));
    }

    #[tokio::test]
    async fn rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = RasterProbe.dimensions(&path).await.unwrap_err();
        assert!(matches!(err, ProbeError::Decode(..)));
    }

    #[tokio::test]
    async fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RasterProbe
            .dominant_color(&dir.path().join("nope.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Io(..)));
    }
}
