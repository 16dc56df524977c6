//! Decode, resize, grayscale, re-encode, and write to the scratch directory.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::cleanup::ScratchFile;

/// Width and height of every filtered image. Aspect ratio is not kept.
pub const OUTPUT_SIZE: u32 = 256;
/// JPEG quality of every filtered image, 0-100.
pub const JPEG_QUALITY: u8 = 60;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("not a decodable image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("jpeg encoding failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transform task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Applies the fixed filter and stores its output under `scratch_dir`.
#[derive(Clone, Debug)]
pub struct Transformer {
    scratch_dir: PathBuf,
}

impl Transformer {
    /// `scratch_dir` is created on first use if it does not exist.
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self { scratch_dir }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Filters `bytes` and writes the JPEG to a file no other call will use.
    ///
    /// Pixel work and the write both run on the blocking pool, and the
    /// [`ScratchFile`] guard is created there too. If the caller stops
    /// waiting, the finished task's guard is dropped with it and the file is
    /// removed.
    pub async fn transform(&self, bytes: Bytes) -> Result<ScratchFile, TransformError> {
        let dir = self.scratch_dir.clone();
        let file = tokio::task::spawn_blocking(move || write_filtered(&dir, &bytes)).await??;

        debug!(path = %file.path().display(), "wrote filtered image");
        Ok(file)
    }
}

fn write_filtered(dir: &Path, bytes: &[u8]) -> Result<ScratchFile, TransformError> {
    let jpeg = filter(bytes)?;

    std::fs::create_dir_all(dir)
        .map_err(|source| TransformError::Io { path: dir.to_path_buf(), source })?;

    // Guard first, so a half-written file is removed on error.
    let file = ScratchFile::new(dir.join(unique_file_name()));
    std::fs::write(file.path(), &jpeg)
        .map_err(|source| TransformError::Io { path: file.path().to_path_buf(), source })?;
    Ok(file)
}

/// Decodes any supported raster format and returns the filtered JPEG bytes.
pub fn filter(bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
    let gray = image::load_from_memory(bytes)
        .map_err(TransformError::Decode)?
        .resize_exact(OUTPUT_SIZE, OUTPUT_SIZE, FilterType::Lanczos3)
        .into_luma8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode(gray.as_raw(), gray.width(), gray.height(), ExtendedColorType::L8)
        .map_err(TransformError::Encode)?;
    Ok(out)
}

/// `filtered_<unix-millis>_<uuid>.jpg`. The random part keeps names unique
/// when two requests land in the same millisecond.
fn unique_file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("filtered_{millis}_{}.jpg", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, GenericImageView, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn filter_outputs_256_gray_jpeg() {
        let jpeg = filter(&png(640, 120)).unwrap();

        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (OUTPUT_SIZE, OUTPUT_SIZE));
        assert_eq!(decoded.color(), ColorType::L8);
    }

    #[test]
    fn filter_rejects_non_images() {
        let err = filter(b"<html>not an image</html>").unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));
    }

    #[tokio::test]
    async fn transform_writes_into_missing_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("nested").join("scratch");
        let transformer = Transformer::new(scratch.clone());

        let file = transformer.transform(Bytes::from(png(32, 32))).await.unwrap();

        assert!(file.path().starts_with(&scratch));
        assert!(file.path().is_absolute());
        let name = file.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("filtered_") && name.ends_with(".jpg"), "{name}");
        assert!(file.path().exists());

        let path = file.path().to_path_buf();
        file.remove().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn transform_paths_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let transformer = Transformer::new(dir.path().to_path_buf());
        let bytes = Bytes::from(png(16, 16));

        let (a, b) = tokio::join!(
            transformer.transform(bytes.clone()),
            transformer.transform(bytes),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.path(), b.path());
        assert!(a.path().exists() && b.path().exists());
    }

    #[tokio::test]
    async fn transform_decode_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let transformer = Transformer::new(dir.path().to_path_buf());

        let err = transformer.transform(Bytes::from_static(b"plain text")).await.unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn abandoned_transform_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let transformer = Transformer::new(dir.path().to_path_buf());
        let bytes = Bytes::from(png(64, 64));

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            // Poll the transform once so its blocking task starts, then drop it.
            tokio::select! {
                biased;
                _ = transformer.transform(bytes) => {}
                () = std::future::ready(()) => {}
            }
        });
        // Dropping the runtime waits for the blocking task to finish.
        drop(rt);

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn file_names_differ() {
        assert_ne!(unique_file_name(), unique_file_name());
    }
}
