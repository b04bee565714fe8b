//! Output writers for extracted data
//!
//! Sample grids are written through the `image` crate, which picks the
//! encoder from the file extension. Anything else is dumped as bytes.

use std::fs;
use std::path::Path;

use image::{ImageBuffer, Luma, Rgb};
use log::info;

use crate::tiff::errors::{RawError, RawResult};
use crate::utils::progress::ProgressTracker;

/// Extensions written as images rather than raw bytes
const IMAGE_EXTENSIONS: &[&str] = &["pgm", "pnm", "ppm", "png", "tif", "tiff"];

/// Whether `path` names an image format the encoder knows
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Saves a 16-bit grayscale sample grid
///
/// `progress` advances once per copied row.
pub fn save_samples(
    path: &Path,
    width: u32,
    height: u32,
    samples: &[u16],
    progress: &ProgressTracker,
) -> RawResult<()> {
    let row_len = width as usize;
    if row_len == 0 || samples.len() < row_len * height as usize {
        return Err(RawError::InvalidArgument(format!(
            "{} samples do not fill a {}x{} image",
            samples.len(),
            width,
            height
        )));
    }

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in samples.chunks_exact(row_len).take(height as usize) {
        pixels.extend_from_slice(row);
        progress.increment(1);
    }

    let buffer: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(width, height, pixels)
        .ok_or_else(|| RawError::InvalidArgument("sample buffer size mismatch".to_string()))?;
    buffer.save(path)?;
    info!("Wrote {}x{} samples to {}", width, height, path.display());
    Ok(())
}

/// Saves an 8-bit interleaved RGB pixmap
pub fn save_rgb8(path: &Path, width: u32, height: u32, data: &[u8]) -> RawResult<()> {
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or_else(|| RawError::InvalidArgument(format!("{} bytes do not fill a {}x{} pixmap", data.len(), width, height)))?;
    buffer.save(path)?;
    info!("Wrote {}x{} pixmap to {}", width, height, path.display());
    Ok(())
}

/// Writes `bytes` unchanged
pub fn write_bytes(path: &Path, bytes: &[u8]) -> RawResult<()> {
    fs::write(path, bytes)?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn image_extensions() {
        assert!(is_image_path(Path::new("out.PGM")));
        assert!(is_image_path(Path::new("out.png")));
        assert!(!is_image_path(Path::new("out.raw")));
        assert!(!is_image_path(Path::new("out")));
    }

    #[test]
    fn saves_sixteen_bit_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfa.png");
        let progress = ProgressTracker::hidden(2);
        save_samples(&path, 2, 2, &[0, 1000, 4095, 65535], &progress).unwrap();
        assert_eq!(progress.position(), 2);

        let decoded = image::open(&path).unwrap().into_luma16();
        assert_eq!(decoded.into_raw(), vec![0, 1000, 4095, 65535]);
    }

    #[test]
    fn short_sample_buffer_is_rejected() {
        let dir = tempdir().unwrap();
        let progress = ProgressTracker::hidden(2);
        let result = save_samples(&dir.path().join("x.png"), 2, 2, &[0; 3], &progress);
        assert!(matches!(result, Err(RawError::InvalidArgument(_))));
    }
}
