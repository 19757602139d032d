//! pixdiff - pixel comparison for visual regression testing
//!
//! # Overview
//!
//! pixdiff compares rendered screenshots and page captures:
//!
//! - Decoding PNG captures into [`Bitmap`]s
//! - Lazy cropping to a region of interest
//! - Equality within a per-channel tolerance
//! - Difference images between captures of any size
//! - Color histograms and earth mover's distance between them
//! - Bounding boxes of a marker color
//! - Running bulk pixel work in an external engine process
//!
//! # Example
//!
//! ```
//! use pixdiff::{Bitmap, RgbaColor};
//!
//! let mut bmp = Bitmap::new(3, 2, 1, vec![255, 255, 255, 222, 100, 13]).unwrap();
//! let bb = bmp.get_bounding_box(RgbaColor::WEB_PAGE_TEST_ORANGE, 0).unwrap();
//! assert_eq!(bb.match_count, 1);
//! assert!(bmp.get_pixel_color(0, 0).unwrap().is_rgb(255, 255, 255, 0));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use pixdiff_core::*;

// Re-export the other crates as modules to avoid name conflicts
pub use pixdiff_engine as engine;
pub use pixdiff_io as io;

/// Difference image of two PNG-encoded images, itself PNG-encoded.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] if either input is not a readable PNG
/// and [`Error::EncodeError`] if the result cannot be written.
pub fn diff_png(png1: &[u8], png2: &[u8]) -> Result<Vec<u8>> {
    let mut a = io::read_image_mem(png1).map_err(io::IoError::into_core)?;
    let mut b = io::read_image_mem(png2).map_err(io::IoError::into_core)?;
    let mut diff = a.diff(&mut b, &io::PngCodec)?;
    io::write_image_mem(&mut diff, io::ImageFormat::Png).map_err(io::IoError::into_core)
}
