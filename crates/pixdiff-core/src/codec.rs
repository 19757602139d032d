//! Image codec collaborator
//!
//! The core crate does not read or write image files. Operations that must
//! hand back a first-class image (such as [`Bitmap::diff`]) go through an
//! [`ImageCodec`] supplied by the caller; `pixdiff-io` provides a PNG one.

use crate::bitmap::{Bitmap, Bpp};
use crate::error::Result;

/// Encode raw pixels to image bytes and decode them back into a [`Bitmap`].
pub trait ImageCodec {
    /// Encode a row-major pixel grid.
    fn encode(&self, bpp: Bpp, width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>>;

    /// Decode image bytes.
    fn decode(&self, data: &[u8]) -> Result<Bitmap>;
}
