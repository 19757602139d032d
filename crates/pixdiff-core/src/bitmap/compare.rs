//! Bitmap comparison
//!
//! - Equality within a per-channel tolerance
//! - Difference images for bitmaps of possibly different sizes

use super::{Bitmap, Bpp};
use crate::codec::ImageCodec;
use crate::color::RgbaColor;
use crate::error::Result;

impl Bitmap {
    /// Check whether two bitmaps are identical within `tolerance`.
    ///
    /// Bitmaps of different logical sizes are never equal. With
    /// `tolerance == 0` and matching bpp the raw buffers are compared byte
    /// for byte; otherwise every pixel is compared with
    /// [`RgbaColor::is_equal`], stopping at the first mismatch.
    ///
    /// # Errors
    ///
    /// Returns an error if a pending crop on either bitmap cannot be
    /// applied.
    pub fn is_equal(&mut self, other: &mut Bitmap, tolerance: u8) -> Result<bool> {
        if self.width() != other.width() || self.height() != other.height() {
            return Ok(false);
        }

        self.materialize()?;
        other.materialize()?;
        if tolerance == 0 && self.bpp == other.bpp {
            return Ok(self.materialized().data == other.materialized().data);
        }
        Ok(self.pixels_match(other, tolerance))
    }

    /// Pixel-by-pixel scan; both bitmaps materialized and of equal size.
    fn pixels_match(&self, other: &Bitmap, tolerance: u8) -> bool {
        let (a, b) = (self.materialized(), other.materialized());
        for y in 0..a.height {
            for x in 0..a.width {
                let c0 = a.color_at(self.bpp, x, y);
                let c1 = b.color_at(other.bpp, x, y);
                if !c0.is_equal(&c1, tolerance) {
                    return false;
                }
            }
        }
        true
    }

    /// Build an image of the per-channel absolute difference to `other`.
    ///
    /// The output is RGB (alpha is ignored) and as large as the larger of
    /// the two bitmaps in each dimension. Where a pixel lies outside one of
    /// the bitmaps, that side counts as transparent black. The pixel grid is
    /// encoded and decoded again with `codec`, so the result is a bitmap
    /// like any other decoded image.
    ///
    /// # Errors
    ///
    /// Returns an error if a pending crop cannot be applied or if the codec
    /// fails.
    pub fn diff(&mut self, other: &mut Bitmap, codec: &dyn ImageCodec) -> Result<Bitmap> {
        let width = self.width().max(other.width());
        let height = self.height().max(other.height());
        let grid = self.diff_grid(other)?;
        let encoded = codec.encode(Bpp::Rgb, width, height, &grid)?;
        codec.decode(&encoded)
    }

    /// Raw RGB difference grid backing [`Bitmap::diff`].
    fn diff_grid(&mut self, other: &mut Bitmap) -> Result<Vec<u8>> {
        self.materialize()?;
        other.materialize()?;

        let width = self.width().max(other.width());
        let height = self.height().max(other.height());
        let mut grid = Vec::with_capacity(3 * width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let c0 = self.color_or_transparent(x, y);
                let c1 = other.color_or_transparent(x, y);
                grid.extend_from_slice(&[
                    c0.r.abs_diff(c1.r),
                    c0.g.abs_diff(c1.g),
                    c0.b.abs_diff(c1.b),
                ]);
            }
        }
        Ok(grid)
    }

    fn color_or_transparent(&self, x: u32, y: u32) -> RgbaColor {
        let buffer = self.materialized();
        if x < buffer.width && y < buffer.height {
            buffer.color_at(self.bpp, x, y)
        } else {
            RgbaColor::TRANSPARENT
        }
    }
}
