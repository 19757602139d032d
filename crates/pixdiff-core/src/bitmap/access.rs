//! Pixel access
//!
//! Every read of pixel bytes first applies a pending crop.

use super::{Bitmap, Bpp, PixelBuffer, Storage};
use crate::color::RgbaColor;
use crate::error::{Error, Result};

impl PixelBuffer {
    /// Color at `(x, y)`; caller guarantees bounds.
    pub(crate) fn color_at(&self, bpp: Bpp, x: u32, y: u32) -> RgbaColor {
        let n = bpp.bytes() as usize;
        let base = n * (y as usize * self.width as usize + x as usize);
        let p = &self.data[base..base + n];
        match bpp {
            Bpp::Rgba => RgbaColor::rgba(p[0], p[1], p[2], p[3]),
            Bpp::Rgb => RgbaColor::new(p[0], p[1], p[2]),
        }
    }
}

impl Bitmap {
    /// The materialized buffer. Only valid after [`Bitmap::materialize`].
    pub(crate) fn materialized(&self) -> &PixelBuffer {
        self.storage.buffer()
    }

    /// Flat pixel bytes of the logical image.
    ///
    /// # Errors
    ///
    /// Returns an error if a pending crop cannot be applied.
    pub fn pixels(&mut self) -> Result<&[u8]> {
        self.materialize()?;
        Ok(&self.materialized().data)
    }

    /// Mutable flat pixel bytes of the logical image.
    ///
    /// # Errors
    ///
    /// Returns an error if a pending crop cannot be applied.
    pub fn pixels_mut(&mut self) -> Result<&mut [u8]> {
        self.materialize()?;
        match &mut self.storage {
            Storage::Uncropped(buffer) | Storage::PendingCrop { buffer, .. } => {
                Ok(&mut buffer.data)
            }
        }
    }

    /// Consume the bitmap, returning its logical pixel bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a pending crop cannot be applied.
    pub fn into_pixels(mut self) -> Result<Vec<u8>> {
        self.materialize()?;
        match self.storage {
            Storage::Uncropped(buffer) | Storage::PendingCrop { buffer, .. } => Ok(buffer.data),
        }
    }

    /// Get the color of the pixel at `(x, y)`.
    ///
    /// Channels are read in R, G, B\[, A\] order; 3-bpp images report
    /// alpha 255.
    ///
    /// # Errors
    ///
    /// - [`Error::PixelOutOfRange`] if `(x, y)` is outside the logical image
    /// - an engine error if a pending crop cannot be applied
    pub fn get_pixel_color(&mut self, x: u32, y: u32) -> Result<RgbaColor> {
        let (width, height) = (self.width(), self.height());
        if x >= width || y >= height {
            return Err(Error::PixelOutOfRange {
                x,
                y,
                width,
                height,
            });
        }
        self.materialize()?;
        Ok(self.materialized().color_at(self.bpp, x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Bitmap {
        #[rustfmt::skip]
        let pixels = vec![
            255, 0, 0, 255,     0, 255, 0, 255,
            0, 0, 255, 255,     255, 255, 255, 128,
        ];
        Bitmap::new(4, 2, 2, pixels).unwrap()
    }

    #[test]
    fn test_get_pixel_color_corners() {
        let mut bmp = corners();
        assert_eq!(bmp.get_pixel_color(0, 0).unwrap(), RgbaColor::new(255, 0, 0));
        assert_eq!(bmp.get_pixel_color(1, 0).unwrap(), RgbaColor::new(0, 255, 0));
        assert_eq!(bmp.get_pixel_color(0, 1).unwrap(), RgbaColor::new(0, 0, 255));
        assert_eq!(
            bmp.get_pixel_color(1, 1).unwrap(),
            RgbaColor::rgba(255, 255, 255, 128)
        );
    }

    #[test]
    fn test_get_pixel_color_rgb_is_opaque() {
        let mut bmp = Bitmap::new(3, 1, 1, vec![1, 2, 3]).unwrap();
        assert_eq!(bmp.get_pixel_color(0, 0).unwrap().a, 255);
    }

    #[test]
    fn test_get_pixel_color_out_of_range() {
        let mut bmp = corners();
        assert!(matches!(
            bmp.get_pixel_color(2, 0),
            Err(Error::PixelOutOfRange { x: 2, y: 0, .. })
        ));
        bmp.crop(1, 1, 1, 1).unwrap();
        assert!(bmp.get_pixel_color(1, 0).is_err());
    }

    #[test]
    fn test_get_pixel_color_after_crop() {
        let mut bmp = corners();
        bmp.crop(1, 0, 1, 2).unwrap();
        assert_eq!(bmp.get_pixel_color(0, 0).unwrap(), RgbaColor::new(0, 255, 0));
        assert!(!bmp.has_pending_crop());
        assert_eq!(
            bmp.get_pixel_color(0, 1).unwrap(),
            RgbaColor::rgba(255, 255, 255, 128)
        );
    }

    #[test]
    fn test_pixels_mut_writes_through() {
        let mut bmp = corners();
        bmp.pixels_mut().unwrap()[0] = 7;
        assert_eq!(bmp.get_pixel_color(0, 0).unwrap().r, 7);
        assert_eq!(bmp.into_pixels().unwrap().len(), 16);
    }
}
