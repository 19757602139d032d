//! Color statistics delegated to the pixel engine
//!
//! These run over the logical image, pending crop included, without
//! materializing it.

use super::Bitmap;
use crate::color::RgbaColor;
use crate::engine::BoundingBox;
use crate::error::Result;
use crate::histogram::ColorHistogram;

impl Bitmap {
    /// Compute per-channel histograms of the bitmap's pixel colors.
    ///
    /// Pixels whose RGB is within `tolerance` of `ignore_color` are left
    /// out of all three channels. The histogram's default color is set to
    /// `ignore_color`, so an image made only of the ignored color still
    /// compares meaningfully.
    ///
    /// # Errors
    ///
    /// Returns the engine's error.
    pub fn color_histogram(
        &self,
        ignore_color: Option<RgbaColor>,
        tolerance: u8,
    ) -> Result<ColorHistogram> {
        log::debug!(
            "histogram of {}x{} (ignore {:?}, tolerance {})",
            self.width(),
            self.height(),
            ignore_color,
            tolerance
        );
        self.engine
            .histogram(&self.frame()?, ignore_color, tolerance)
    }

    /// Find the smallest box around every pixel whose RGB is within
    /// `tolerance` of `color`. Alpha is ignored.
    ///
    /// The box is relative to the logical image and is `None` when nothing
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns the engine's error.
    pub fn get_bounding_box(&self, color: RgbaColor, tolerance: u8) -> Result<BoundingBox> {
        log::debug!(
            "bounding box of {:06x} in {}x{} (tolerance {})",
            color.to_packed(),
            self.width(),
            self.height(),
            tolerance
        );
        self.engine.bounding_box(&self.frame()?, color, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    /// 4x4 white RGBA image with a 2x1 orange bar at (1, 2)
    fn with_bar() -> Bitmap {
        let mut pixels = [255u8, 255, 255, 255].repeat(16);
        for x in 1..3 {
            let base = 4 * (2 * 4 + x);
            pixels[base..base + 4].copy_from_slice(&[222, 100, 13, 10]);
        }
        Bitmap::new(4, 4, 4, pixels).unwrap()
    }

    #[test]
    fn test_bounding_box() {
        let bmp = with_bar();
        let bb = bmp
            .get_bounding_box(RgbaColor::WEB_PAGE_TEST_ORANGE, 0)
            .unwrap();
        assert_eq!(bb.match_count, 2);
        assert_eq!(bb.rect, Some(Rect::new_unchecked(1, 2, 2, 1)));
    }

    #[test]
    fn test_bounding_box_pending_crop() {
        let mut bmp = with_bar();
        bmp.crop(2, 1, 2, 3).unwrap();
        let bb = bmp
            .get_bounding_box(RgbaColor::WEB_PAGE_TEST_ORANGE, 0)
            .unwrap();
        assert!(bmp.has_pending_crop());
        assert_eq!(bb.match_count, 1);
        assert_eq!(bb.rect, Some(Rect::new_unchecked(0, 1, 1, 1)));
    }

    #[test]
    fn test_bounding_box_no_match() {
        let bmp = with_bar();
        let bb = bmp.get_bounding_box(RgbaColor::new(0, 0, 0), 10).unwrap();
        assert_eq!(bb.rect, None);
        assert_eq!(bb.match_count, 0);
    }

    #[test]
    fn test_color_histogram_ignore() {
        let bmp = with_bar();
        let hist = bmp.color_histogram(Some(RgbaColor::WHITE), 0).unwrap();
        assert_eq!(hist.channel_total(0), 2);
        assert_eq!(hist.r[222], 2);
        assert_eq!(hist.g[100], 2);
        assert_eq!(hist.b[13], 2);
        assert_eq!(hist.default_color, Some(RgbaColor::WHITE));
    }

    #[test]
    fn test_color_histogram_all_ignored_uses_default() {
        let mut bmp = with_bar();
        bmp.crop(0, 0, 4, 2).unwrap();
        let blank = bmp.color_histogram(Some(RgbaColor::WHITE), 0).unwrap();
        assert!(blank.is_empty());

        let white = Bitmap::new(3, 1, 1, vec![255, 255, 255]).unwrap();
        let reference = white.color_histogram(None, 0).unwrap();
        assert_eq!(blank.distance(&reference).unwrap(), 0.0);
    }
}
