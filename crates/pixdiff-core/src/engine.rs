//! Pixel engine - bulk pixel operations over a cropped frame
//!
//! Cropping, histogram tabulation and bounding-box search scan every pixel
//! of a region. They sit behind the [`PixelEngine`] trait so that a bitmap
//! can run them in process ([`NativeEngine`]) or hand them to an external
//! engine process speaking the binary protocol (see the `pixdiff-engine`
//! crate).

use crate::bitmap::Bpp;
use crate::color::RgbaColor;
use crate::error::{Error, Result};
use crate::histogram::ColorHistogram;
use crate::rect::Rect;
use std::fmt;

/// An un-cropped pixel buffer plus the active crop box.
///
/// This is exactly what an engine request carries: the backing buffer
/// geometry, the region of interest and the raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct PixelFrame<'a> {
    bpp: Bpp,
    width: u32,
    height: u32,
    crop: Rect,
    pixels: &'a [u8],
}

impl<'a> PixelFrame<'a> {
    /// Create a frame.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimension`] if a side exceeds `i32::MAX`
    /// - [`Error::PixelCountMismatch`] if `pixels` does not hold
    ///   `bpp * width * height` bytes
    /// - [`Error::InvalidCrop`] if `crop` leaves the buffer
    pub fn new(bpp: Bpp, width: u32, height: u32, crop: Rect, pixels: &'a [u8]) -> Result<Self> {
        let expected = bpp
            .buffer_len(width, height)
            .ok_or(Error::InvalidDimension { width, height })?;
        if pixels.len() != expected {
            return Err(Error::PixelCountMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        if !crop.fits_within(width, height) {
            return Err(Error::InvalidCrop {
                left: crop.x,
                top: crop.y,
                width: crop.w,
                height: crop.h,
                bound_width: width,
                bound_height: height,
            });
        }
        Ok(Self {
            bpp,
            width,
            height,
            crop,
            pixels,
        })
    }

    /// Bytes per pixel
    pub fn bpp(&self) -> Bpp {
        self.bpp
    }

    /// Width of the backing buffer
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the backing buffer
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Active crop box, in buffer coordinates
    pub fn crop(&self) -> Rect {
        self.crop
    }

    /// Raw bytes of the backing buffer
    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// Color at buffer coordinates `(x, y)`; no bounds check beyond slicing.
    fn color_at(&self, x: u32, y: u32) -> RgbaColor {
        let bpp = self.bpp.bytes() as usize;
        let base = bpp * (y as usize * self.width as usize + x as usize);
        let p = &self.pixels[base..base + bpp];
        match self.bpp {
            Bpp::Rgba => RgbaColor::rgba(p[0], p[1], p[2], p[3]),
            Bpp::Rgb => RgbaColor::new(p[0], p[1], p[2]),
        }
    }

    /// Visit every pixel of the crop box in row-major order, passing
    /// crop-relative coordinates.
    fn for_each_in_crop(&self, mut f: impl FnMut(u32, u32, RgbaColor)) {
        let Rect { x, y, w, h } = self.crop;
        for dy in 0..h as u32 {
            for dx in 0..w as u32 {
                f(dx, dy, self.color_at(x as u32 + dx, y as u32 + dy));
            }
        }
    }
}

/// Result of a bounding-box search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// Smallest rect holding every match, relative to the crop box;
    /// `None` if nothing matched.
    pub rect: Option<Rect>,
    /// Number of matching pixels
    pub match_count: u32,
}

/// Bulk pixel operations.
///
/// Each call is independent: implementations must not keep state between
/// calls.
pub trait PixelEngine: fmt::Debug + Send + Sync {
    /// Extract the crop box as a tightly packed buffer.
    fn crop_pixels(&self, frame: &PixelFrame<'_>) -> Result<Vec<u8>>;

    /// Per-channel histograms of the crop box.
    ///
    /// Pixels whose RGB is within `tolerance` of `ignore_color` are not
    /// counted. The result's default color is `ignore_color`.
    fn histogram(
        &self,
        frame: &PixelFrame<'_>,
        ignore_color: Option<RgbaColor>,
        tolerance: u8,
    ) -> Result<ColorHistogram>;

    /// Smallest box holding all pixels whose RGB is within `tolerance` of
    /// `color`. Alpha is ignored.
    fn bounding_box(
        &self,
        frame: &PixelFrame<'_>,
        color: RgbaColor,
        tolerance: u8,
    ) -> Result<BoundingBox>;
}

/// In-process engine working directly on the frame buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl PixelEngine for NativeEngine {
    fn crop_pixels(&self, frame: &PixelFrame<'_>) -> Result<Vec<u8>> {
        let bpp = frame.bpp.bytes() as usize;
        let Rect { x, y, w, h } = frame.crop;
        let row_bytes = w as usize * bpp;
        let stride = frame.width as usize * bpp;

        let mut out = Vec::with_capacity(row_bytes * h as usize);
        for row in y as usize..(y + h) as usize {
            let start = row * stride + x as usize * bpp;
            out.extend_from_slice(&frame.pixels[start..start + row_bytes]);
        }
        Ok(out)
    }

    fn histogram(
        &self,
        frame: &PixelFrame<'_>,
        ignore_color: Option<RgbaColor>,
        tolerance: u8,
    ) -> Result<ColorHistogram> {
        let mut hist = ColorHistogram::empty(ignore_color);
        frame.for_each_in_crop(|_, _, color| {
            if let Some(ignore) = ignore_color
                && color.is_rgb_equal(&ignore, tolerance)
            {
                return;
            }
            hist.add_pixel(color);
        });
        Ok(hist)
    }

    fn bounding_box(
        &self,
        frame: &PixelFrame<'_>,
        color: RgbaColor,
        tolerance: u8,
    ) -> Result<BoundingBox> {
        let mut count = 0u32;
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);
        frame.for_each_in_crop(|x, y, c| {
            if c.is_rgb_equal(&color, tolerance) {
                count += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        });

        let rect = (count > 0).then(|| {
            Rect::new_unchecked(
                min_x as i32,
                min_y as i32,
                (max_x - min_x + 1) as i32,
                (max_y - min_y + 1) as i32,
            )
        });
        Ok(BoundingBox {
            rect,
            match_count: count,
        })
    }
}
