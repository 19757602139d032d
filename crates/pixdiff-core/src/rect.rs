//! Rect - rectangular image regions
//!
//! Used for crop boxes and color bounding boxes. Coordinates are signed so
//! that invalid requests (negative origins, negative sizes) can be reported
//! instead of being unrepresentable.

use crate::error::{Error, Result};

/// A rectangle `(x, y, w, h)`: left, top, width, height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Create a new rect
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRect`] if width or height is negative.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        if w < 0 || h < 0 {
            return Err(Error::InvalidRect {
                width: w,
                height: h,
            });
        }
        Ok(Self { x, y, w, h })
    }

    /// Create a rect without validation
    pub const fn new_unchecked(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect covering a whole `width x height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new_unchecked(0, 0, width as i32, height as i32)
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    /// Number of pixels covered
    pub fn area(&self) -> usize {
        self.w.max(0) as usize * self.h.max(0) as usize
    }

    /// Check whether this rect lies inside a `width x height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.w >= 0
            && self.h >= 0
            && self.right() <= width as i64
            && self.bottom() <= height as i64
    }

    /// Translate by an offset.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new_unchecked(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// As a `(left, top, width, height)` tuple
    pub fn to_tuple(self) -> (i32, i32, i32, i32) {
        (self.x, self.y, self.w, self.h)
    }
}
