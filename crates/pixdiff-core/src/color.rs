//! RGBA color values read from a bitmap
//!
//! # Packed form
//!
//! Colors pack into a 24-bit integer `0xRRGGBB`. Alpha is not part of the
//! packed form; it is used as a compact color key on the engine wire.

/// Red channel index
pub const RED: usize = 0;
/// Green channel index
pub const GREEN: usize = 1;
/// Blue channel index
pub const BLUE: usize = 2;
/// Alpha channel index
pub const ALPHA: usize = 3;

/// Shift amounts for the packed `0xRRGGBB` form
pub const RED_SHIFT: u32 = 16;
pub const GREEN_SHIFT: u32 = 8;
pub const BLUE_SHIFT: u32 = 0;

/// An 8-bit RGBA color.
///
/// Alpha defaults to 255 (opaque) when built with [`RgbaColor::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for RgbaColor {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl RgbaColor {
    /// Opaque white
    pub const WHITE: RgbaColor = RgbaColor::new(255, 255, 255);

    /// The orange WebPageTest paints before a page starts rendering
    pub const WEB_PAGE_TEST_ORANGE: RgbaColor = RgbaColor::new(222, 100, 13);

    /// Fully transparent black, used for pixels outside an image.
    pub const TRANSPARENT: RgbaColor = RgbaColor::rgba(0, 0, 0, 0);

    /// Create an opaque color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a `0xRRGGBB` integer into an opaque color.
    ///
    /// Bits above the low 24 are ignored.
    pub const fn from_packed(packed: u32) -> Self {
        Self::new(
            ((packed >> RED_SHIFT) & 0xff) as u8,
            ((packed >> GREEN_SHIFT) & 0xff) as u8,
            ((packed >> BLUE_SHIFT) & 0xff) as u8,
        )
    }

    /// Pack into `0xRRGGBB`, dropping alpha.
    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << RED_SHIFT) | ((self.g as u32) << GREEN_SHIFT) | self.b as u32
    }

    /// Channel values in R, G, B, A order.
    pub const fn channels(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Check whether every channel, alpha included, is within `tolerance`
    /// of `other`.
    ///
    /// Each channel is compared independently; this is not a Euclidean
    /// distance.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixdiff_core::RgbaColor;
    ///
    /// let c = RgbaColor::new(10, 10, 10);
    /// assert!(c.is_equal(&RgbaColor::new(12, 12, 12), 2));
    /// assert!(!c.is_equal(&RgbaColor::new(12, 12, 12), 1));
    /// ```
    pub fn is_equal(&self, other: &RgbaColor, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
            && self.a.abs_diff(other.a) <= tolerance
    }

    /// Like [`is_equal`](Self::is_equal) but ignoring alpha.
    pub fn is_rgb_equal(&self, other: &RgbaColor, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }

    /// Check against an opaque `(r, g, b)` triple.
    pub fn is_rgb(&self, r: u8, g: u8, b: u8, tolerance: u8) -> bool {
        self.is_equal(&RgbaColor::new(r, g, b), tolerance)
    }

    /// Check against an `(r, g, b, a)` quadruple.
    pub fn is_rgba(&self, r: u8, g: u8, b: u8, a: u8, tolerance: u8) -> bool {
        self.is_equal(&RgbaColor::rgba(r, g, b, a), tolerance)
    }
}

impl From<RgbaColor> for u32 {
    fn from(color: RgbaColor) -> u32 {
        color.to_packed()
    }
}

impl From<(u8, u8, u8)> for RgbaColor {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        RgbaColor::new(r, g, b)
    }
}

impl From<(u8, u8, u8, u8)> for RgbaColor {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        RgbaColor::rgba(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alpha_is_opaque() {
        assert_eq!(RgbaColor::new(1, 2, 3).a, 255);
        assert_eq!(RgbaColor::from((1, 2, 3)).a, 255);
    }

    #[test]
    fn test_is_equal_tolerance() {
        let c = RgbaColor::new(10, 10, 10);
        assert!(c.is_equal(&RgbaColor::new(12, 12, 12), 2));
        assert!(!c.is_equal(&RgbaColor::new(12, 12, 12), 1));
        assert!(c.is_equal(&c, 0));
    }

    #[test]
    fn test_is_equal_per_channel() {
        // One channel off by 3 fails even though the others match exactly
        let c = RgbaColor::new(100, 100, 100);
        assert!(!c.is_equal(&RgbaColor::new(100, 103, 100), 2));
    }

    #[test]
    fn test_is_equal_includes_alpha() {
        let opaque = RgbaColor::new(0, 0, 0);
        assert!(!opaque.is_equal(&RgbaColor::TRANSPARENT, 254));
        assert!(opaque.is_equal(&RgbaColor::TRANSPARENT, 255));
        assert!(opaque.is_rgb_equal(&RgbaColor::TRANSPARENT, 0));
    }

    #[test]
    fn test_packed_roundtrip() {
        let c = RgbaColor::WEB_PAGE_TEST_ORANGE;
        assert_eq!(c.to_packed(), 0xDE640D);
        assert_eq!(RgbaColor::from_packed(0xDE640D), c);
        assert_eq!(u32::from(RgbaColor::WHITE), 0xFFFFFF);
    }

    #[test]
    fn test_packed_drops_alpha() {
        assert_eq!(RgbaColor::rgba(1, 2, 3, 0).to_packed(), 0x010203);
    }

    #[test]
    fn test_is_rgb_helpers() {
        let c = RgbaColor::rgba(5, 6, 7, 8);
        assert!(c.is_rgba(5, 6, 7, 8, 0));
        assert!(!c.is_rgb(5, 6, 7, 0));
        assert!(RgbaColor::new(5, 6, 7).is_rgb(4, 7, 6, 1));
    }
}
