//! Lazy cropping

use super::{Bitmap, Storage};
use crate::error::{Error, Result};
use crate::rect::Rect;

impl Bitmap {
    /// Crop the bitmap to a box given relative to the current logical image.
    ///
    /// Only the crop box is recorded; pixels are cut out on the next read.
    /// A crop on top of a pending crop composes with it, translated into
    /// coordinates of the original buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCrop`] if the box is empty or falls outside
    /// the current logical image. The bitmap is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixdiff_core::Bitmap;
    ///
    /// let mut bmp = Bitmap::new(3, 10, 10, vec![0; 300]).unwrap();
    /// bmp.crop(2, 2, 6, 6).unwrap().crop(1, 1, 2, 3).unwrap();
    /// assert_eq!((bmp.width(), bmp.height()), (2, 3));
    /// assert!(bmp.crop(0, 0, 3, 3).is_err());
    /// ```
    pub fn crop(&mut self, left: i32, top: i32, width: i32, height: i32) -> Result<&mut Self> {
        let current = self.storage.logical_box();
        let requested = Rect::new_unchecked(left, top, width, height);
        if width <= 0 || height <= 0 || !requested.fits_within(current.w as u32, current.h as u32)
        {
            return Err(Error::InvalidCrop {
                left,
                top,
                width,
                height,
                bound_width: current.w as u32,
                bound_height: current.h as u32,
            });
        }

        let crop = requested.translate(current.x, current.y);
        let buffer = match std::mem::replace(
            &mut self.storage,
            Storage::Uncropped(Default::default()),
        ) {
            Storage::Uncropped(buffer) | Storage::PendingCrop { buffer, .. } => buffer,
        };
        self.storage = Storage::PendingCrop { buffer, crop };
        Ok(self)
    }
}
