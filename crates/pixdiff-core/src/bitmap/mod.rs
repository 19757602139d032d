//! Bitmap - the pixel container compared by visual regression tests
//!
//! A `Bitmap` owns a tightly packed 8-bit RGB or RGBA buffer.
//!
//! # Pixel layout
//!
//! - Rows are stored top to bottom without padding
//! - Each pixel is `bpp` consecutive bytes in R, G, B\[, A\] order
//! - The byte offset of `(x, y)` is `bpp * (y * width + x)`
//!
//! # Lazy cropping
//!
//! [`Bitmap::crop`] only records a crop box. The backing buffer is cut down
//! the first time pixel bytes are read, by handing the buffer and box to the
//! bitmap's [`PixelEngine`]. Operations that run on the engine anyway
//! (histograms, bounding boxes) pass the pending box along instead of
//! materializing.

mod access;
mod clip;
mod compare;
mod statistics;

use crate::engine::{NativeEngine, PixelEngine, PixelFrame};
use crate::error::{Error, Result};
use crate::rect::Rect;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Bytes per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Bpp {
    /// 3 bytes: R, G, B
    Rgb = 3,
    /// 4 bytes: R, G, B, A
    Rgba = 4,
}

impl Bpp {
    /// Create `Bpp` from a raw byte count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBpp`] if `bytes` is not 3 or 4.
    pub fn from_bytes(bytes: u32) -> Result<Self> {
        match bytes {
            3 => Ok(Bpp::Rgb),
            4 => Ok(Bpp::Rgba),
            _ => Err(Error::InvalidBpp(bytes)),
        }
    }

    /// Get the number of bytes per pixel.
    pub fn bytes(self) -> u32 {
        self as u32
    }

    /// Check whether pixels carry alpha.
    pub fn has_alpha(self) -> bool {
        self == Bpp::Rgba
    }

    /// Byte length of a `width x height` buffer, or `None` if a side
    /// exceeds `i32::MAX` or the length overflows.
    pub fn buffer_len(self, width: u32, height: u32) -> Option<usize> {
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return None;
        }
        (self.bytes() as usize)
            .checked_mul(width as usize)?
            .checked_mul(height as usize)
    }
}

/// A value in a bitmap's metadata map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Size(u32, u32),
    Text(String),
}

/// Metadata attached to a bitmap
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A pixel buffer and the dimensions it was laid out with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct PixelBuffer {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

/// Crop state of a bitmap's buffer.
#[derive(Debug, Clone)]
pub(crate) enum Storage {
    /// The buffer is the image.
    Uncropped(PixelBuffer),
    /// The image is `crop` within `buffer`; not yet cut out.
    PendingCrop { buffer: PixelBuffer, crop: Rect },
}

impl Storage {
    fn buffer(&self) -> &PixelBuffer {
        match self {
            Storage::Uncropped(buffer) | Storage::PendingCrop { buffer, .. } => buffer,
        }
    }

    /// The logical image as a box within the buffer.
    fn logical_box(&self) -> Rect {
        match self {
            Storage::Uncropped(buffer) => Rect::full(buffer.width, buffer.height),
            Storage::PendingCrop { crop, .. } => *crop,
        }
    }
}

/// A decoded 8-bit RGB or RGBA image.
///
/// # Examples
///
/// ```
/// use pixdiff_core::{Bitmap, RgbaColor};
///
/// let pixels = vec![
///     255, 0, 0, 255,   0, 255, 0, 255,
///     0, 0, 255, 255,   255, 255, 255, 255,
/// ];
/// let mut bmp = Bitmap::new(4, 2, 2, pixels).unwrap();
/// assert_eq!(bmp.get_pixel_color(1, 0).unwrap(), RgbaColor::new(0, 255, 0));
/// ```
#[derive(Debug, Clone)]
pub struct Bitmap {
    bpp: Bpp,
    storage: Storage,
    metadata: Metadata,
    engine: Arc<dyn PixelEngine>,
}

impl Bitmap {
    /// Create a bitmap from a decoded pixel buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBpp`] if `bpp` is not 3 or 4
    /// - [`Error::InvalidDimension`] if `width` or `height` is 0 or exceeds
    ///   `i32::MAX`
    /// - [`Error::EmptyPixels`] if `pixels` is empty
    /// - [`Error::PixelCountMismatch`] if `bpp * width * height != pixels.len()`
    pub fn new(bpp: u32, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::with_metadata(bpp, width, height, pixels, Metadata::new())
    }

    /// Create a bitmap carrying caller metadata.
    ///
    /// # Errors
    ///
    /// Same as [`Bitmap::new`].
    pub fn with_metadata(
        bpp: u32,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        metadata: Metadata,
    ) -> Result<Self> {
        let bpp = Bpp::from_bytes(bpp)?;
        let expected = match bpp.buffer_len(width, height) {
            Some(len) if len > 0 => len,
            _ => return Err(Error::InvalidDimension { width, height }),
        };
        if pixels.is_empty() {
            return Err(Error::EmptyPixels);
        }
        if pixels.len() != expected {
            return Err(Error::PixelCountMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            bpp,
            storage: Storage::Uncropped(PixelBuffer {
                width,
                height,
                data: pixels,
            }),
            metadata,
            engine: Arc::new(NativeEngine),
        })
    }

    /// Replace the engine used for cropping, histograms and bounding boxes.
    pub fn with_engine(mut self, engine: Arc<dyn PixelEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// The engine this bitmap delegates bulk pixel work to.
    pub fn engine(&self) -> &Arc<dyn PixelEngine> {
        &self.engine
    }

    /// Bytes per pixel.
    pub fn bpp(&self) -> Bpp {
        self.bpp
    }

    /// Logical width (the crop box's width while a crop is pending).
    pub fn width(&self) -> u32 {
        self.storage.logical_box().w as u32
    }

    /// Logical height (the crop box's height while a crop is pending).
    pub fn height(&self) -> u32 {
        self.storage.logical_box().h as u32
    }

    /// Check whether a crop has been requested but not applied yet.
    pub fn has_pending_crop(&self) -> bool {
        matches!(self.storage, Storage::PendingCrop { .. })
    }

    /// Caller metadata plus the live `size`, `alpha` and `bitdepth` keys.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = self.metadata.clone();
        metadata.insert(
            "size".to_string(),
            MetadataValue::Size(self.width(), self.height()),
        );
        metadata.insert(
            "alpha".to_string(),
            MetadataValue::Bool(self.bpp.has_alpha()),
        );
        metadata.insert("bitdepth".to_string(), MetadataValue::Int(8));
        metadata
    }

    /// Mutable access to caller metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Frame describing the backing buffer and the logical box, as sent to
    /// the engine.
    pub fn frame(&self) -> Result<PixelFrame<'_>> {
        let buffer = self.storage.buffer();
        PixelFrame::new(
            self.bpp,
            buffer.width,
            buffer.height,
            self.storage.logical_box(),
            &buffer.data,
        )
    }

    /// Apply a pending crop, replacing the buffer with the cropped pixels.
    ///
    /// Does nothing when no crop is pending.
    ///
    /// # Errors
    ///
    /// Returns the engine's error, or [`Error::Protocol`] if the engine
    /// returned the wrong number of bytes. The bitmap is left unchanged on
    /// error.
    pub fn materialize(&mut self) -> Result<()> {
        let Storage::PendingCrop { crop, .. } = self.storage else {
            return Ok(());
        };

        let data = self.engine.crop_pixels(&self.frame()?)?;
        let expected = self.bpp.bytes() as usize * crop.area();
        if data.len() != expected {
            return Err(Error::Protocol(format!(
                "cropped buffer has {} bytes, expected {}",
                data.len(),
                expected
            )));
        }

        log::debug!(
            "materialized crop ({}, {}, {}x{})",
            crop.x,
            crop.y,
            crop.w,
            crop.h
        );
        self.storage = Storage::Uncropped(PixelBuffer {
            width: crop.w as u32,
            height: crop.h as u32,
            data,
        });
        Ok(())
    }
}
