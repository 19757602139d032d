//! pixdiff Core - pixel comparison and color statistics
//!
//! This crate provides the data structures behind visual regression
//! comparisons:
//!
//! - [`Bitmap`] - decoded 8-bit RGB/RGBA image with lazy cropping
//! - [`RgbaColor`] - color value with tolerance-aware equality
//! - [`ColorHistogram`] / [`histogram_distance`] - per-channel histograms
//!   and earth mover's distance
//! - [`Rect`] - crop and bounding boxes
//! - [`PixelEngine`] / [`NativeEngine`] - bulk pixel operations
//! - [`ImageCodec`] - image encode/decode collaborator

pub mod bitmap;
pub mod codec;
pub mod color;
pub mod engine;
pub mod error;
pub mod histogram;
pub mod rect;

pub use bitmap::{Bitmap, Bpp, Metadata, MetadataValue};
pub use codec::ImageCodec;
pub use color::RgbaColor;
pub use engine::{BoundingBox, NativeEngine, PixelEngine, PixelFrame};
pub use error::{Error, Result};
pub use histogram::{ChannelHistogram, ColorHistogram, HISTOGRAM_BUCKETS, histogram_distance};
pub use rect::Rect;
