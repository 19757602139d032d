//! Error types for pixdiff-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Variants are grouped by failure kind so that test harnesses can branch
//! on them:
//!
//! - construction errors (bad bpp, dimensions, pixel buffer)
//! - geometric errors (crop box, pixel coordinates)
//! - statistical errors (histogram distance preconditions)
//! - engine and protocol errors (external pixel engine)
//! - codec errors (image encode/decode collaborators)

use thiserror::Error;

/// pixdiff error type
#[derive(Error, Debug)]
pub enum Error {
    /// Bytes per pixel other than 3 or 4
    #[error("invalid bytes per pixel: {0}")]
    InvalidBpp(u32),

    /// Zero width or height
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// No pixel data supplied
    #[error("must specify pixels")]
    EmptyPixels,

    /// Pixel buffer length does not match `bpp * width * height`
    #[error("dimensions and pixels mismatch: expected {expected} bytes, got {actual}")]
    PixelCountMismatch { expected: usize, actual: usize },

    /// Crop box falls outside the current logical image
    #[error(
        "invalid dimensions: crop ({left}, {top}, {width}x{height}) exceeds {bound_width}x{bound_height}"
    )]
    InvalidCrop {
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        bound_width: u32,
        bound_height: u32,
    },

    /// Rect with a negative width or height
    #[error("rect dimensions must be non-negative: {width}x{height}")]
    InvalidRect { width: i32, height: i32 },

    /// Pixel coordinate outside the logical image
    #[error("pixel ({x}, {y}) out of range for {width}x{height} image")]
    PixelOutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Histograms of different bucket counts
    #[error("trying to compare histograms of different sizes, {0} != {1}")]
    HistogramLengthMismatch(usize, usize),

    /// A histogram passed to the distance function has no mass
    #[error("{0} histogram has 0 pixels in it")]
    EmptyHistogram(&'static str),

    /// An empty histogram channel without a default color to fall back on
    #[error("histogram has no data and no default color")]
    MissingDefaultColor,

    /// Some channels of a histogram are empty while others are not
    #[error("histogram channels disagree on pixel count: r={r}, g={g}, b={b}")]
    InconsistentHistogram { r: u64, g: u64, b: u64 },

    /// Mass left over after the distance walk
    #[error("{0} pixel(s) left over after computing histogram distance")]
    ResidualMass(u128),

    /// The engine produced no response; carries its error stream
    #[error("pixel engine failed: {detail}")]
    EngineFailed { detail: String },

    /// Malformed request or response framing
    #[error("pixel engine protocol error: {0}")]
    Protocol(String),

    /// A second command on a single-use engine channel
    #[error("exactly one command allowed per engine channel")]
    ChannelReused,

    /// I/O error talking to the engine
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode error
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Image encode error
    #[error("encode error: {0}")]
    EncodeError(String),
}

/// Result type alias for pixdiff operations
pub type Result<T> = std::result::Result<T, Error>;
