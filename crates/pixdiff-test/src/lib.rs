//! pixdiff-test - Regression test framework for pixdiff
//!
//! Tests record numbered checks on a [`RegParams`] and report all
//! failures at the end instead of stopping at the first one. Bitmaps
//! produced by a test can be written as PNG to `tests/regout` at the
//! workspace root for visual inspection.
//!
//! # Usage
//!
//! ```ignore
//! use pixdiff_test::RegParams;
//!
//! let mut rp = RegParams::new("histogram");
//! rp.compare_values(0.0, distance, 0.0);
//! rp.write_bitmap(&mut diff)?;
//! assert!(rp.cleanup());
//! ```

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::RegParams;

use std::path::Path;

/// Load a bitmap from an image file
pub fn load_image<P: AsRef<Path>>(path: P) -> TestResult<pixdiff_core::Bitmap> {
    let path = path.as_ref();
    pixdiff_io::read_image(path).map_err(|e| TestError::ImageLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // pixdiff-test is at crates/pixdiff-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
