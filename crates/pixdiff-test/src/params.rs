//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::{load_image, regout_dir};
use pixdiff_core::Bitmap;
use pixdiff_io::ImageFormat;
use std::fs;
use std::path::PathBuf;

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "histogram")
    pub test_name: String,
    /// Current test index (incremented before each test)
    index: usize,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    pub fn new(test_name: &str) -> Self {
        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    fn fail(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Compare two bitmaps within a per-channel tolerance
    ///
    /// # Returns
    ///
    /// `true` if the bitmaps are equal, `false` otherwise (including when a
    /// pending crop could not be applied).
    pub fn compare_bitmaps(&mut self, bmp1: &mut Bitmap, bmp2: &mut Bitmap, tolerance: u8) -> bool {
        self.index += 1;

        let outcome = bmp1.is_equal(bmp2, tolerance);
        match outcome {
            Ok(true) => true,
            Ok(false) => {
                let msg = format!(
                    "Failure in {}_reg: bitmap comparison for index {} - {}x{} vs {}x{}, tolerance {}",
                    self.test_name,
                    self.index,
                    bmp1.width(),
                    bmp1.height(),
                    bmp2.width(),
                    bmp2.height(),
                    tolerance
                );
                self.fail(msg);
                false
            }
            Err(e) => {
                let msg = format!(
                    "Failure in {}_reg: bitmap comparison for index {} - {}",
                    self.test_name, self.index, e
                );
                self.fail(msg);
                false
            }
        }
    }

    /// Write a bitmap as PNG to the regout directory for inspection
    ///
    /// The file is named `<test>.<index>.png`. It is read back and must
    /// match the bitmap exactly; a mismatch is recorded as a failure.
    ///
    /// # Returns
    ///
    /// The path written, or an error if writing or reading back failed.
    pub fn write_bitmap(&mut self, bitmap: &mut Bitmap) -> TestResult<PathBuf> {
        self.index += 1;
        fs::create_dir_all(regout_dir())?;

        let format = ImageFormat::Png;
        let path = PathBuf::from(format!(
            "{}/{}.{:02}.{}",
            regout_dir(),
            self.test_name,
            self.index,
            format.extension()
        ));

        pixdiff_io::write_image(bitmap, &path, format).map_err(|e| TestError::ImageWrite {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut written = load_image(&path)?;
        if !written.is_equal(bitmap, 0)? {
            let msg = format!(
                "Failure in {}_reg, index {}: {} does not read back as written",
                self.test_name,
                self.index,
                path.display()
            );
            self.fail(msg);
        }
        Ok(path)
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all tests passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
