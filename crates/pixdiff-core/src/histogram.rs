//! Color histograms and earth mover's distance
//!
//! A [`ColorHistogram`] holds one 256-bucket count table per RGB channel.
//! Two histograms are compared with the earth mover's distance on the
//! ordered bucket axis, summed over the three channels.

use crate::color::RgbaColor;
use crate::error::{Error, Result};

/// Number of buckets per channel histogram
pub const HISTOGRAM_BUCKETS: usize = 256;

/// One channel's bucket counts
pub type ChannelHistogram = [u32; HISTOGRAM_BUCKETS];

/// Per-channel RGB histograms with an optional fallback color.
///
/// When a histogram was built over a region with no counted pixels, the
/// `default_color` stands in as a single-pixel spike so that distances can
/// still be measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorHistogram {
    /// Red channel histogram
    pub r: ChannelHistogram,
    /// Green channel histogram
    pub g: ChannelHistogram,
    /// Blue channel histogram
    pub b: ChannelHistogram,
    /// Color substituted when the histogram is empty
    pub default_color: Option<RgbaColor>,
}

impl ColorHistogram {
    /// Create a histogram from three channel tables.
    pub fn new(
        r: ChannelHistogram,
        g: ChannelHistogram,
        b: ChannelHistogram,
        default_color: Option<RgbaColor>,
    ) -> Self {
        Self {
            r,
            g,
            b,
            default_color,
        }
    }

    /// Create an all-zero histogram.
    pub fn empty(default_color: Option<RgbaColor>) -> Self {
        Self::new(
            [0; HISTOGRAM_BUCKETS],
            [0; HISTOGRAM_BUCKETS],
            [0; HISTOGRAM_BUCKETS],
            default_color,
        )
    }

    /// Build from 768 counts laid out as 256 red, 256 green, 256 blue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if `counts` does not hold exactly 768
    /// values.
    pub fn from_flat(counts: &[u32], default_color: Option<RgbaColor>) -> Result<Self> {
        if counts.len() != 3 * HISTOGRAM_BUCKETS {
            return Err(Error::Protocol(format!(
                "the color histogram has the wrong number of buckets: {}",
                counts.len()
            )));
        }
        let mut hist = Self::empty(default_color);
        hist.r.copy_from_slice(&counts[..HISTOGRAM_BUCKETS]);
        hist.g
            .copy_from_slice(&counts[HISTOGRAM_BUCKETS..2 * HISTOGRAM_BUCKETS]);
        hist.b.copy_from_slice(&counts[2 * HISTOGRAM_BUCKETS..]);
        Ok(hist)
    }

    /// Flatten into 768 counts, red then green then blue.
    pub fn to_flat(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(3 * HISTOGRAM_BUCKETS);
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.g);
        out.extend_from_slice(&self.b);
        out
    }

    /// Channel table by index (0 = red, 1 = green, 2 = blue).
    pub fn channel(&self, index: usize) -> Option<&ChannelHistogram> {
        match index {
            0 => Some(&self.r),
            1 => Some(&self.g),
            2 => Some(&self.b),
            _ => None,
        }
    }

    /// Total count of one channel; 0 for an index past blue.
    pub fn channel_total(&self, index: usize) -> u64 {
        self.channel(index)
            .map_or(0, |table| table.iter().map(|&c| c as u64).sum())
    }

    /// Count one pixel into all three channels.
    pub fn add_pixel(&mut self, color: RgbaColor) {
        self.r[color.r as usize] += 1;
        self.g[color.g as usize] += 1;
        self.b[color.b as usize] += 1;
    }

    /// Check whether no pixels were counted.
    pub fn is_empty(&self) -> bool {
        (0..3).all(|i| self.channel_total(i) == 0)
    }

    /// Channel tables to feed the distance walk, substituting the default
    /// color spike when the whole histogram is empty.
    fn effective_channels(&self) -> Result<[ChannelHistogram; 3]> {
        let totals = [
            self.channel_total(0),
            self.channel_total(1),
            self.channel_total(2),
        ];
        if totals.iter().all(|&t| t > 0) {
            return Ok([self.r, self.g, self.b]);
        }
        if totals.iter().any(|&t| t > 0) {
            return Err(Error::InconsistentHistogram {
                r: totals[0],
                g: totals[1],
                b: totals[2],
            });
        }

        let color = self.default_color.ok_or(Error::MissingDefaultColor)?;
        let mut spikes = [[0u32; HISTOGRAM_BUCKETS]; 3];
        for (i, spike) in spikes.iter_mut().enumerate() {
            spike[color.channels()[i] as usize] = 1;
        }
        Ok(spikes)
    }

    /// Earth mover's distance to another histogram, summed over R, G and B.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingDefaultColor`] if either histogram is empty and has
    ///   no default color
    /// - [`Error::InconsistentHistogram`] if either histogram has some empty
    ///   and some populated channels
    pub fn distance(&self, other: &ColorHistogram) -> Result<f64> {
        let mine = self.effective_channels()?;
        let theirs = other.effective_channels()?;
        let mut total = 0.0;
        for (h1, h2) in mine.iter().zip(theirs.iter()) {
            total += histogram_distance(h1, h2)?;
        }
        Ok(total)
    }
}

/// Earth mover's distance between two bucket count sequences.
///
/// Both histograms are normalized to unit mass, then the cost of moving
/// mass from one into the shape of the other is measured with a ground
/// distance of one per bucket. Carrying the per-bucket surplus forward as a
/// running remainder gives the transport cost in a single pass.
///
/// # Errors
///
/// - [`Error::HistogramLengthMismatch`] if the lengths differ
/// - [`Error::EmptyHistogram`] if either sequence sums to zero
/// - [`Error::ResidualMass`] if mass is not conserved by the walk
///
/// # Examples
///
/// ```
/// use pixdiff_core::histogram_distance;
///
/// let a = [1, 0, 0];
/// let b = [0, 0, 1];
/// assert_eq!(histogram_distance(&a, &b).unwrap(), 2.0);
/// ```
pub fn histogram_distance(hist1: &[u32], hist2: &[u32]) -> Result<f64> {
    if hist1.len() != hist2.len() {
        return Err(Error::HistogramLengthMismatch(hist1.len(), hist2.len()));
    }

    let n1: i128 = hist1.iter().map(|&v| v as i128).sum();
    let n2: i128 = hist2.iter().map(|&v| v as i128).sum();
    if n1 == 0 {
        return Err(Error::EmptyHistogram("first"));
    }
    if n2 == 0 {
        return Err(Error::EmptyHistogram("second"));
    }

    let mut total: i128 = 0;
    let mut remainder: i128 = 0;
    for (&v1, &v2) in hist1.iter().zip(hist2.iter()) {
        remainder += v1 as i128 * n2 - v2 as i128 * n1;
        total += remainder.abs();
    }
    if remainder != 0 {
        return Err(Error::ResidualMass(remainder.unsigned_abs()));
    }

    Ok((total as f64 / n1 as f64 / n2 as f64).abs())
}
