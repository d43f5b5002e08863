//! Screen-transfer-function auto-stretch.
//!
//! Derives display-stretch parameters from image statistics the way the
//! PixInsight/N.I.N.A. autostretch does: the shadow clip point sits a
//! fixed number of (MAD-estimated) sigmas below the median and the
//! midtone balance places the median at a target background level.

/// Shadow clipping in MAD-sigma units below the median.
pub const BLACK_CLIPPING: f64 = -2.8;

/// Target background level the median is mapped to.
pub const TARGET_BACKGROUND: f64 = 0.25;

/// MAD to sigma conversion factor for a normal distribution.
pub const MAD_SIGMA_SCALE: f64 = 1.4826;

/// Midtones transfer function.
///
/// Identity at `midtone == 0.5`; guards the hyperbola's pole so the
/// output is always finite (0 by the engine's edge-case contract).
#[inline]
pub fn mtf(midtone: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let denom = (2.0 * midtone - 1.0) * x - midtone;
    if denom.abs() < 1e-15 {
        return 0.0;
    }
    (midtone - 1.0) * x / denom
}

/// One channel's derived STF remap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StfCurve {
    pub shadows: f64,
    pub midtone: f64,
    pub highlights: f64,
}

impl StfCurve {
    /// Derive the remap from a channel median and median absolute
    /// deviation, both over the normalized [0, 1] range.
    pub fn from_stats(median: f64, mad: f64) -> Self {
        let sigma = mad * MAD_SIGMA_SCALE;
        if median > 0.5 {
            // Inverted or overexposed channel: clip from the high end
            let highlights = (median - BLACK_CLIPPING * sigma).clamp(0.0, 1.0);
            Self {
                shadows: 0.0,
                midtone: mtf(TARGET_BACKGROUND, 1.0 - (highlights - median)),
                highlights,
            }
        } else {
            let shadows = (median + BLACK_CLIPPING * sigma).clamp(0.0, 1.0);
            Self {
                shadows,
                midtone: mtf(TARGET_BACKGROUND, median - shadows),
                highlights: 1.0,
            }
        }
    }

    /// Derive one linked remap from per-channel statistics by averaging
    /// medians and MADs across channels.
    pub fn linked(stats: &[(f64, f64)]) -> Self {
        if stats.is_empty() {
            return Self::identity();
        }
        let n = stats.len() as f64;
        let median = stats.iter().map(|s| s.0).sum::<f64>() / n;
        let mad = stats.iter().map(|s| s.1).sum::<f64>() / n;
        Self::from_stats(median, mad)
    }

    /// The no-op remap.
    pub fn identity() -> Self {
        Self {
            shadows: 0.0,
            midtone: 0.5,
            highlights: 1.0,
        }
    }

    /// Apply the remap to a normalized sample.
    ///
    /// The input is shifted by the clip points before the midtones
    /// transfer, so the channel median lands exactly on the target
    /// background level.
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        let shifted = (1.0 - self.highlights + x - self.shadows).clamp(0.0, 1.0);
        mtf(self.midtone, shifted)
    }
}
