//! Color-model conversions
//!
//! Provides the RGB <-> HSL and RGB <-> HSV conversions backing the
//! Lightness and Saturation channel modes, plus the weighted-luminance
//! helper used by the Luminance mode, readout and histogram channels.

mod hsl;
mod hsv;


// Re-export primary types
pub use hsl::Hsl;
pub use hsv::Hsv;

pub use hsl::{hsl_to_rgb, rgb_to_hsl};
pub use hsv::{hsv_to_rgb, rgb_to_hsv};

/// Weighted luminance of an RGB triple.
///
/// The coefficients are expected to be normalized to sum 1 (see
/// [`crate::models::StretchParameters::normalized_lum_coefficients`]).
#[inline]
pub fn weighted_luminance(r: f32, g: f32, b: f32, coeffs: &[f64; 3]) -> f64 {
    coeffs[0] * f64::from(r) + coeffs[1] * f64::from(g) + coeffs[2] * f64::from(b)
}
