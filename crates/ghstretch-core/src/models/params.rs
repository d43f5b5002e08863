//! The stretch parameter record.

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_combine_percent, default_false, default_hp, default_lum_coefficients, default_one,
    default_sp, default_true, default_zero,
};
use super::enums::{ChannelMode, OverflowPolicy, StretchKind};

/// Immutable-per-evaluation configuration of one stretch.
///
/// Invariants (checked by [`super::validate_parameters`]):
/// `0 <= LP <= SP <= HP <= 1`, `BP < WP`, `combine_percent` in [0, 100],
/// `invert` only on an invertible configuration, luminance coefficients
/// non-negative and not all zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StretchParameters {
    /// Active transform kind
    #[serde(default)]
    pub kind: StretchKind,

    /// Stretch intensity. 0 reduces GHS/HT/Arcsinh to the identity.
    #[serde(default = "default_zero")]
    pub d: f64,

    /// Local stretch intensity (GHS only)
    #[serde(default = "default_zero")]
    pub b: f64,

    /// Symmetry point, the focus of the stretch
    #[serde(default = "default_sp")]
    pub sp: f64,

    /// Highlight protection point
    #[serde(default = "default_hp")]
    pub hp: f64,

    /// Shadow protection point
    #[serde(default = "default_zero")]
    pub lp: f64,

    /// Black point (linear stretch)
    #[serde(default = "default_zero")]
    pub bp: f64,

    /// White point (linear stretch)
    #[serde(default = "default_one")]
    pub wp: f64,

    /// Apply the inverse transform instead of the forward one
    #[serde(default = "default_false")]
    pub invert: bool,

    /// Which channel(s) the transform targets
    #[serde(default)]
    pub channel_mode: ChannelMode,

    /// Identity of the second view for the Blend kind
    #[serde(default)]
    pub combine_target_id: Option<String>,

    /// Blend percentage, 0..=100 (100 = fully the second view)
    #[serde(default = "default_combine_percent")]
    pub combine_percent: f64,

    /// Overflow handling for the Luminance channel mode
    #[serde(default)]
    pub overflow_policy: OverflowPolicy,

    /// Luminance weights for R, G, B. Non-negative, not all zero.
    #[serde(default = "default_lum_coefficients")]
    pub lum_coefficients: [f64; 3],

    /// STF: derive one parameter set from channel-averaged statistics
    /// instead of stretching each channel by its own statistics.
    #[serde(default = "default_true")]
    pub stf_linked: bool,
}

impl Default for StretchParameters {
    fn default() -> Self {
        Self {
            kind: StretchKind::default(),
            d: 0.0,
            b: 0.0,
            sp: default_sp(),
            hp: default_hp(),
            lp: 0.0,
            bp: 0.0,
            wp: 1.0,
            invert: false,
            channel_mode: ChannelMode::default(),
            combine_target_id: None,
            combine_percent: default_combine_percent(),
            overflow_policy: OverflowPolicy::default(),
            lum_coefficients: default_lum_coefficients(),
            stf_linked: true,
        }
    }
}

impl StretchParameters {
    /// Luminance coefficients scaled to sum 1. A degenerate all-zero sum
    /// yields all-zero coefficients (downstream math then produces 0).
    pub fn normalized_lum_coefficients(&self) -> [f64; 3] {
        let sum: f64 = self.lum_coefficients.iter().sum();
        if sum <= 0.0 {
            return [0.0; 3];
        }
        [
            self.lum_coefficients[0] / sum,
            self.lum_coefficients[1] / sum,
            self.lum_coefficients[2] / sum,
        ]
    }

    /// Blend fraction in [0, 1].
    pub fn combine_fraction(&self) -> f64 {
        self.combine_percent / 100.0
    }
}
