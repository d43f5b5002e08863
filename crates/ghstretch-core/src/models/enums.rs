//! Enumerations for the stretch parameter model.

use serde::{Deserialize, Serialize};

/// The transform family applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StretchKind {
    /// Generalised hyperbolic stretch (D, b, SP, LP, HP)
    #[default]
    GeneralisedHyperbolic,
    /// Classical midtones-transfer histogram transformation (D, SP, LP, HP)
    HistogramTransformation,
    /// Arcsinh stretch (D, SP, LP, HP)
    Arcsinh,
    /// Linear black/white point stretch (BP, WP)
    Linear,
    /// Image inversion, f(x) = 1 - x
    Inversion,
    /// Blend with a second view (combine_target_id, combine_percent)
    Blend,
    /// Auto screen-transfer-function stretch from image statistics
    Stf,
}

impl StretchKind {
    /// Whether `invert` may be requested for this kind at the given blend
    /// percentage. Inversion, STF and a 100% blend are never invertible.
    pub fn is_invertible(&self, combine_percent: f64) -> bool {
        match self {
            StretchKind::Inversion | StretchKind::Stf => false,
            StretchKind::Blend => combine_percent < 100.0,
            _ => true,
        }
    }
}

/// Exclusive selection of the channel(s) a transform targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    Red,
    Green,
    Blue,
    /// Every color channel independently (single channel for mono images)
    #[default]
    Rgb,
    /// HSL lightness, stretched and reinserted without altering hue/chroma
    Lightness,
    /// HSV saturation (channel index 1 of the HSV representation)
    Saturation,
    /// Coefficient-weighted luminance with an overflow policy
    Luminance,
}

impl ChannelMode {
    /// Buffer channel index for the direct single-channel modes.
    pub fn direct_channel(&self) -> Option<u8> {
        match self {
            ChannelMode::Red => Some(0),
            ChannelMode::Green => Some(1),
            ChannelMode::Blue => Some(2),
            _ => None,
        }
    }

    /// Modes operating on a virtual channel derived from all color
    /// channels. These are masked as a final blend pass, never inline.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            ChannelMode::Lightness | ChannelMode::Saturation | ChannelMode::Luminance
        )
    }
}

/// What to do when luminance scaling pushes a color component above 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Clamp each component independently (may shift hue)
    Clip,
    /// Divide all components by the maximum (preserves hue, desaturates)
    #[default]
    Rescale,
}
