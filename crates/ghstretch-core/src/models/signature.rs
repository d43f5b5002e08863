//! Structural change-detection signatures.
//!
//! A signature snapshots every input that affects the preview, with
//! numeric fields quantized to display precision so the cache does not
//! thrash on insignificant float noise. Equality of signatures gates
//! recomputation.

use crate::config::SIGNATURE_DECIMALS;
use crate::geometry::Rect;

use super::enums::{ChannelMode, OverflowPolicy, StretchKind};
use super::params::StretchParameters;

/// Quantize a parameter value to `SIGNATURE_DECIMALS` decimal places.
#[inline]
fn quantize(value: f64) -> i64 {
    (value * 10f64.powi(SIGNATURE_DECIMALS as i32)).round() as i64
}

/// Snapshot of the stretch parameters in stable field order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StretchSignature {
    kind: StretchKind,
    numeric: [i64; 8],
    invert: bool,
    channel_mode: ChannelMode,
    combine_target_id: Option<String>,
    overflow_policy: OverflowPolicy,
    lum: [i64; 3],
    stf_linked: bool,
}

impl From<&StretchParameters> for StretchSignature {
    fn from(p: &StretchParameters) -> Self {
        Self {
            kind: p.kind,
            numeric: [
                quantize(p.d),
                quantize(p.b),
                quantize(p.sp),
                quantize(p.hp),
                quantize(p.lp),
                quantize(p.bp),
                quantize(p.wp),
                quantize(p.combine_percent),
            ],
            invert: p.invert,
            channel_mode: p.channel_mode,
            combine_target_id: p.combine_target_id.clone(),
            overflow_policy: p.overflow_policy,
            lum: [
                quantize(p.lum_coefficients[0]),
                quantize(p.lum_coefficients[1]),
                quantize(p.lum_coefficients[2]),
            ],
            stf_linked: p.stf_linked,
        }
    }
}

/// Mask identity and orientation as seen by the preview pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaskSignature {
    pub id: String,
    pub inverted: bool,
}

/// Everything the preview depends on: parameters, target identity, mask
/// identity/orientation and the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewSignature {
    pub stretch: StretchSignature,
    pub target_id: String,
    pub mask: Option<MaskSignature>,
    pub selection: Rect,
}

/// Gates recomputation on signature changes.
///
/// The stored signature is updated only on successful completion of a
/// recompute pass.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<PreviewSignature>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the signature differs from the last committed one.
    pub fn needs_recompute(&self, signature: &PreviewSignature) -> bool {
        self.last.as_ref() != Some(signature)
    }

    /// Record a successfully applied signature.
    pub fn commit(&mut self, signature: PreviewSignature) {
        self.last = Some(signature);
    }

    /// Drop the committed signature, forcing the next pass to recompute.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<&PreviewSignature> {
        self.last.as_ref()
    }
}
