//! Structural validation of stretch parameters.
//!
//! Callers must validate before recomputing; per-sample numeric edge
//! cases are handled by the engine itself and are not validation
//! concerns. Availability of the blend/mask *source buffers* is checked
//! at recompute time and soft-fails there.

use super::enums::StretchKind;
use super::params::StretchParameters;

/// Check a parameter record for structural violations.
///
/// Returns a descriptive failure reason instead of panicking.
pub fn validate_parameters(params: &StretchParameters) -> Result<(), String> {
    for (name, v) in [("LP", params.lp), ("SP", params.sp), ("HP", params.hp)] {
        if !(0.0..=1.0).contains(&v) {
            return Err(format!("{} must be within [0, 1], got {}", name, v));
        }
    }
    if params.lp > params.sp || params.sp > params.hp {
        return Err(format!(
            "Protection points must satisfy LP <= SP <= HP, got LP={} SP={} HP={}",
            params.lp, params.sp, params.hp
        ));
    }

    if params.bp >= params.wp {
        return Err(format!(
            "Black point must be below white point, got BP={} WP={}",
            params.bp, params.wp
        ));
    }

    if !params.d.is_finite() || params.d < 0.0 {
        return Err(format!(
            "Stretch intensity D must be finite and non-negative, got {}",
            params.d
        ));
    }
    if !params.b.is_finite() {
        return Err(format!("Local intensity b must be finite, got {}", params.b));
    }

    if !(0.0..=100.0).contains(&params.combine_percent) {
        return Err(format!(
            "Blend percentage must be within [0, 100], got {}",
            params.combine_percent
        ));
    }

    if params.kind == StretchKind::Blend && params.combine_target_id.is_none() {
        return Err("Blend requires a combine target".to_string());
    }

    if params.invert && !params.kind.is_invertible(params.combine_percent) {
        return Err(format!(
            "Invert requested for a non-invertible configuration ({:?})",
            params.kind
        ));
    }

    if params.lum_coefficients.iter().any(|&c| !(c >= 0.0)) {
        return Err(format!(
            "Luminance coefficients must be non-negative, got {:?}",
            params.lum_coefficients
        ));
    }
    if params.lum_coefficients.iter().sum::<f64>() <= 0.0 {
        return Err("Luminance coefficients must not all be zero".to_string());
    }

    Ok(())
}
