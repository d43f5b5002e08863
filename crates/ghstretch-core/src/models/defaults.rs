//! Default value functions for serde.

/// Default false value for serde
pub fn default_false() -> bool {
    false
}

/// Default true value for serde
pub fn default_true() -> bool {
    true
}

/// Default zero value for serde
pub fn default_zero() -> f64 {
    0.0
}

/// Default one value for serde
pub fn default_one() -> f64 {
    1.0
}

/// Default symmetry point (0.0 = stretch focused at black)
pub fn default_sp() -> f64 {
    0.0
}

/// Default highlight protection point (1.0 = no highlight protection)
pub fn default_hp() -> f64 {
    1.0
}

/// Default blend percentage (100 = fully the second view)
pub fn default_combine_percent() -> f64 {
    100.0
}

/// Default luminance coefficients (Rec.709)
pub fn default_lum_coefficients() -> [f64; 3] {
    [0.2126, 0.7152, 0.0722]
}
