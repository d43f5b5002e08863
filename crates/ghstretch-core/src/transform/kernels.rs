//! The generalised hyperbolic kernel family.
//!
//! Each stretch curve is the normalized integral of a positive kernel
//! centered on the symmetry point SP. Inside [LP, HP] the curve follows
//! the kernel integral; below LP and above HP it continues linearly with
//! the slope the kernel had at the protection point, so shadows and
//! highlights are protected without breaking monotonicity. The whole
//! curve is then normalized to pass through (0, 0) and (1, 1).
//!
//! Kernels are expressed through their antiderivative `F` (with
//! `F(0) = 0`), its slope `F'` and the closed-form inverse `F⁻¹`, which
//! is what makes every member of the family exactly invertible.

/// Kernel selection for one stretch configuration.
///
/// The `d` intensity is strictly positive here; `d == 0` short-circuits
/// to the identity before a kernel is ever built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Kernel {
    /// GHS with b > 0
    Hyperbolic { d: f64, b: f64 },
    /// GHS with b = 0
    Exponential { d: f64 },
    /// GHS with b = -1
    Logarithmic { d: f64 },
    /// GHS with b < 0, b != -1
    NegativePower { d: f64, b: f64 },
    /// Classical midtones-transfer hyperbola (histogram transformation)
    Mtf { d: f64 },
    /// Arcsinh stretch
    Arcsinh { d: f64 },
}

impl Kernel {
    /// Select the GHS kernel variant for a local intensity `b`.
    pub(crate) fn ghs(d: f64, b: f64) -> Self {
        if b > 0.0 {
            Kernel::Hyperbolic { d, b }
        } else if b == 0.0 {
            Kernel::Exponential { d }
        } else if b == -1.0 {
            Kernel::Logarithmic { d }
        } else {
            Kernel::NegativePower { d, b }
        }
    }

    /// Antiderivative F(t) for distance t >= 0 from the symmetry point.
    fn integral(&self, t: f64) -> f64 {
        match *self {
            Kernel::Hyperbolic { d, b } => 1.0 - (1.0 + d * b * t).powf(-1.0 / b),
            Kernel::Exponential { d } => 1.0 - (-d * t).exp(),
            Kernel::Logarithmic { d } => (1.0 + d * t).ln(),
            Kernel::NegativePower { d, b } => {
                (1.0 - (1.0 - d * b * t).powf((b + 1.0) / b)) / (b + 1.0)
            }
            Kernel::Mtf { d } => d * t / (1.0 + d * t),
            Kernel::Arcsinh { d } => (d * t).asinh(),
        }
    }

    /// Slope F'(t), strictly positive for every kernel.
    fn slope(&self, t: f64) -> f64 {
        match *self {
            Kernel::Hyperbolic { d, b } => d * (1.0 + d * b * t).powf(-(1.0 + b) / b),
            Kernel::Exponential { d } => d * (-d * t).exp(),
            Kernel::Logarithmic { d } => d / (1.0 + d * t),
            Kernel::NegativePower { d, b } => d * (1.0 - d * b * t).powf(1.0 / b),
            Kernel::Mtf { d } => d / ((1.0 + d * t) * (1.0 + d * t)),
            Kernel::Arcsinh { d } => d / (1.0 + d * t * (d * t)).sqrt(),
        }
    }

    /// Closed-form inverse of the antiderivative, t = F⁻¹(u) for u in the
    /// image of F.
    fn inverse_integral(&self, u: f64) -> f64 {
        match *self {
            Kernel::Hyperbolic { d, b } => ((1.0 - u).powf(-b) - 1.0) / (d * b),
            Kernel::Exponential { d } => -(1.0 - u).ln() / d,
            Kernel::Logarithmic { d } => (u.exp() - 1.0) / d,
            Kernel::NegativePower { d, b } => {
                (1.0 - (1.0 - (b + 1.0) * u).powf(b / (b + 1.0))) / (d * b)
            }
            Kernel::Mtf { d } => u / (d * (1.0 - u)),
            Kernel::Arcsinh { d } => u.sinh() / d,
        }
    }
}

/// A fully precomputed, normalized stretch curve.
///
/// Coefficients are rebuilt only when the owning parameter signature
/// changes, never per sample.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ZoneCurve {
    lp: f64,
    sp: f64,
    hp: f64,
    kernel: Kernel,
    /// Raw curve value at LP (relative to SP, <= 0)
    r_lp: f64,
    /// Raw curve value at HP (>= 0)
    r_hp: f64,
    /// Linear tail slope below LP
    s_lp: f64,
    /// Linear tail slope above HP
    s_hp: f64,
    /// Raw curve value at x = 0, subtracted during normalization
    r0: f64,
    /// 1 / (raw(1) - raw(0))
    scale: f64,
}

impl ZoneCurve {
    /// Build the curve for the given kernel and protection points.
    ///
    /// Returns `None` if the normalization span degenerates (possible
    /// only through floating-point underflow at extreme intensities);
    /// callers then fall back to the defined 0 output.
    pub(crate) fn new(kernel: Kernel, lp: f64, sp: f64, hp: f64) -> Option<Self> {
        let r_lp = -kernel.integral(sp - lp);
        let r_hp = kernel.integral(hp - sp);
        let s_lp = kernel.slope(sp - lp);
        let s_hp = kernel.slope(hp - sp);

        let r0 = r_lp - s_lp * lp;
        let r1 = r_hp + s_hp * (1.0 - hp);
        let span = r1 - r0;
        if !span.is_finite() || span <= 0.0 || !s_lp.is_finite() || !s_hp.is_finite() {
            return None;
        }
        Some(Self {
            lp,
            sp,
            hp,
            kernel,
            r_lp,
            r_hp,
            s_lp,
            s_hp,
            r0,
            scale: 1.0 / span,
        })
    }

    /// Unnormalized curve value, defined for every real x (linear tails
    /// extend beyond [0, 1]).
    fn raw(&self, x: f64) -> f64 {
        if x < self.lp {
            self.r_lp - self.s_lp * (self.lp - x)
        } else if x < self.sp {
            -self.kernel.integral(self.sp - x)
        } else if x <= self.hp {
            self.kernel.integral(x - self.sp)
        } else {
            self.r_hp + self.s_hp * (x - self.hp)
        }
    }

    /// Forward transform, strictly increasing with T(0) = 0, T(1) = 1.
    pub(crate) fn forward(&self, x: f64) -> f64 {
        (self.raw(x) - self.r0) * self.scale
    }

    /// Exact inverse of [`Self::forward`].
    pub(crate) fn inverse(&self, y: f64) -> f64 {
        let r = y / self.scale + self.r0;
        if r < self.r_lp {
            if self.s_lp <= 0.0 {
                return 0.0;
            }
            self.lp - (self.r_lp - r) / self.s_lp
        } else if r < 0.0 {
            self.sp - self.kernel.inverse_integral(-r)
        } else if r <= self.r_hp {
            self.sp + self.kernel.inverse_integral(r)
        } else {
            if self.s_hp <= 0.0 {
                return 0.0;
            }
            self.hp + (r - self.r_hp) / self.s_hp
        }
    }
}
