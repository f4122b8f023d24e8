// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iteration kernel.
//!
//! Every supported fractal is an iterated recurrence on the complex
//! plane: start from some z0, repeatedly apply a formula-specific
//! update, and count how many steps the orbit takes to leave the
//! circle of radius two.  Points whose orbits never leave within the
//! iteration budget are treated as members of the set.
//!
//! The formula is an exhaustively matched enum, so the per-step loops
//! below are monomorphic: the branch on the formula variant happens
//! once per point, never inside the iteration loop.

use num::Complex;

/// Squared escape radius.  An orbit has escaped once `|z|^2` reaches
/// this value; all formulas share it.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// The fixed set of fractal formulas the kernel understands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Formula {
    /// `z = z^2 + c`, with c the sampled point and z0 = 0.
    Mandelbrot,
    /// `z = z^2 + c`, with z0 the sampled point and c held fixed.
    Julia {
        /// Real part of the fixed Julia constant.
        re: f64,
        /// Imaginary part of the fixed Julia constant.
        im: f64,
    },
    /// `z = (|Re z| + i|Im z|)^2 + c`, the Burning Ship fold.
    BurningShip,
    /// `z = conj(z)^2 + c`, the Mandelbrot's mirror image.
    Tricorn,
    /// `z = z^power + c` via polar form.  The power must be positive;
    /// the engine rejects anything else before the pixel loop starts.
    Multibrot {
        /// Exponent applied to z on every step.
        power: f64,
    },
    /// `z = z^3 + c`, with both z0 and c set to the sampled point.
    Feather,
}

/// The outcome of iterating a single point: how many update steps ran
/// and whether the orbit escaped.  `count` is always in
/// `[0, max_iterations]`, and for an escaped orbit it is minimal: the
/// orbit was still inside the escape radius after `count - 1` steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationResult {
    /// Number of update steps applied before stopping.
    pub count: u32,
    /// True when the orbit left the escape radius; false when the
    /// iteration budget ran out first.
    pub escaped: bool,
}

impl Formula {
    /// Iterate one point of the complex plane under this formula,
    /// stopping at the first step whose result leaves the escape
    /// radius or when the budget runs out.
    pub fn iterate(self, point: Complex<f64>, max_iterations: u32) -> IterationResult {
        let origin = Complex::new(0.0, 0.0);
        match self {
            Formula::Mandelbrot => escape_loop(origin, point, max_iterations, |z, c| z * z + c),
            Formula::Julia { re, im } => {
                escape_loop(point, Complex::new(re, im), max_iterations, |z, c| z * z + c)
            }
            Formula::BurningShip => escape_loop(origin, point, max_iterations, |z, c| {
                let folded = Complex::new(z.re.abs(), z.im.abs());
                folded * folded + c
            }),
            Formula::Tricorn => escape_loop(origin, point, max_iterations, |z, c| {
                let mirrored = z.conj();
                mirrored * mirrored + c
            }),
            Formula::Multibrot { power } => escape_loop(origin, point, max_iterations, |z, c| {
                let r = z.norm().powf(power);
                let theta = z.im.atan2(z.re) * power;
                Complex::new(r * theta.cos(), r * theta.sin()) + c
            }),
            Formula::Feather => escape_loop(point, point, max_iterations, |z, c| {
                Complex::new(
                    z.re * z.re * z.re - 3.0 * z.re * z.im * z.im + c.re,
                    3.0 * z.re * z.re * z.im - z.im * z.im * z.im + c.im,
                )
            }),
        }
    }
}

/// The loop shape every formula shares: apply the update, test the
/// squared magnitude, stop on escape or on budget exhaustion.  The
/// step closure is monomorphized per formula, so nothing here
/// dispatches inside the hot loop.
fn escape_loop<F>(
    mut z: Complex<f64>,
    c: Complex<f64>,
    max_iterations: u32,
    step: F,
) -> IterationResult
where
    F: Fn(Complex<f64>, Complex<f64>) -> Complex<f64>,
{
    for count in 1..=max_iterations {
        z = step(z, c);
        if z.norm_sqr() >= ESCAPE_RADIUS_SQ {
            return IterationResult {
                count,
                escaped: true,
            };
        }
    }
    IterationResult {
        count: max_iterations,
        escaped: false,
    }
}
