//! Configuration errors.
//!
//! Every variant here is detected during validation, before any pixel
//! work begins, and is fully recoverable: the caller fixes the
//! offending parameter and submits a new render.  A superseded render
//! is deliberately *not* an error; see `RenderOutcome`.

use failure::Fail;

/// A render request that failed validation.  No pixels were touched.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// The Multibrot exponent was zero, negative, or not finite.
    #[fail(display = "multibrot power must be positive and finite, got {}", power)]
    NonPositivePower {
        /// The rejected exponent.
        power: f64,
    },
    /// The iteration budget was zero.
    #[fail(display = "max_iterations must be at least 1")]
    ZeroIterations,
    /// The palette held no colors.
    #[fail(display = "palette must hold at least one color")]
    EmptyPalette,
    /// The zoom level was zero, negative, or not finite.
    #[fail(display = "zoom must be positive and finite, got {}", zoom)]
    InvalidZoom {
        /// The rejected zoom level.
        zoom: f64,
    },
    /// The supplied pixel buffer does not match the viewport.
    #[fail(
        display = "pixel buffer holds {} bytes but the render needs {}",
        actual, needed
    )]
    BufferSize {
        /// Bytes the viewport requires (width * height * 4).
        needed: usize,
        /// Bytes the caller actually supplied.
        actual: usize,
    },
}
