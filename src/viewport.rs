//! Contains the Viewport struct, which describes the relationship
//! between a rectangle on the integral pixel plane with an origin at
//! 0,0 and the region of the complex plane currently on screen,
//! defined by a center point and a zoom level.

use num::Complex;

/// Divisor that converts a user-facing zoom level into the mapper's
/// internal scale factor.  A zoom of 200 therefore means "scale 1",
/// which shows roughly four units of the complex plane across the
/// canvas.  This is an empirical constant tuned against the 800x600
/// default canvas, not a derived invariant; revisit it if the default
/// canvas dimensions change.
pub const ZOOM_NORMALIZATION: f64 = 200.0;

/// Zoom multiplier for the preview view preset.  Empirical, tuned for
/// the 800x600 default canvas alongside [`ZOOM_NORMALIZATION`];
/// candidates for recalibration if the default dimensions change.
pub const PREVIEW_ZOOM_MULTIPLIER: f64 = 15.0;

/// Zoom multiplier for the close-up view preset.  Empirical, see
/// [`PREVIEW_ZOOM_MULTIPLIER`].
pub const CLOSEUP_ZOOM_MULTIPLIER: f64 = 20.0;

/// Width of the canvas the zoom constants were tuned against.
pub const DEFAULT_WIDTH: u32 = 800;

/// Height of the canvas the zoom constants were tuned against.
pub const DEFAULT_HEIGHT: u32 = 600;

/// Describes the rectangle of the complex plane mapped onto the
/// canvas: pixel dimensions, the complex point under the canvas
/// center, and the zoom level.  Maps pixel coordinates to points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// The complex point under the center of the canvas.
    pub center: Complex<f64>,
    /// Zoom level.  Must be positive and finite; the engine rejects
    /// anything else before this struct is ever asked to map a pixel.
    pub zoom: f64,
}

impl Viewport {
    /// Constructor.  Takes the canvas dimensions in pixels, the
    /// complex coordinates of the canvas center, and the zoom level.
    pub fn new(width: u32, height: u32, center_re: f64, center_im: f64, zoom: f64) -> Viewport {
        Viewport {
            width,
            height,
            center: Complex::new(center_re, center_im),
            zoom,
        }
    }

    /// The total number of pixels on the canvas.  Used to calculate
    /// buffer sizes.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when either dimension is zero and there is nothing to
    /// render.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Given the column and row of a pixel on the canvas, return the
    /// complex number under that pixel.  The mapping is pure and
    /// deterministic: the center pixel always lands exactly on
    /// `center`, and the visible extent shrinks as `zoom` grows.
    pub fn pixel_to_point(&self, x: u32, y: u32) -> Complex<f64> {
        let scale = self.zoom / ZOOM_NORMALIZATION;
        let width = f64::from(self.width);
        let height = f64::from(self.height);
        Complex::new(
            (f64::from(x) - width / 2.0) / (scale * width / 4.0) + self.center.re,
            (f64::from(y) - height / 2.0) / (scale * height / 4.0) + self.center.im,
        )
    }
}

impl Default for Viewport {
    fn default() -> Viewport {
        Viewport::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, -0.5, 0.0, ZOOM_NORMALIZATION)
    }
}
