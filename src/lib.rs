#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal rendering engine
//!
//! Given a viewport over the complex plane, a fractal formula, an
//! iteration budget, and a color palette, this crate produces a
//! raster image.  Each pixel is mapped to a complex point, the point
//! is iterated under the formula until its orbit escapes a fixed
//! radius or the budget runs out, and the resulting count is blended
//! through the palette into an RGBA byte buffer owned by the caller.
//!
//! The crate is a pure computation module: it has no opinion about
//! canvases, widgets, or themes.  A front end supplies the render
//! parameters (including the in-set color its theme wants) and blits
//! the buffer it gets back.  Renders are cheap to abandon: the engine
//! carries a generation counter, and starting a newer render makes
//! every in-flight older one stop at its next row checkpoint.

pub mod color;
pub mod engine;
pub mod error;
pub mod formula;
pub mod viewport;

pub use crate::color::{preset, shade, Rgb, PRESET_NAMES};
pub use crate::engine::{Engine, RenderOutcome, RenderSettings, RenderToken, BYTES_PER_PIXEL};
pub use crate::error::ConfigError;
pub use crate::formula::{Formula, IterationResult, ESCAPE_RADIUS_SQ};
pub use crate::viewport::{Viewport, ZOOM_NORMALIZATION};
