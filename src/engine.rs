// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The full-frame render engine.
//!
//! The engine validates a render request once, then walks every pixel
//! of the viewport: map the pixel to a complex point, iterate the
//! formula, shade the count, write RGBA into the caller-owned buffer.
//! It holds no cross-render state except a monotonically increasing
//! generation counter used for cooperative cancellation: each render
//! captures a token from [`Engine::begin`], and a later `begin` call
//! supersedes every earlier token.  Workers re-check the live counter
//! at row granularity and stop writing as soon as their token is
//! stale, reporting [`RenderOutcome::Superseded`] rather than an
//! error.

use std::iter::Enumerate;
use std::slice::ChunksMut;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use itertools::iproduct;

use crate::color::{self, Rgb};
use crate::error::ConfigError;
use crate::formula::Formula;
use crate::viewport::Viewport;

/// Bytes per pixel in the output buffer: RGBA, one byte per channel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Everything one frame needs.  Supplied fresh on every render call;
/// the engine keeps none of it afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Which recurrence to iterate.
    pub formula: Formula,
    /// The region of the complex plane on screen.
    pub viewport: Viewport,
    /// Iteration budget per point.  Must be at least 1.
    pub max_iterations: u32,
    /// Ordered, non-empty palette for escaped points.
    pub palette: Vec<Rgb>,
    /// Color for points that never escape.  Theme-dependent and
    /// decided entirely by the caller.
    pub in_set_color: Rgb,
}

/// A claim ticket for one render, captured from the generation
/// counter.  The render it belongs to is superseded once any newer
/// token has been handed out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderToken(u64);

/// How a validated render finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderOutcome {
    /// Every pixel was written.
    Completed,
    /// A newer render superseded this one; it stopped writing at its
    /// next row checkpoint.  Callers should discard the buffer and
    /// wait for the newer result.  This is not a failure.
    Superseded,
}

/// The render engine.  Cheap to construct; hold one per session so
/// that successive renders share the generation counter.
#[derive(Debug, Default)]
pub struct Engine {
    generation: AtomicU64,
}

type RowQueue<'a> = Arc<Mutex<Enumerate<ChunksMut<'a, u8>>>>;

impl Engine {
    /// Constructor.
    pub fn new() -> Engine {
        Engine::default()
    }

    /// Claim a token for a new render, superseding every render still
    /// holding an earlier token.
    pub fn begin(&self) -> RenderToken {
        RenderToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_stale(&self, token: RenderToken) -> bool {
        self.generation.load(Ordering::SeqCst) != token.0
    }

    /// Render one frame on the calling thread.
    ///
    /// Validates the settings, then fills `buffer` with row-major
    /// RGBA (alpha always 255).  An empty viewport succeeds without
    /// touching the buffer.  The live generation is checked once per
    /// row; a stale token stops the render at that checkpoint and
    /// reports `Superseded`.
    pub fn render(
        &self,
        settings: &RenderSettings,
        token: RenderToken,
        buffer: &mut [u8],
    ) -> Result<RenderOutcome, ConfigError> {
        validate(settings)?;
        let viewport = &settings.viewport;
        if viewport.is_empty() {
            return Ok(RenderOutcome::Completed);
        }
        check_buffer(viewport, buffer)?;
        let width = viewport.width as usize;
        for (y, x) in iproduct!(0..viewport.height, 0..viewport.width) {
            if x == 0 && self.is_stale(token) {
                return Ok(RenderOutcome::Superseded);
            }
            let offset = (y as usize * width + x as usize) * BYTES_PER_PIXEL;
            buffer[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&shade_pixel(settings, x, y));
        }
        Ok(RenderOutcome::Completed)
    }

    /// Render one frame across `threads` worker threads.
    ///
    /// Rows are independent, so workers pull them from a shared queue
    /// and write into disjoint row slices of the buffer; no pixel
    /// write needs synchronization.  Workers check the generation
    /// before each row and bail out once the token is stale.  The
    /// output is byte-identical to [`Engine::render`].
    pub fn render_parallel(
        &self,
        settings: &RenderSettings,
        token: RenderToken,
        buffer: &mut [u8],
        threads: usize,
    ) -> Result<RenderOutcome, ConfigError> {
        if threads <= 1 {
            return self.render(settings, token, buffer);
        }
        validate(settings)?;
        let viewport = &settings.viewport;
        if viewport.is_empty() {
            return Ok(RenderOutcome::Completed);
        }
        check_buffer(viewport, buffer)?;

        let row_bytes = viewport.width as usize * BYTES_PER_PIXEL;
        let superseded = AtomicBool::new(false);
        crossbeam::scope(|spawner| {
            let rows: RowQueue<'_> = Arc::new(Mutex::new(buffer.chunks_mut(row_bytes).enumerate()));
            let superseded = &superseded;
            for _ in 0..threads {
                let rows = rows.clone();
                spawner.spawn(move |_| loop {
                    if self.is_stale(token) {
                        superseded.store(true, Ordering::Relaxed);
                        break;
                    }
                    let row = { rows.lock().unwrap().next() };
                    match row {
                        Some((y, slice)) => render_row(settings, y as u32, slice),
                        None => {
                            break;
                        }
                    }
                });
            }
        })
        .unwrap();

        if superseded.load(Ordering::Relaxed) {
            Ok(RenderOutcome::Superseded)
        } else {
            Ok(RenderOutcome::Completed)
        }
    }
}

/// Check the whole configuration before any pixel work.  Order
/// matters only in that everything is checked here, once, and the
/// pixel loops can assume valid inputs.
fn validate(settings: &RenderSettings) -> Result<(), ConfigError> {
    if let Formula::Multibrot { power } = settings.formula {
        if !power.is_finite() || power <= 0.0 {
            return Err(ConfigError::NonPositivePower { power });
        }
    }
    if settings.max_iterations == 0 {
        return Err(ConfigError::ZeroIterations);
    }
    if settings.palette.is_empty() {
        return Err(ConfigError::EmptyPalette);
    }
    let zoom = settings.viewport.zoom;
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(ConfigError::InvalidZoom { zoom });
    }
    Ok(())
}

fn check_buffer(viewport: &Viewport, buffer: &[u8]) -> Result<(), ConfigError> {
    let needed = viewport.len() * BYTES_PER_PIXEL;
    if buffer.len() != needed {
        return Err(ConfigError::BufferSize {
            needed,
            actual: buffer.len(),
        });
    }
    Ok(())
}

fn shade_pixel(settings: &RenderSettings, x: u32, y: u32) -> [u8; BYTES_PER_PIXEL] {
    let point = settings.viewport.pixel_to_point(x, y);
    let result = settings.formula.iterate(point, settings.max_iterations);
    let rgb = color::shade(
        result.count,
        settings.max_iterations,
        &settings.palette,
        settings.in_set_color,
    );
    [rgb[0], rgb[1], rgb[2], 255]
}

fn render_row(settings: &RenderSettings, y: u32, row: &mut [u8]) {
    for x in 0..settings.viewport.width {
        let offset = x as usize * BYTES_PER_PIXEL;
        row[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&shade_pixel(settings, x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn settings(width: u32, height: u32) -> RenderSettings {
        RenderSettings {
            formula: Formula::Mandelbrot,
            viewport: Viewport::new(width, height, -0.5, 0.0, 200.0),
            max_iterations: 50,
            palette: vec![[0, 0, 0], [255, 255, 255]],
            in_set_color: [0, 0, 0],
        }
    }

    fn render_fresh(settings: &RenderSettings) -> (RenderOutcome, Vec<u8>) {
        let engine = Engine::new();
        let token = engine.begin();
        let mut buffer = vec![0; settings.viewport.len() * BYTES_PER_PIXEL];
        let outcome = engine.render(settings, token, &mut buffer).unwrap();
        (outcome, buffer)
    }

    #[test]
    fn tokens_increase_monotonically() {
        let engine = Engine::new();
        let first = engine.begin();
        let second = engine.begin();
        assert_ne!(first, second);
        assert!(engine.is_stale(first));
        assert!(!engine.is_stale(second));
    }

    #[test]
    fn empty_viewport_succeeds_without_writing() {
        let engine = Engine::new();
        for dims in &[(0, 64), (64, 0), (0, 0)] {
            let settings = settings(dims.0, dims.1);
            let token = engine.begin();
            // Deliberately mis-sized sentinel buffer: an empty render
            // must succeed without ever inspecting or touching it.
            let mut buffer = vec![0xAA; 256];
            let outcome = engine.render(&settings, token, &mut buffer).unwrap();
            assert_eq!(outcome, RenderOutcome::Completed);
            assert!(buffer.iter().all(|&b| b == 0xAA));
        }
    }

    #[test]
    fn rejects_nonpositive_multibrot_power() {
        let engine = Engine::new();
        for &power in &[0.0, -1.0, std::f64::NAN] {
            let mut settings = settings(8, 8);
            settings.formula = Formula::Multibrot { power };
            let token = engine.begin();
            let mut buffer = vec![0xAA; settings.viewport.len() * BYTES_PER_PIXEL];
            let err = engine.render(&settings, token, &mut buffer).unwrap_err();
            match err {
                ConfigError::NonPositivePower { .. } => {}
                other => panic!("expected NonPositivePower, got {:?}", other),
            }
            assert!(buffer.iter().all(|&b| b == 0xAA), "pixels touched");
        }
    }

    #[test]
    fn rejects_zero_iteration_budget() {
        let mut settings = settings(8, 8);
        settings.max_iterations = 0;
        let engine = Engine::new();
        let token = engine.begin();
        let mut buffer = vec![0; settings.viewport.len() * BYTES_PER_PIXEL];
        assert_eq!(
            engine.render(&settings, token, &mut buffer).unwrap_err(),
            ConfigError::ZeroIterations
        );
    }

    #[test]
    fn rejects_empty_palette() {
        let mut settings = settings(8, 8);
        settings.palette = vec![];
        let engine = Engine::new();
        let token = engine.begin();
        let mut buffer = vec![0; settings.viewport.len() * BYTES_PER_PIXEL];
        assert_eq!(
            engine.render(&settings, token, &mut buffer).unwrap_err(),
            ConfigError::EmptyPalette
        );
    }

    #[test]
    fn rejects_bad_zoom() {
        let engine = Engine::new();
        for &zoom in &[0.0, -200.0, std::f64::INFINITY, std::f64::NAN] {
            let mut settings = settings(8, 8);
            settings.viewport.zoom = zoom;
            let token = engine.begin();
            let mut buffer = vec![0; settings.viewport.len() * BYTES_PER_PIXEL];
            match engine.render(&settings, token, &mut buffer).unwrap_err() {
                ConfigError::InvalidZoom { .. } => {}
                other => panic!("expected InvalidZoom, got {:?}", other),
            }
        }
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let settings = settings(8, 8);
        let engine = Engine::new();
        let token = engine.begin();
        let mut buffer = vec![0; 7];
        assert_eq!(
            engine.render(&settings, token, &mut buffer).unwrap_err(),
            ConfigError::BufferSize {
                needed: 8 * 8 * BYTES_PER_PIXEL,
                actual: 7
            }
        );
    }

    #[test]
    fn completed_render_is_fully_opaque() {
        let (outcome, buffer) = render_fresh(&settings(32, 24));
        assert_eq!(outcome, RenderOutcome::Completed);
        assert!(buffer.chunks(BYTES_PER_PIXEL).all(|px| px[3] == 255));
    }

    #[test]
    fn deep_interior_view_is_entirely_in_set_colored() {
        // Zoomed far into the cardioid every point exhausts the
        // budget, so every pixel takes the caller's in-set color.
        let mut settings = settings(16, 16);
        settings.viewport = Viewport::new(16, 16, -0.5, 0.0, 1e9);
        settings.in_set_color = [9, 9, 9];
        let (outcome, buffer) = render_fresh(&settings);
        assert_eq!(outcome, RenderOutcome::Completed);
        for px in buffer.chunks(BYTES_PER_PIXEL) {
            assert_eq!(px, [9, 9, 9, 255]);
        }
    }

    #[test]
    fn parallel_output_matches_single_threaded() {
        let mut settings = settings(64, 48);
        settings.max_iterations = 100;
        settings.palette = crate::color::preset("classic").unwrap();
        let (_, expected) = render_fresh(&settings);

        let engine = Engine::new();
        let token = engine.begin();
        let mut buffer = vec![0; settings.viewport.len() * BYTES_PER_PIXEL];
        let outcome = engine
            .render_parallel(&settings, token, &mut buffer, 4)
            .unwrap();
        assert_eq!(outcome, RenderOutcome::Completed);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn parallel_validates_before_spawning() {
        let mut settings = settings(8, 8);
        settings.palette = vec![];
        let engine = Engine::new();
        let token = engine.begin();
        let mut buffer = vec![0; settings.viewport.len() * BYTES_PER_PIXEL];
        assert_eq!(
            engine
                .render_parallel(&settings, token, &mut buffer, 4)
                .unwrap_err(),
            ConfigError::EmptyPalette
        );
    }

    #[test]
    fn stale_token_writes_nothing() {
        let settings = settings(16, 16);
        let engine = Engine::new();
        let stale = engine.begin();
        engine.begin();
        let mut buffer = vec![0xAA; settings.viewport.len() * BYTES_PER_PIXEL];
        let outcome = engine.render(&settings, stale, &mut buffer).unwrap();
        assert_eq!(outcome, RenderOutcome::Superseded);
        assert!(buffer.iter().all(|&b| b == 0xAA), "stale render wrote");
    }

    #[test]
    fn stale_token_writes_nothing_in_parallel() {
        let settings = settings(16, 16);
        let engine = Engine::new();
        let stale = engine.begin();
        engine.begin();
        let mut buffer = vec![0xAA; settings.viewport.len() * BYTES_PER_PIXEL];
        let outcome = engine
            .render_parallel(&settings, stale, &mut buffer, 4)
            .unwrap();
        assert_eq!(outcome, RenderOutcome::Superseded);
        assert!(buffer.iter().all(|&b| b == 0xAA), "stale render wrote");
    }

    #[test]
    fn superseding_mid_flight_aborts_the_stale_render() {
        // A deep-interior view where every pixel exhausts a large
        // budget: one row costs tens of milliseconds, the full frame
        // minutes.  Supersede shortly after the render starts and it
        // must return Superseded at a row checkpoint.
        let settings = RenderSettings {
            formula: Formula::Mandelbrot,
            viewport: Viewport::new(16, 4096, 0.0, 0.0, 1e9),
            max_iterations: 2_000_000,
            palette: vec![[0, 0, 0], [255, 255, 255]],
            in_set_color: [0, 0, 0],
        };
        let engine = Arc::new(Engine::new());
        let token = engine.begin();
        let worker = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut buffer = vec![0; settings.viewport.len() * BYTES_PER_PIXEL];
                engine.render(&settings, token, &mut buffer)
            })
        };
        thread::sleep(Duration::from_millis(50));
        engine.begin();
        assert_eq!(worker.join().unwrap().unwrap(), RenderOutcome::Superseded);
    }
}
