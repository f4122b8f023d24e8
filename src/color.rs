//! Maps escape iteration counts to colors.
//!
//! A palette is an ordered, non-empty list of RGB stops.  Escaped
//! counts are positioned proportionally along the palette and
//! linearly blended between the two nearest stops; points that never
//! escaped get the caller-supplied in-set color unchanged.  The
//! in-set color is an explicit parameter here, never ambient state:
//! whatever theme logic picks it lives entirely outside this crate.

use num::clamp;

/// An RGB triple, one byte per channel.
pub type Rgb = [u8; 3];

/// Names of the palettes [`preset`] knows about.
pub const PRESET_NAMES: [&str; 5] = ["classic", "fire", "ocean", "rainbow", "grayscale"];

/// Map one iteration count to a color.
///
/// `count == max_iterations` means the point never escaped and yields
/// `in_set` unchanged.  Anything smaller is blended between the two
/// palette stops bracketing `count / max_iterations`.  A single-color
/// palette short-circuits to that color, which also sidesteps the
/// degenerate zero-length blend interval.
///
/// Preconditions (`max_iterations > 0`, non-empty palette) are
/// enforced by the engine before any pixel work starts.
pub fn shade(count: u32, max_iterations: u32, palette: &[Rgb], in_set: Rgb) -> Rgb {
    if count >= max_iterations {
        return in_set;
    }
    if palette.len() == 1 {
        return palette[0];
    }
    let ratio = f64::from(count) / f64::from(max_iterations);
    let position = ratio * (palette.len() - 1) as f64;
    let index = position.floor() as usize;
    let next = (index + 1).min(palette.len() - 1);
    let blend = position - index as f64;
    let mut out = [0; 3];
    for channel in 0..3 {
        let from = f64::from(palette[index][channel]);
        let to = f64::from(palette[next][channel]);
        out[channel] = clamp((from * (1.0 - blend) + to * blend).round(), 0.0, 255.0) as u8;
    }
    out
}

/// Look up a built-in palette by name.  Returns None for names not
/// listed in [`PRESET_NAMES`].
pub fn preset(name: &str) -> Option<Vec<Rgb>> {
    match name {
        "classic" => Some(vec![
            [0, 7, 100],
            [32, 107, 203],
            [237, 255, 255],
            [255, 170, 0],
            [0, 2, 0],
        ]),
        "fire" => Some(vec![
            [0, 0, 0],
            [128, 0, 0],
            [255, 0, 0],
            [255, 128, 0],
            [255, 255, 0],
            [255, 255, 255],
        ]),
        "ocean" => Some(vec![
            [0, 0, 64],
            [0, 64, 128],
            [0, 128, 192],
            [64, 192, 255],
            [255, 255, 255],
        ]),
        "rainbow" => Some(vec![
            [255, 0, 0],
            [255, 127, 0],
            [255, 255, 0],
            [0, 255, 0],
            [0, 0, 255],
            [75, 0, 130],
            [148, 0, 211],
        ]),
        "grayscale" => Some(vec![[0, 0, 0], [255, 255, 255]]),
        _ => None,
    }
}
