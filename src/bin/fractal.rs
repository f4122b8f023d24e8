use clap::{App, Arg, ArgMatches};
use image::png::PNGEncoder;
use image::ColorType;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use escapetime::{preset, Engine, Formula, RenderSettings, Rgb, Viewport, PRESET_NAMES};

/// Given a string and a separator, returns the two values
/// separated by the separator.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// Parses an "r,g,b" triple of byte channel values.
fn parse_rgb(s: &str) -> Option<Rgb> {
    let channels: Vec<_> = s.split(',').map(u8::from_str).collect();
    match channels.as_slice() {
        [Ok(r), Ok(g), Ok(b)] => Some([*r, *g, *b]),
        _ => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_positive_float(
    s: &str,
    isnotanumber_err: &str,
    isnotpositive_err: &str,
) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) => {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(isnotpositive_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const FORMULA: &str = "formula";
const JULIA_C: &str = "julia-c";
const POWER: &str = "power";
const PALETTE: &str = "palette";
const IN_SET: &str = "in-set";

const FORMULAS: [&str; 6] = [
    "mandelbrot",
    "julia",
    "burning-ship",
    "tricorn",
    "multibrot",
    "feather",
];

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("fractal")
        .version("0.1.0")
        .about("Escape-time fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output PNG file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .default_value("-0.5,0.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Complex point under the canvas center"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("200")
                .validator(|s| {
                    validate_positive_float(
                        &s,
                        "Could not parse zoom level",
                        "Zoom must be a positive number",
                    )
                })
                .help("Zoom level; 200 shows roughly four units across"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        200_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 200000",
                    )
                })
                .help("Iteration budget per point"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads"),
        )
        .arg(
            Arg::with_name(FORMULA)
                .required(false)
                .long(FORMULA)
                .short("f")
                .takes_value(true)
                .default_value("mandelbrot")
                .possible_values(&FORMULAS)
                .help("Fractal formula to iterate"),
        )
        .arg(
            Arg::with_name(JULIA_C)
                .required(false)
                .long(JULIA_C)
                .takes_value(true)
                .default_value("-0.7,0.27015")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("Fixed constant for the julia formula"),
        )
        .arg(
            Arg::with_name(POWER)
                .required(false)
                .long(POWER)
                .takes_value(true)
                .default_value("3")
                .validator(|s| {
                    validate_positive_float(
                        &s,
                        "Could not parse multibrot power",
                        "Multibrot power must be a positive number",
                    )
                })
                .help("Exponent for the multibrot formula"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .required(false)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .default_value("classic")
                .possible_values(&PRESET_NAMES)
                .help("Palette preset for escaped points"),
        )
        .arg(
            Arg::with_name(IN_SET)
                .required(false)
                .long(IN_SET)
                .takes_value(true)
                .default_value("0,0,0")
                .validator(|s| match parse_rgb(&s) {
                    Some(_) => Ok(()),
                    None => Err("Could not parse in-set color".to_string()),
                })
                .help("Color for points that never escape, as r,g,b"),
        )
        .get_matches()
}

fn formula_from_matches(matches: &ArgMatches) -> Formula {
    match matches.value_of(FORMULA).unwrap() {
        "mandelbrot" => Formula::Mandelbrot,
        "julia" => {
            let (re, im) = parse_pair(matches.value_of(JULIA_C).unwrap(), ',')
                .expect("Error parsing Julia constant");
            Formula::Julia { re, im }
        }
        "burning-ship" => Formula::BurningShip,
        "tricorn" => Formula::Tricorn,
        "multibrot" => {
            let power = f64::from_str(matches.value_of(POWER).unwrap())
                .expect("Error parsing multibrot power");
            Formula::Multibrot { power }
        }
        "feather" => Formula::Feather,
        other => unreachable!("unvalidated formula {}", other),
    }
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (u32, u32)) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let encoder = PNGEncoder::new(output);
    encoder.encode(pixels, bounds.0, bounds.1, ColorType::RGBA(8))?;
    Ok(())
}

fn main() {
    let matches = args();
    let (width, height) = parse_pair(matches.value_of(SIZE).unwrap(), 'x')
        .expect("Error parsing image dimensions");
    let (center_re, center_im) =
        parse_pair(matches.value_of(CENTER).unwrap(), ',').expect("Error parsing center point");
    let zoom = f64::from_str(matches.value_of(ZOOM).unwrap()).expect("Error parsing zoom level");
    let max_iterations = u32::from_str(matches.value_of(ITERATIONS).unwrap())
        .expect("Error parsing iteration count");
    let threads =
        usize::from_str(matches.value_of(THREADS).unwrap()).expect("Error parsing thread count");
    let palette = preset(matches.value_of(PALETTE).unwrap()).expect("Unknown palette preset");
    let in_set_color =
        parse_rgb(matches.value_of(IN_SET).unwrap()).expect("Error parsing in-set color");

    let settings = RenderSettings {
        formula: formula_from_matches(&matches),
        viewport: Viewport::new(width, height, center_re, center_im, zoom),
        max_iterations,
        palette,
        in_set_color,
    };

    let engine = Engine::new();
    let token = engine.begin();
    let mut buffer = vec![0; settings.viewport.len() * escapetime::BYTES_PER_PIXEL];
    match engine.render_parallel(&settings, token, &mut buffer, threads) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(_) => {
            write_image(matches.value_of(OUTPUT).unwrap(), &buffer, (width, height))
                .expect("Error writing output image");
        }
    }
}
