use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;

fn fractal() -> Command {
    Command::cargo_bin("fractal").unwrap()
}

#[test]
fn renders_a_png_of_the_requested_size() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("mandelbrot.png");
    fractal()
        .args(&["--output", out.to_str().unwrap()])
        .args(&["--size", "64x48", "--iterations", "40"])
        .assert()
        .success();
    let img = image::open(&out).unwrap();
    assert_eq!(img.dimensions(), (64, 48));
}

#[test]
fn renders_every_formula() {
    let dir = tempfile::tempdir().unwrap();
    for &formula in &[
        "mandelbrot",
        "julia",
        "burning-ship",
        "tricorn",
        "multibrot",
        "feather",
    ] {
        let out = dir.path().join(format!("{}.png", formula));
        fractal()
            .args(&["--output", out.to_str().unwrap()])
            .args(&["--size", "32x24", "--iterations", "30", "--formula", formula])
            .assert()
            .success();
        assert!(out.exists(), "{} produced no file", formula);
    }
}

#[test]
fn multithreaded_run_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("threaded.png");
    fractal()
        .args(&["--output", out.to_str().unwrap()])
        .args(&["--size", "64x48", "--iterations", "40", "--threads", "2"])
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn rejects_malformed_size() {
    fractal()
        .args(&["--output", "out.png", "--size", "800by600"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
}

#[test]
fn rejects_nonpositive_zoom() {
    fractal()
        .args(&["--output", "out.png", "--zoom", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Zoom must be a positive number"));
}

#[test]
fn rejects_out_of_range_iterations() {
    fractal()
        .args(&["--output", "out.png", "--iterations", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Iteration count must be between 1 and 200000",
        ));
}

#[test]
fn rejects_unknown_formula() {
    fractal()
        .args(&["--output", "out.png", "--formula", "buddhabrot"])
        .assert()
        .failure();
}

#[test]
fn rejects_malformed_in_set_color() {
    fractal()
        .args(&["--output", "out.png", "--in-set", "255,255"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse in-set color"));
}

#[test]
fn requires_an_output_path() {
    fractal().assert().failure();
}
