extern crate clap;
extern crate fractanim;
extern crate image;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use fractanim::{render_frame_threaded, FractalConfig, FrameBuffer, Grid, InvalidRegion};

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

fn validate_positive_float(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) => {
            if f > 0.0 {
                Ok(())
            } else {
                Err(err.to_string())
            }
        }
        Err(_) => Err(err.to_string()),
    }
}

const FRACTAL: &str = "fractal";
const OUTPUT: &str = "output";
const FRAMES: &str = "frames";
const DENSITY: &str = "density";
const THREADS: &str = "threads";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("fractanim")
        .version("0.1.0")
        .about("Escape-time and Newton fractal animation frames")
        .arg(
            Arg::with_name(FRACTAL)
                .required(true)
                .long(FRACTAL)
                .short("f")
                .takes_value(true)
                .possible_values(&["mandelbrot", "julia", "burningship", "newton"])
                .help("Which fractal preset to evaluate"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Directory to write the frame images into"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .required(false)
                .long(FRAMES)
                .short("n")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 10000",
                    )
                })
                .help("Override the preset's frame count"),
        )
        .arg(
            Arg::with_name(DENSITY)
                .required(false)
                .long(DENSITY)
                .short("d")
                .takes_value(true)
                .validator(|s| {
                    validate_positive_float(&s, "Density must be a positive number")
                })
                .help("Override the preset's samples per unit length"),
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
                .help("Number of threads to use in the evaluator"),
        )
        .get_matches()
}

fn preset(name: &str) -> Result<FractalConfig, InvalidRegion> {
    match name {
        "mandelbrot" => FractalConfig::mandelbrot(),
        "julia" => FractalConfig::julia(),
        "burningship" => FractalConfig::burning_ship(),
        "newton" => FractalConfig::newton(),
        other => unreachable!("clap rejects unknown fractal {}", other),
    }
}

/// Scale the matrix onto 8-bit grayscale, one image row per
/// imaginary-axis sample so the real axis runs left to right.
fn rasterize(buffer: &FrameBuffer, budget: usize) -> Vec<u8> {
    let (real_len, imag_len) = buffer.shape();
    let mut max = 1;
    for cell in buffer.cells() {
        max = max.max(cell.palette_index(budget));
    }
    let mut pixels = vec![0 as u8; real_len * imag_len];
    for j in 0..imag_len {
        for i in 0..real_len {
            let v = buffer.get(i, j).palette_index(budget);
            pixels[j * real_len + i] = ((v * 255) / max) as u8;
        }
    }
    pixels
}

fn write_image(path: &Path, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let output = File::create(path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Graymap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::Gray(8))?;
    Ok(())
}

fn main() {
    let matches = args();
    let name = matches.value_of(FRACTAL).unwrap();
    let threads =
        usize::from_str(matches.value_of(THREADS).unwrap()).expect("Could not parse thread count");

    let mut config = match preset(name) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Bad preset: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(s) = matches.value_of(DENSITY) {
        let density = f64::from_str(s).expect("Could not parse density");
        config.grid = match Grid::build(config.grid.region(), density) {
            Ok(grid) => grid,
            Err(e) => {
                eprintln!("Bad density: {}", e);
                std::process::exit(1);
            }
        };
    }
    if let Some(s) = matches.value_of(FRAMES) {
        config.frame_count = usize::from_str(s).expect("Could not parse frame count");
    }

    let outdir = Path::new(matches.value_of(OUTPUT).unwrap());
    std::fs::create_dir_all(outdir).expect("Could not create the output directory");

    for frame in 0..config.frame_count {
        let path = outdir.join(format!("{}-{:03}.pgm", name, frame));
        if path.exists() {
            println!("{} already exists, skipping", path.display());
            continue;
        }
        let request = config.schedule(frame);
        let buffer = render_frame_threaded(&config, &request, threads);
        let pixels = rasterize(&buffer, request.iteration_budget);
        if let Err(e) = write_image(&path, &pixels, buffer.shape()) {
            eprintln!("Could not write {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
