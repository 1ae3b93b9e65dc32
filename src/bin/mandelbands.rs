extern crate clap;
extern crate env_logger;
extern crate mandelbands;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mandelbands::config::{parse_complex, parse_pair, DEFAULT_OUTPUT};
use mandelbands::measure::{measure, Sweep};
use mandelbands::planes::{ImageSpec, Viewport};
use mandelbands::{run, DataParallelLoop, ForkJoinThreads, RenderConfig, WorkerPool};

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

const MECHANISM: &str = "mechanism";
const SIZE: &str = "size";
const UPPERLEFT: &str = "upper-left";
const LOWERRIGHT: &str = "lower-right";
const THREADS: &str = "threads";
const ROWS: &str = "rows";
const OUTPUT: &str = "output";
const DRAWOFF: &str = "draw-off";
const WORKLOAD: &str = "workload";
const TRIALS: &str = "trials";
const SWEEPMIN: &str = "sweep-min";
const SWEEPMAX: &str = "sweep-max";
const REPORTDIR: &str = "report-dir";

const MECHANISMS: [&str; 5] = ["threads", "threadpool", "dataparallel", "openmp", "all"];

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelbands")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Renders the Mandelbrot set in bands and times the threading strategy")
        .arg(
            Arg::with_name(MECHANISM)
                .required(true)
                .long(MECHANISM)
                .short("m")
                .takes_value(true)
                .possible_values(&MECHANISMS)
                .help("Threading strategy to render with"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1000x1000")
                .validator(|s| {
                    validate_pair::<usize>(&s, 'x', "Could not parse output image size")
                })
                .help("Size of output image, as WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(UPPERLEFT)
                .long(UPPERLEFT)
                .short("u")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.6,1.2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse upper left corner"))
                .help("Upper left corner of the mandelbrot space, as RE,IM"),
        )
        .arg(
            Arg::with_name(LOWERRIGHT)
                .long(LOWERRIGHT)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.6,-1.2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse lower right corner"))
                .help("Lower right corner of the mandelbrot space, as RE,IM"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse thread count",
                        "Thread count must be between 1 and 4096",
                    )
                })
                .help(
                    "Number of threads (and bands, for the threads strategy); \
                     defaults to one per CPU, or rayon's global pool for dataparallel",
                ),
        )
        .arg(
            Arg::with_name(ROWS)
                .long(ROWS)
                .short("r")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse rows per band",
                        "Rows per band must be at least 1",
                    )
                })
                .help("Rows per band for the threadpool and dataparallel strategies"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value(DEFAULT_OUTPUT)
                .help("Output file"),
        )
        .arg(
            Arg::with_name(DRAWOFF)
                .long(DRAWOFF)
                .short("d")
                .help("Do not write the image"),
        )
        .arg(
            Arg::with_name(WORKLOAD)
                .long(WORKLOAD)
                .short("w")
                .help("Sweep the concurrency parameter and write the timings to a report"),
        )
        .arg(
            Arg::with_name(TRIALS)
                .long(TRIALS)
                .takes_value(true)
                .default_value("20")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000,
                        "Could not parse trial count",
                        "Trial count must be between 1 and 10000",
                    )
                })
                .help("Renders per parameter value in a sweep"),
        )
        .arg(
            Arg::with_name(SWEEPMIN)
                .long(SWEEPMIN)
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse sweep start",
                        "Sweep start must be between 1 and 4096",
                    )
                })
                .help("Smallest parameter value in a sweep"),
        )
        .arg(
            Arg::with_name(SWEEPMAX)
                .long(SWEEPMAX)
                .takes_value(true)
                .default_value("60")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse sweep limit",
                        "Sweep limit must be between 1 and 4096",
                    )
                })
                .help("Largest parameter value in a sweep"),
        )
        .arg(
            Arg::with_name(REPORTDIR)
                .long(REPORTDIR)
                .takes_value(true)
                .default_value(".")
                .help("Directory the sweep reports are written to"),
        )
        .get_matches()
}

/// Everything the command line decided, validated.
struct Options {
    config: RenderConfig,
    threads: usize,
    /// The thread count, only when it was given with `-t`.
    explicit_threads: Option<usize>,
    rows_per_band: usize,
    output: Option<PathBuf>,
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| failure::format_err!("Could not parse {}", name))
}

fn options(matches: &ArgMatches) -> Result<Options, Error> {
    let size = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| failure::err_msg("Error parsing image dimensions"))?;
    let upper_left = matches
        .value_of(UPPERLEFT)
        .and_then(parse_complex)
        .ok_or_else(|| failure::err_msg("Error parsing upper left point"))?;
    let lower_right = matches
        .value_of(LOWERRIGHT)
        .and_then(parse_complex)
        .ok_or_else(|| failure::err_msg("Error parsing lower right point"))?;

    let config = RenderConfig::new(
        ImageSpec::new(size.0, size.1)?,
        Viewport::new(upper_left, lower_right)?,
    );
    let output = if matches.is_present(DRAWOFF) {
        None
    } else {
        matches.value_of(OUTPUT).map(PathBuf::from)
    };

    let explicit_threads = match matches.value_of(THREADS) {
        Some(_) => Some(value(matches, THREADS)?),
        None => None,
    };

    Ok(Options {
        config,
        threads: explicit_threads.unwrap_or_else(num_cpus::get),
        explicit_threads,
        rows_per_band: value(matches, ROWS)?,
        output,
    })
}

fn selected(mechanism: &str, strategy: &str) -> bool {
    mechanism == "all"
        || mechanism == strategy
        || (mechanism == "openmp" && strategy == "dataparallel")
}

/// A data-parallel loop on a private pool when `-t` was given, on
/// rayon's global pool otherwise.
fn data_parallel(options: &Options, rows_per_band: usize) -> DataParallelLoop {
    match options.explicit_threads {
        Some(threads) => DataParallelLoop::with_threads(threads, rows_per_band),
        None => DataParallelLoop::new(rows_per_band),
    }
}

fn render_once(mechanism: &str, options: &Options) -> Result<(), Error> {
    let output = options.output.as_ref().map(PathBuf::as_path);
    if selected(mechanism, "threads") {
        let rendering = run(&ForkJoinThreads::new(options.threads), &options.config, output)?;
        println!("threads computation time: {}ms", rendering.elapsed_ms);
    }
    if selected(mechanism, "threadpool") {
        let renderer = WorkerPool::new(options.threads, options.rows_per_band);
        let rendering = run(&renderer, &options.config, output)?;
        println!("threadpool computation time: {}ms", rendering.elapsed_ms);
    }
    if selected(mechanism, "dataparallel") {
        let renderer = data_parallel(options, options.rows_per_band);
        let rendering = run(&renderer, &options.config, output)?;
        println!("dataparallel computation time: {}ms", rendering.elapsed_ms);
    }
    Ok(())
}

fn report(dir: &Path, strategy: &str) -> Result<BufWriter<File>, Error> {
    let path = dir.join(format!("rust_{}_performance.txt", strategy));
    println!("writing {}", path.display());
    Ok(BufWriter::new(File::create(path)?))
}

fn sweep(mechanism: &str, options: &Options, matches: &ArgMatches) -> Result<(), Error> {
    let sweep = Sweep {
        first: value(matches, SWEEPMIN)?,
        last: value(matches, SWEEPMAX)?,
        trials: value(matches, TRIALS)?,
    };
    let dir = PathBuf::from(matches.value_of(REPORTDIR).unwrap_or("."));
    let config = &options.config;

    if selected(mechanism, "threads") {
        let mut out = report(&dir, "threads")?;
        measure(config, sweep, ForkJoinThreads::new, &mut out)?;
    }
    if selected(mechanism, "threadpool") {
        let mut out = report(&dir, "threadpool")?;
        let workers = options.threads;
        measure(config, sweep, |rows| WorkerPool::new(workers, rows), &mut out)?;
    }
    if selected(mechanism, "dataparallel") {
        let mut out = report(&dir, "dataparallel")?;
        measure(config, sweep, |rows| data_parallel(options, rows), &mut out)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = args();
    let mechanism = matches.value_of(MECHANISM).unwrap_or("all").to_string();
    let outcome = options(&matches).and_then(|options| {
        if matches.is_present(WORKLOAD) {
            sweep(&mechanism, &options, &matches)
        } else {
            render_once(&mechanism, &options)
        }
    });

    if let Err(e) = outcome {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
