use std::io::{Write};
use clap::{Parser};
use log::{info};
use tracing_subscriber::{fmt, EnvFilter};
use pixart::io::{cli, load_image, save_image};
use pixart::{pixelate, Progress, Silent, Stage};

/// Prints a percentage on one line of stderr, overwriting it as it goes.
struct Meter;

impl Progress for Meter {
    fn report(&mut self, stage: Stage, fraction: f32) {
        eprint!("\r{}: {:6.2} %", stage, fraction * 100.0);
        if fraction >= 1.0 { eprintln!(); }
        let _ = std::io::stderr().flush();
    }
}

fn main() -> pixart::Result {
    fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    ).with_writer(std::io::stderr).init();

    let args = cli::Args::parse();
    let options = args.options()?;
    let out_path = args.out_path()?;
    let in_pixels = load_image(&args.in_path)?;
    let mut progress: Box<dyn Progress> = if args.verbose { Box::new(Meter) } else { Box::new(Silent) };
    let indexed = pixelate(&in_pixels, &options, args.palettes().as_ref(), progress.as_mut())?;
    info!("Saving to {}", out_path.display());
    save_image(indexed.to_pixels(), &out_path)
}
