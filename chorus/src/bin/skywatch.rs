//! Headless sky watcher: runs a session over a Bright Star Catalog file and
//! logs visibility and transit-tone activity each tick.

use chorus::{ChorusConfig, Session, SilentAudio};
use clap::Parser;
use skymap::load_catalog;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Simulate the sky and its meridian-transit chorus")]
struct Args {
    /// Bright Star Catalog JSON file.
    catalog: std::path::PathBuf,

    /// Observer longitude, degrees east-positive.
    #[arg(long, default_value_t = -71.1)]
    longitude_deg: f64,

    /// Observer latitude, degrees north-positive.
    #[arg(long, default_value_t = 42.4)]
    latitude_deg: f64,

    /// Simulated seconds per real second.
    #[arg(long, default_value_t = 60.0)]
    rate: f64,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 120)]
    ticks: u32,

    /// Real milliseconds per tick.
    #[arg(long, default_value_t = 500)]
    tick_ms: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let reader = BufReader::new(File::open(&args.catalog)?);
    let stars = load_catalog(reader)?;
    log::info!("loaded {} stars from {}", stars.len(), args.catalog.display());

    let mut session = Session::new(
        chrono::Utc::now(),
        args.longitude_deg.to_radians(),
        args.latitude_deg.to_radians(),
        args.rate,
        stars,
        SilentAudio::new(),
        ChorusConfig::default(),
    );

    let step = Duration::from_millis(args.tick_ms);
    for tick in 0..args.ticks {
        session.audio_mut().advance(step.as_secs_f64());
        let mut visible = 0usize;
        session.tick(step, |_| visible += 1);
        log::info!(
            "tick {tick}: {} of {} stars visible, {} started, {} faded",
            visible,
            session.sky().len(),
            session.audio().started.len(),
            session.audio().released.len()
        );
    }

    Ok(())
}
