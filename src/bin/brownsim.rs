use brownsim::config::RunParameters;
use brownsim::io::{savers_for, RunRecord};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brownsim")]
#[command(about = "Event-driven Brownian motion of hard disks in a 2D box", long_about = None)]
struct Cli {
    /// YAML file with run parameters (defaults are used for missing keys)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of light particles
    #[arg(long)]
    particles: Option<usize>,

    /// Simulated time to run for
    #[arg(long)]
    duration: Option<f64>,

    /// Interval between recorded snapshots
    #[arg(long)]
    dt2: Option<f64>,

    /// RNG seed for the initial configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Write Ovito animation frames here
    #[arg(long)]
    ovito: Option<PathBuf>,

    /// Write the Octave time series here
    #[arg(long)]
    time_series: Option<PathBuf>,

    /// Write the Octave collision times here
    #[arg(long)]
    events: Option<PathBuf>,
}

impl Cli {
    fn parameters(&self) -> brownsim::error::Result<RunParameters> {
        let mut params = match &self.config {
            Some(path) => RunParameters::from_yaml_file(path)?,
            None => RunParameters::default(),
        };
        if let Some(n) = self.particles {
            params.system.particle_count = n;
        }
        if let Some(d) = self.duration {
            params.simulation.duration = d;
        }
        if let Some(dt2) = self.dt2 {
            params.simulation.output_interval = dt2;
        }
        if let Some(seed) = self.seed {
            params.system.seed = Some(seed);
        }
        if self.ovito.is_some() {
            params.output.ovito = self.ovito.clone();
        }
        if self.time_series.is_some() {
            params.output.time_series = self.time_series.clone();
        }
        if self.events.is_some() {
            params.output.events = self.events.clone();
        }
        params.validate()?;
        Ok(params)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> brownsim::error::Result<()> {
    let params = cli.parameters()?;
    let duration = params.simulation.duration;

    let mut engine = params.build_engine()?;
    engine.initialize()?;
    let e0 = engine.system().kinetic_energy();
    engine.simulate(duration)?;
    let e1 = engine.system().kinetic_energy();

    info!(
        particles = engine.system().particles().len(),
        shortfall = engine.system().placement_shortfall(),
        events = engine.processed_events().len(),
        stale = engine.stale_events_discarded(),
        frames = engine.frames().len(),
        energy_drift = (e1 - e0) / e0.max(f64::MIN_POSITIVE),
        "run complete"
    );

    let record = RunRecord::from_engine(&engine, duration);
    let out = params.output;
    for saver in savers_for(out.ovito, out.time_series, out.events) {
        saver.save(&record)?;
    }
    Ok(())
}
