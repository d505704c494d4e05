use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::{error, LevelFilter};

use teller::{BankSampler, Config, Scenario, Simulation};

// CLI -----------------------------------------------------------------------------------------------------------------

/// Simulate a business day at a multi-window bank
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Preset to start from; the flags below override individual fields
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    scenario: Preset,

    /// Number of service windows
    #[arg(long, short = 'n')]
    servers: Option<usize>,

    /// Work units a window processes per hour
    #[arg(long, short = 'r')]
    service_rate: Option<f64>,

    /// Number of customers generated for the day
    #[arg(long, short = 'c')]
    customers: Option<usize>,

    /// Length of the business day in hours
    #[arg(long)]
    hours: Option<f64>,

    /// Random seed; omit for a different day every run
    #[arg(long, short)]
    seed: Option<u64>,

    /// Print every event as it is handled
    #[arg(long, short)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    Default,
    Small,
}

impl From<Preset> for Scenario {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Default => Scenario::Default,
            Preset::Small => Scenario::Small,
        }
    }
}

impl Args {
    fn config(&self) -> Config {
        let base = Scenario::from(self.scenario).config();
        Config {
            num_servers: self.servers.unwrap_or(base.num_servers),
            service_rate: self.service_rate.unwrap_or(base.service_rate),
            num_customers: self.customers.unwrap_or(base.num_customers),
            operating_window_hours: self.hours.unwrap_or(base.operating_window_hours),
        }
    }
}

// MAIN ----------------------------------------------------------------------------------------------------------------

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(if args.debug { LevelFilter::Debug } else { LevelFilter::Info });

    let config = args.config();
    let setup = match args.seed {
        Some(seed) => Simulation::seeded(config, seed),
        None => Simulation::from_source(config, &mut BankSampler::from_entropy(config.operating_window_hours)),
    };

    match setup.and_then(|mut sim| sim.run()) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        },
    }
}

fn init_logger(level: LevelFilter) {
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}
