//! `raingauge`: run the controller, or extract voltage history from its log.
//!
//! ```bash
//! raingauge run --port /dev/ttyUSB0 --log-file rainGauge.log
//! raingauge history rainGauge.log --format json
//! ```

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use raingauge_runner::config::{HistoryArgs, OutputFormat, RunArgs};
use raingauge_runner::control::{ControlLoop, LoopEvent};
use raingauge_runner::error::RunnerResult;
use raingauge_runner::{exporter, history, logging, transport};

#[derive(Parser, Debug)]
#[command(name = "raingauge")]
#[command(about = "XBee rain gauge controller", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count tips and poll supply voltage until the serial read times out
    Run(RunArgs),

    /// Print supply voltage readings found in a controller log
    History(HistoryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => run(&args),
        Commands::History(args) => print_history(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RunArgs) -> RunnerResult<()> {
    let config = args.resolve()?;
    logging::init_logging(&config.logging)?;
    exporter::install_exporter(config.metrics_addr)?;
    let control_config = config.control_config()?;

    let port = transport::open_serial(&config.serial)?;
    info!(destination = %control_config.destination, "Controller started");

    let mut control = ControlLoop::new(port, control_config);
    let reason = control.run_with(|event| match event {
        LoopEvent::Tip { count } => println!("TIPCOUNT: {}", count),
        LoopEvent::Voltage { millivolts, .. } => println!("mV: {:4}", millivolts),
        _ => {}
    })?;

    info!(?reason, tips = control.tip_count(), "Controller stopped");
    Ok(())
}

fn print_history(args: &HistoryArgs) -> RunnerResult<()> {
    let readings = history::read_history_file(&args.log, args.min_raw)?;
    let stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Csv => history::write_csv(stdout, &readings)?,
        OutputFormat::Json => history::write_json(stdout, &readings)?,
    }
    eprintln!("{}", history::summary(&readings));
    Ok(())
}
