use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use xattrtest::cli::{Cli, OutputFormat};
use xattrtest::report::{format_phase_line, JsonReport};
use xattrtest::{BenchError, Benchmark};

/// Initialize tracing subscriber; `RUST_LOG` overrides the verbosity level
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Seed used when none is given on the command line
fn default_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn run(args: &Cli) -> Result<()> {
    let config = args.to_config(default_seed());
    config.validate()?;

    if args.verbose > 0 {
        println!("verbose:     {}", args.verbose);
        config.print();
    }
    tracing::info!(seed = config.seed, random = config.random, "starting run");

    let format = args.format;
    let reports = Benchmark::from_config(&config).run(|report| {
        if format == OutputFormat::Text {
            println!("{}", format_phase_line(report));
        }
    })?;

    if format == OutputFormat::Json {
        println!("{}", JsonReport::new(&config, &reports).to_json()?);
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // BenchError messages already carry their source
            eprintln!("Error: {}", err);
            let code = err
                .downcast_ref::<BenchError>()
                .map(BenchError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1))
        }
    }
}
