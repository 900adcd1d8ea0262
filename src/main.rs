use clap::Parser;
use log::info;
use plotcsv::cli::{self, Args};
use plotcsv::output::Outcome;
use plotcsv::runtime;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            for cause in err.chain() {
                eprintln!("Error: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.into_config()?;
    cli::warn_if_interactive_stdin(&config);

    match runtime::run(&config)? {
        Outcome::Written(path) => info!("chart saved to {}", path.display()),
        Outcome::Displayed(path) => info!("chart shown from {}", path.display()),
    }
    Ok(())
}
