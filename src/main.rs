use clap::Parser;
use sales_agg::args::{Args, Command};
use sales_agg::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().sales_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.transactions())
            .await?
            .print(),

        Command::Kpis(report_args) => {
            let config = Config::load(home).await?;
            commands::kpis(config, report_args.clone()).await?.emit()
        }

        Command::Aggregate(aggregate_args) => {
            let config = Config::load(home).await?;
            commands::aggregate(config, aggregate_args.clone())
                .await?
                .emit()
        }

        Command::Filter(report_args) => {
            let config = Config::load(home).await?;
            commands::filter(config, report_args.clone()).await?.emit()
        }

        Command::Scope(scope_args) => {
            let config = Config::load(home).await?;
            commands::scope(config, scope_args.clone()).await?.emit()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
