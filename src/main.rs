use clap::Parser;
use finance_tracker::args::{Args, Command};
use finance_tracker::{commands, Config, ErrorType, Mode, Result};
use std::path::Path;
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
    let home = args.common().finance_home().path();

    // This allows for running the program without the network. When FINANCE_IN_TEST_MODE is set
    // and non-zero in length, then the mode will be Mode::Testing, otherwise Mode::Live.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_url()).await?.print(),

        Command::List(view_args) => {
            let config = load_config(home).await?;
            commands::list(config, mode, view_args.clone())
                .await?
                .print()
        }

        Command::Summary(view_args) => {
            let config = load_config(home).await?;
            commands::summary(config, mode, view_args.clone())
                .await?
                .print()
        }

        Command::Periods => {
            let config = load_config(home).await?;
            commands::periods(config, mode).await?.print()
        }

        Command::Insert(insert_args) => {
            let config = load_config(home).await?;
            commands::insert(config, mode, insert_args.clone())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = load_config(home).await?;
            commands::delete(config, mode, delete_args.clone())
                .await?
                .print()
        }

        Command::Update(update_args) => {
            let config = load_config(home).await?;
            commands::update(config, mode, update_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

async fn load_config(home: &Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| e.context(ErrorType::Config))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the default log level for the library and binary only.
            EnvFilter::new(format!(
                "finance_tracker={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
