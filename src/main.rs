mod cli;

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands, PortfolioArgs};
use hindsight::config::{config_path, Config};
use hindsight::pricing::{PayloadFile, TwelveDataClient};
use hindsight::session::{Session, SubmitOptions, SubmitOutcome};
use hindsight::validation::validate;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Value {
            portfolio,
            payload,
            strict,
            end,
        } => handle_value(portfolio, payload, strict, end, cli.json).await,

        Commands::Validate { portfolio } => handle_validate(portfolio, cli.json),

        Commands::Config { action } => match action {
            ConfigCommands::Show => {
                let config = Config::load()?;
                let path = config_path()?;
                println!(
                    "{}",
                    cli::formatters::format_config(&config, &path.display().to_string(), cli.json)
                );
                Ok(())
            }
            ConfigCommands::Path => {
                println!("{}", config_path()?.display());
                Ok(())
            }
        },
    }
}

/// Logs go to stderr so JSON on stdout stays parseable
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hindsight={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle value command
async fn handle_value(
    portfolio: PortfolioArgs,
    payload: Option<String>,
    strict: bool,
    end: Option<chrono::NaiveDate>,
    json_output: bool,
) -> Result<()> {
    let config = portfolio.into_config();
    // Reject bad input before touching configuration or the network
    validate(&config)?;

    let options = SubmitOptions {
        end_date: end.unwrap_or_else(|| Local::now().date_naive()),
        strict,
    };
    let session = Session::new();

    let outcome = match payload {
        Some(path) => {
            info!("Valuing portfolio from saved payload {}", path);
            session
                .submit(&PayloadFile::new(path), config, options)
                .await?
        }
        None => {
            let settings = Config::load()?;
            let client = TwelveDataClient::from_config(&settings)?;

            let spinner = (!json_output).then(|| fetch_spinner(&config.symbols().join(", ")));
            let outcome = session.submit(&client, config, options).await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            outcome?
        }
    };

    let report = match outcome {
        SubmitOutcome::Completed(report) => report,
        SubmitOutcome::Superseded => bail!("valuation was superseded before it finished"),
    };

    if json_output {
        println!("{}", cli::formatters::format_report_json(&report));
    } else {
        println!("{}", cli::formatters::format_report_table(&report));
    }

    Ok(())
}

/// Handle validate command
fn handle_validate(portfolio: PortfolioArgs, json_output: bool) -> Result<()> {
    let config = portfolio.into_config();
    validate(&config)?;
    println!(
        "{}",
        cli::formatters::format_valid_portfolio(&config, json_output)
    );
    Ok(())
}

fn fetch_spinner(symbols: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Fetching daily closes for {}...", symbols));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
