use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hindsight::models::{PortfolioConfig, StockAllocation};
use rust_decimal::Decimal;

pub mod formatters;

#[derive(Parser)]
#[command(name = "hindsight")]
#[command(
    version,
    about = "See what a hypothetical stock portfolio would be worth today"
)]
#[command(
    long_about = "Define a start date, an initial balance and ticker allocations, and value the portfolio over time using historical daily closes from Twelve Data."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Value a portfolio from its start date until today
    Value {
        #[command(flatten)]
        portfolio: PortfolioArgs,

        /// Read the provider's raw JSON response from a file instead of the network
        #[arg(long, value_name = "FILE")]
        payload: Option<String>,

        /// Fail when the provider returns a series no allocation asked for
        #[arg(long)]
        strict: bool,

        /// Last day of the range (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// Check a portfolio definition without fetching prices
    Validate {
        #[command(flatten)]
        portfolio: PortfolioArgs,
    },

    /// Provider configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration (API key masked)
    Show,

    /// Print the config file location
    Path,
}

#[derive(Args, Debug, Clone)]
pub struct PortfolioArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: Option<NaiveDate>,

    /// Initial balance in dollars
    #[arg(short, long, allow_hyphen_values = true)]
    pub balance: Decimal,

    /// Ticker and allocation percentage, repeatable (e.g. --stock AAPL=60 --stock MSFT=40)
    #[arg(long = "stock", value_name = "SYMBOL=PERCENT", required = true)]
    pub stocks: Vec<StockAllocation>,
}

impl PortfolioArgs {
    pub fn into_config(self) -> PortfolioConfig {
        PortfolioConfig::new(self.start, self.balance, self.stocks)
    }
}
