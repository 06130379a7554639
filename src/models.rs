use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Maximum ticker length accepted by the provider
pub const MAX_SYMBOL_LEN: usize = 5;

/// Share of the initial balance nominally invested in one symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockAllocation {
    pub symbol: String,
    pub allocation_percent: Decimal,
}

impl StockAllocation {
    pub fn new(symbol: impl Into<String>, allocation_percent: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            allocation_percent,
        }
    }
}

/// Parses `SYMBOL=PERCENT` (or `SYMBOL:PERCENT`), e.g. `AAPL=60`.
impl FromStr for StockAllocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, percent) = s
            .split_once('=')
            .or_else(|| s.split_once(':'))
            .ok_or_else(|| format!("expected SYMBOL=PERCENT, got '{}'", s))?;

        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(format!("missing symbol in '{}'", s));
        }

        let percent = Decimal::from_str(percent.trim())
            .map_err(|_| format!("invalid allocation percentage in '{}'", s))?;

        Ok(Self::new(symbol, percent))
    }
}

/// A hypothetical portfolio as submitted by the user.
///
/// Treated as an immutable snapshot once a valuation request is issued; a new
/// submission builds a new config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortfolioConfig {
    pub start_date: Option<NaiveDate>,
    pub initial_balance: Decimal,
    pub allocations: Vec<StockAllocation>,
}

impl PortfolioConfig {
    pub fn new(
        start_date: Option<NaiveDate>,
        initial_balance: Decimal,
        allocations: Vec<StockAllocation>,
    ) -> Self {
        Self {
            start_date,
            initial_balance,
            allocations,
        }
    }

    /// Symbols in the order they were entered
    pub fn symbols(&self) -> Vec<String> {
        self.allocations.iter().map(|a| a.symbol.clone()).collect()
    }

    /// Allocation percentage for a symbol; exact, case-sensitive match.
    /// The first entry wins when a symbol was entered twice.
    pub fn allocation_for(&self, symbol: &str) -> Option<Decimal> {
        self.allocations
            .iter()
            .find(|a| a.symbol == symbol)
            .map(|a| a.allocation_percent)
    }

    /// Sum of all allocation percentages, `None` if it overflows.
    pub fn total_allocation(&self) -> Option<Decimal> {
        self.allocations
            .iter()
            .try_fold(Decimal::ZERO, |total, a| total.checked_add(a.allocation_percent))
    }
}

/// Daily closes for one symbol in provider order: index 0 is the most recent
/// trading day, the last index is the oldest one on or after the start date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceSeries {
    pub symbol: String,
    pub closes: Vec<Decimal>,
    pub dates: Vec<String>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Most recent close
    pub fn current_price(&self) -> Option<Decimal> {
        self.closes.first().copied()
    }

    /// Oldest close, the valuation baseline
    pub fn bought_price(&self) -> Option<Decimal> {
        self.closes.last().copied()
    }
}

/// Per-symbol price series keyed by the symbol exactly as the provider sent it
pub type HistoricalDataSet = BTreeMap<String, PriceSeries>;

/// One (date, portfolio value) sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValuationPoint {
    pub date: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValuationResult {
    /// Oldest to newest
    pub series: Vec<ValuationPoint>,
    /// Rounded to 2 decimal places
    pub current_value: Decimal,
}

/// Non-fatal mismatches between the configuration and the price data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "symbol", rename_all = "snake_case")]
pub enum ValuationWarning {
    /// The provider returned a series no allocation asked for
    UnmatchedSeriesSymbol(String),
    /// An allocation has no series in the provider's response
    MissingSeries(String),
}

impl std::fmt::Display for ValuationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValuationWarning::UnmatchedSeriesSymbol(s) => {
                write!(f, "price series '{}' has no matching allocation", s)
            }
            ValuationWarning::MissingSeries(s) => {
                write!(f, "no price series returned for '{}'", s)
            }
        }
    }
}
