//! Portfolio valuation from normalized price series.
//!
//! Each symbol's position is bought at its oldest close in the series with
//! `allocation% * initial_balance` dollars, so its value at index `i` is
//!
//! ```text
//! closes[i] * (allocation / 100) * initial_balance / bought_price
//! ```
//!
//! and the portfolio value is the sum over symbols. Series are in provider
//! order (newest first); index `i` must mean the same trading day for every
//! symbol.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ComputationError;
use crate::models::{
    HistoricalDataSet, PortfolioConfig, PriceSeries, ValuationPoint, ValuationResult,
    ValuationWarning,
};
use crate::utils::round_money;

/// Result plus the non-fatal mismatches found on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valuation {
    pub result: ValuationResult,
    pub warnings: Vec<ValuationWarning>,
}

/// A series with its allocation, ready to be valued
struct Position<'d> {
    series: &'d PriceSeries,
    allocation_percent: Decimal,
    bought_price: Decimal,
}

impl Position<'_> {
    fn value_at(
        &self,
        index: usize,
        initial_balance: Decimal,
    ) -> Result<Decimal, ComputationError> {
        self.series.closes[index]
            .checked_mul(self.allocation_percent)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|v| v.checked_mul(initial_balance))
            .and_then(|v| v.checked_div(self.bought_price))
            .ok_or_else(|| ComputationError::ValueOverflow(self.series.symbol.clone()))
    }
}

/// Portfolio value at one index: the sum over all positions.
fn total_at(
    positions: &[Position<'_>],
    index: usize,
    initial_balance: Decimal,
) -> Result<Decimal, ComputationError> {
    positions.iter().try_fold(Decimal::ZERO, |total, position| {
        let value = position.value_at(index, initial_balance)?;
        total
            .checked_add(value)
            .ok_or_else(|| ComputationError::ValueOverflow(position.series.symbol.clone()))
    })
}

/// Stateless valuation over one configuration.
pub struct ValuationEngine<'a> {
    config: &'a PortfolioConfig,
    strict: bool,
}

impl<'a> ValuationEngine<'a> {
    pub fn new(config: &'a PortfolioConfig) -> Self {
        Self {
            config,
            strict: false,
        }
    }

    /// In strict mode a series without a matching allocation is an error
    /// instead of a zero contribution.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Value at the most recent close, rounded to cents.
    pub fn current_value(&self, dataset: &HistoricalDataSet) -> Result<Decimal, ComputationError> {
        let (positions, _) = self.positions(dataset)?;
        self.current_value_of(&positions)
    }

    /// Value at every trading day, oldest first.
    pub fn series(
        &self,
        dataset: &HistoricalDataSet,
    ) -> Result<Vec<ValuationPoint>, ComputationError> {
        let (positions, _) = self.positions(dataset)?;
        self.series_of(&positions)
    }

    /// Current value, series and warnings in one pass.
    pub fn evaluate(&self, dataset: &HistoricalDataSet) -> Result<Valuation, ComputationError> {
        let (positions, warnings) = self.positions(dataset)?;
        let series = self.series_of(&positions)?;
        let current_value = self.current_value_of(&positions)?;

        Ok(Valuation {
            result: ValuationResult {
                series,
                current_value,
            },
            warnings,
        })
    }

    fn current_value_of(&self, positions: &[Position<'_>]) -> Result<Decimal, ComputationError> {
        total_at(positions, 0, self.config.initial_balance).map(round_money)
    }

    fn series_of(
        &self,
        positions: &[Position<'_>],
    ) -> Result<Vec<ValuationPoint>, ComputationError> {
        let reference = positions.first().ok_or(ComputationError::NoPriceData)?.series;

        for position in &positions[1..] {
            check_aligned(reference, position.series)?;
        }

        let mut points = reference
            .dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                Ok(ValuationPoint {
                    date: date.clone(),
                    value: round_money(total_at(positions, i, self.config.initial_balance)?),
                })
            })
            .collect::<Result<Vec<_>, ComputationError>>()?;

        // Provider order is newest first
        points.reverse();
        Ok(points)
    }

    fn positions<'d>(
        &self,
        dataset: &'d HistoricalDataSet,
    ) -> Result<(Vec<Position<'d>>, Vec<ValuationWarning>), ComputationError> {
        if dataset.is_empty() {
            return Err(ComputationError::NoPriceData);
        }

        let mut positions = Vec::with_capacity(dataset.len());
        let mut warnings = Vec::new();

        for (symbol, series) in dataset {
            if series.is_empty() || series.closes.len() != series.dates.len() {
                return Err(ComputationError::MisalignedSeries {
                    symbol: symbol.clone(),
                    detail: format!(
                        "{} closes for {} dates",
                        series.closes.len(),
                        series.dates.len()
                    ),
                });
            }

            let bought_price = series.bought_price().unwrap_or_default();
            if bought_price.is_zero() {
                return Err(ComputationError::DivisionByZeroBoughtPrice(symbol.clone()));
            }

            let Some(allocation_percent) = self.config.allocation_for(symbol) else {
                if self.strict {
                    return Err(ComputationError::UnmatchedSeriesSymbol(symbol.clone()));
                }
                warn!("Price series {} has no matching allocation; valued at zero", symbol);
                warnings.push(ValuationWarning::UnmatchedSeriesSymbol(symbol.clone()));
                continue;
            };

            debug!(
                "{}: {}% bought at {} over {} closes",
                symbol,
                allocation_percent,
                bought_price,
                series.len()
            );
            positions.push(Position {
                series,
                allocation_percent,
                bought_price,
            });
        }

        let mut reported = HashSet::new();
        for allocation in &self.config.allocations {
            let symbol = allocation.symbol.as_str();
            if !dataset.contains_key(symbol) && reported.insert(symbol) {
                warn!("No price series returned for {}", symbol);
                warnings.push(ValuationWarning::MissingSeries(symbol.to_string()));
            }
        }

        if positions.is_empty() {
            return Err(ComputationError::NoPriceData);
        }

        Ok((positions, warnings))
    }
}

fn check_aligned(reference: &PriceSeries, other: &PriceSeries) -> Result<(), ComputationError> {
    if other.len() != reference.len() {
        return Err(ComputationError::MisalignedSeries {
            symbol: other.symbol.clone(),
            detail: format!(
                "{} closes, expected {} like {}",
                other.len(),
                reference.len(),
                reference.symbol
            ),
        });
    }

    if let Some(i) = (0..reference.len()).find(|&i| reference.dates[i] != other.dates[i]) {
        return Err(ComputationError::MisalignedSeries {
            symbol: other.symbol.clone(),
            detail: format!(
                "date {} at position {}, {} has {}",
                other.dates[i], i, reference.symbol, reference.dates[i]
            ),
        });
    }

    Ok(())
}
