//! What the presentation layer receives for one finished valuation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ComputationError;
use crate::models::{
    HistoricalDataSet, PortfolioConfig, StockAllocation, ValuationResult, ValuationWarning,
};
use crate::utils::round_money;
use crate::valuation::Valuation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuationReport {
    pub start_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
    pub initial_balance: Decimal,
    pub allocations: Vec<StockAllocation>,
    pub result: ValuationResult,
    /// Raw per-symbol closes, for charting
    pub price_series: HistoricalDataSet,
    /// Current value minus initial balance
    pub gain: Decimal,
    /// Gain relative to the initial balance, in percent (2 decimals)
    pub gain_percent: Decimal,
    pub warnings: Vec<ValuationWarning>,
}

impl ValuationReport {
    pub fn new(
        config: &PortfolioConfig,
        end_date: NaiveDate,
        dataset: HistoricalDataSet,
        valuation: Valuation,
    ) -> Result<Self, ComputationError> {
        let overflow = || ComputationError::ValueOverflow("gain".to_string());

        let gain = valuation
            .result
            .current_value
            .checked_sub(config.initial_balance)
            .ok_or_else(overflow)?;
        let gain_percent = if config.initial_balance.is_zero() {
            Decimal::ZERO
        } else {
            gain.checked_div(config.initial_balance)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(round_money)
                .ok_or_else(overflow)?
        };

        Ok(Self {
            start_date: config.start_date,
            end_date,
            initial_balance: config.initial_balance,
            allocations: config.allocations.clone(),
            result: valuation.result,
            price_series: dataset,
            gain: round_money(gain),
            gain_percent,
            warnings: valuation.warnings,
        })
    }

    pub fn current_value(&self) -> Decimal {
        self.result.current_value
    }

    pub fn is_gain(&self) -> bool {
        self.gain >= Decimal::ZERO
    }
}
