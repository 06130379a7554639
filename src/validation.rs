//! Portfolio input validation
//!
//! Checks a [`PortfolioConfig`] before any network call is made. Checks run
//! in a fixed order and the first failure is returned, so the user sees one
//! message at a time.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::ValidationError;
use crate::models::{PortfolioConfig, MAX_SYMBOL_LEN};

const FULL_ALLOCATION: Decimal = Decimal::ONE_HUNDRED;

/// Validate a portfolio configuration.
///
/// Order: start date, balance, symbol length, allocation sum (exactly 100,
/// no tolerance band).
pub fn validate(config: &PortfolioConfig) -> Result<(), ValidationError> {
    if config.start_date.is_none() {
        return Err(ValidationError::EmptyStartDate);
    }

    if config.initial_balance <= Decimal::ZERO {
        return Err(ValidationError::InvalidBalance);
    }

    // Front ends may truncate at entry time; that is not a guarantee
    if let Some(long) = config
        .allocations
        .iter()
        .find(|a| a.symbol.chars().count() > MAX_SYMBOL_LEN)
    {
        return Err(ValidationError::SymbolTooLong(long.symbol.clone()));
    }

    let Some(total) = config.total_allocation() else {
        let saturated = config
            .allocations
            .iter()
            .fold(Decimal::ZERO, |total, a| total.saturating_add(a.allocation_percent));
        return Err(ValidationError::AllocationSumMismatch(saturated));
    };
    if total != FULL_ALLOCATION {
        return Err(ValidationError::AllocationSumMismatch(total));
    }

    let mut seen = HashSet::new();
    for allocation in &config.allocations {
        if !seen.insert(allocation.symbol.as_str()) {
            warn!(
                "Symbol {} appears more than once; only the first allocation is used for valuation",
                allocation.symbol
            );
        }
    }

    Ok(())
}
