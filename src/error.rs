//! Error handling for Hindsight
//!
//! Defines the typed error taxonomy of the valuation pipeline and a unified
//! Result type using anyhow for context chaining in application code.

use rust_decimal::Decimal;
use thiserror::Error;

/// Rejections raised before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please enter a valid start date")]
    EmptyStartDate,

    #[error("please enter a valid initial balance greater than 0")]
    InvalidBalance,

    #[error("stock symbol '{0}' exceeds the maximum character limit of 5")]
    SymbolTooLong(String),

    #[error("the total allocation percentage should be 100% (got {0}%)")]
    AllocationSumMismatch(Decimal),
}

/// Failures of the outbound request or embedded in the provider's payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("'{0}' is not a valid stock symbol")]
    InvalidSymbol(String),

    #[error("API limit reached, please wait a minute")]
    RateLimited,

    #[error("provider rejected the request (code {code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("no Twelve Data API key configured (set TWELVEDATA_API_KEY or api_key in config.toml)")]
    MissingApiKey,
}

/// Numeric failures of the valuation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputationError {
    #[error("bought price for '{0}' is zero")]
    DivisionByZeroBoughtPrice(String),

    #[error("price series for '{0}' has no matching allocation")]
    UnmatchedSeriesSymbol(String),

    #[error("price series for '{symbol}' is not aligned: {detail}")]
    MisalignedSeries { symbol: String, detail: String },

    #[error("no price data to value")]
    NoPriceData,

    #[error("value of '{0}' is too large to represent")]
    ValueOverflow(String),
}

/// Any error that ends a submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Computation(#[from] ComputationError),
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;
