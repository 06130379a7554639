// Pricing module - historical daily closes from the market-data provider

pub mod classifier;
pub mod normalizer;
pub mod twelvedata;

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use crate::error::ProviderError;

pub use classifier::classify;
pub use normalizer::normalize;
pub use twelvedata::TwelveDataClient;

/// One outbound historical-data request covering every symbol of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Symbols as entered
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl HistoryRequest {
    pub fn new(symbols: Vec<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            symbols,
            start_date,
            end_date,
        }
    }

    /// Comma-joined symbol list as the provider expects it
    pub fn symbol_param(&self) -> String {
        self.symbols.join(",")
    }
}

/// Anything that can answer a [`HistoryRequest`] with the provider's raw JSON.
///
/// The payload is returned unparsed: error classification and normalization
/// happen downstream and must see the body exactly as sent.
pub trait PriceSource {
    fn fetch_history(
        &self,
        request: &HistoryRequest,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;
}

/// A raw payload saved to disk, answered regardless of the request
#[derive(Debug, Clone)]
pub struct PayloadFile {
    path: PathBuf,
}

impl PayloadFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSource for PayloadFile {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<Value, ProviderError> {
        info!(
            "Reading saved payload {} for {}",
            self.path.display(),
            request.symbol_param()
        );
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ProviderError::NetworkFailure(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}
