//! Twelve Data time-series client
//!
//! Fetches daily closes for every symbol of a submission in a single
//! `/time_series` request. The body is handed back as raw JSON because the
//! provider reports bad tickers and rate limits inside a 200 response.
//!
//! Documentation: https://twelvedata.com/docs#time-series

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{HistoryRequest, PriceSource};
use crate::config::Config;
use crate::error::ProviderError;

const INTERVAL: &str = "1day";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct TwelveDataClient {
    client: Client,
    base_url: String,
    api_key: String,
    output_size: u32,
}

impl TwelveDataClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        output_size: u32,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; HindsightBot/1.0)")
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            output_size,
        })
    }

    /// Build a client from resolved configuration
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or(ProviderError::MissingApiKey)?;
        Self::new(
            config.base_url.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
            config.output_size,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/time_series", self.base_url)
    }

    /// Query parameters for a request, API key last
    fn query(&self, request: &HistoryRequest) -> Vec<(&'static str, String)> {
        vec![
            ("symbol", request.symbol_param()),
            ("interval", INTERVAL.to_string()),
            ("start_date", request.start_date.format(DATE_FORMAT).to_string()),
            ("end_date", request.end_date.format(DATE_FORMAT).to_string()),
            ("outputsize", self.output_size.to_string()),
            ("apikey", self.api_key.clone()),
        ]
    }
}

impl PriceSource for TwelveDataClient {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<Value, ProviderError> {
        info!(
            "Fetching daily closes for {} from {} to {} from Twelve Data",
            request.symbol_param(),
            request.start_date,
            request.end_date
        );

        let response = self
            .client
            .get(self.endpoint())
            .query(&self.query(request))
            .send()
            .await
            .map_err(|e| ProviderError::NetworkFailure(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::NetworkFailure(format!(
                "Twelve Data returned error status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkFailure(e.without_url().to_string()))?;
        debug!("Twelve Data response: {} bytes", body.len());

        serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(symbols: &[&str]) -> HistoryRequest {
        HistoryRequest::new(
            symbols.iter().map(|s| s.to_string()).collect(),
            NaiveDate::from_ymd_opt(2023, 5, 22).unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        )
    }

    fn client() -> TwelveDataClient {
        TwelveDataClient::new(
            "https://api.twelvedata.com/",
            "demo",
            Duration::from_secs(5),
            5000,
        )
        .unwrap()
    }

    #[test]
    fn test_query_parameters() {
        let query = client().query(&request(&["AAPL", "MSFT"]));
        assert_eq!(
            query,
            vec![
                ("symbol", "AAPL,MSFT".to_string()),
                ("interval", "1day".to_string()),
                ("start_date", "2023-05-22".to_string()),
                ("end_date", "2023-06-01".to_string()),
                ("outputsize", "5000".to_string()),
                ("apikey", "demo".to_string()),
            ]
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(client().endpoint(), "https://api.twelvedata.com/time_series");
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let result = TwelveDataClient::new(
            "https://api.twelvedata.com",
            "  ",
            Duration::from_secs(5),
            30,
        );
        assert!(matches!(result, Err(ProviderError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_fetch_history_live() {
        // Requires a real key
        let api_key = std::env::var("TWELVEDATA_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            return;
        }

        let client = TwelveDataClient::new(
            "https://api.twelvedata.com",
            api_key,
            Duration::from_secs(30),
            30,
        )
        .unwrap();

        let result = client.fetch_history(&request(&["AAPL"])).await;
        if let Err(e) = &result {
            eprintln!("Skipping Twelve Data live test: {}", e);
            return;
        }
        let payload = result.unwrap();
        assert!(payload.get("values").is_some() || payload.get("code").is_some());
    }
}
