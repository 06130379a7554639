//! Per-view valuation state and the submission pipeline.
//!
//! A [`Session`] holds the most recent configuration, price data and report.
//! Every submission takes a new generation number; a request that resolves
//! after a newer submission or a reset is discarded instead of overwriting
//! fresher state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{ProviderError, ValuationError};
use crate::models::{HistoricalDataSet, PortfolioConfig};
use crate::pricing::{classify, normalize, HistoryRequest, PriceSource};
use crate::reports::ValuationReport;
use crate::validation::validate;
use crate::valuation::ValuationEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Last day of the requested range, normally today
    pub end_date: NaiveDate,
    /// Fail on price series with no matching allocation
    pub strict: bool,
}

impl SubmitOptions {
    pub fn ending(end_date: NaiveDate) -> Self {
        Self {
            end_date,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(Box<ValuationReport>),
    /// A newer submission or a reset happened while the request was in flight
    Superseded,
}

/// Proof of which submission a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    config: Option<PortfolioConfig>,
    dataset: Option<HistoricalDataSet>,
    report: Option<ValuationReport>,
}

impl SessionState {
    fn clear(&mut self) {
        self.config = None;
        self.dataset = None;
        self.report = None;
    }
}

#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a submission: supersede whatever is in flight and replace the
    /// configuration. Previous price data and report are dropped.
    pub fn begin(&self, config: PortfolioConfig) -> Ticket {
        let mut state = self.state();
        state.generation += 1;
        state.clear();
        state.config = Some(config);
        debug!("Submission {} started", state.generation);
        Ticket {
            generation: state.generation,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.state().generation == ticket.generation
    }

    /// Store a finished valuation unless the ticket went stale.
    pub fn complete(
        &self,
        ticket: Ticket,
        dataset: HistoricalDataSet,
        report: ValuationReport,
    ) -> bool {
        let mut state = self.state();
        if state.generation != ticket.generation {
            debug!(
                "Discarding result of submission {} (current is {})",
                ticket.generation, state.generation
            );
            return false;
        }
        state.dataset = Some(dataset);
        state.report = Some(report);
        true
    }

    /// Clear configuration, price data and report in one step and invalidate
    /// any request still in flight.
    pub fn reset(&self) {
        let mut state = self.state();
        state.generation += 1;
        state.clear();
        info!("Session reset");
    }

    pub fn config(&self) -> Option<PortfolioConfig> {
        self.state().config.clone()
    }

    pub fn dataset(&self) -> Option<HistoricalDataSet> {
        self.state().dataset.clone()
    }

    pub fn report(&self) -> Option<ValuationReport> {
        self.state().report.clone()
    }

    /// Validate, fetch, classify, normalize and value one configuration.
    ///
    /// Validation failures leave the session untouched. Errors are terminal
    /// for the submission; nothing is retried.
    pub async fn submit<S: PriceSource>(
        &self,
        source: &S,
        config: PortfolioConfig,
        options: SubmitOptions,
    ) -> Result<SubmitOutcome, ValuationError> {
        validate(&config)?;
        let start_date = config
            .start_date
            .ok_or(crate::error::ValidationError::EmptyStartDate)?;

        let request = HistoryRequest::new(config.symbols(), start_date, options.end_date);
        let ticket = self.begin(config.clone());

        let fetched = source.fetch_history(&request).await;
        if !self.is_current(ticket) {
            return Ok(SubmitOutcome::Superseded);
        }
        let payload = fetched?;

        classify(&payload, &request.symbols)?;

        let dataset = normalize(&payload);
        if dataset.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "no price series in response".to_string(),
            )
            .into());
        }

        let valuation = ValuationEngine::new(&config)
            .with_strict(options.strict)
            .evaluate(&dataset)?;
        let report = ValuationReport::new(&config, options.end_date, dataset.clone(), valuation)?;
        info!(
            "Portfolio worth {} (from {})",
            report.current_value(),
            config.initial_balance
        );

        if self.complete(ticket, dataset, report.clone()) {
            Ok(SubmitOutcome::Completed(Box::new(report)))
        } else {
            Ok(SubmitOutcome::Superseded)
        }
    }
}
