//! Hindsight - hypothetical stock portfolio backtester
//!
//! This library validates a portfolio definition, fetches historical daily
//! closes from the market-data provider, normalizes its response shapes, and
//! values the portfolio over time from weighted price ratios.

pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod reports;
pub mod session;
pub mod utils;
pub mod validation;
pub mod valuation;
