//! Normalization of the provider's time-series payloads.
//!
//! A one-symbol request returns `{"meta": {"symbol": ..}, "values": [..]}`;
//! a multi-symbol request returns one such object per symbol key. Both come
//! out as a [`HistoricalDataSet`].

use std::str::FromStr;

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{HistoricalDataSet, PriceSeries};

/// Top-level keys that never name a symbol
const RESERVED_KEYS: [&str; 3] = ["status", "meta", "values"];

/// Build the per-symbol data set from a payload that already passed
/// [`classify`](super::classifier::classify).
///
/// Symbols whose series cannot be parsed are left out entirely. Symbol keys
/// keep the provider's casing.
pub fn normalize(payload: &Value) -> HistoricalDataSet {
    let mut dataset = HistoricalDataSet::new();

    let Some(root) = payload.as_object() else {
        warn!("Price payload is not a JSON object; nothing to normalize");
        return dataset;
    };

    let single_symbol = root
        .get("meta")
        .and_then(|m| m.get("symbol"))
        .and_then(Value::as_str);

    if let (Some(symbol), Some(values)) = (single_symbol, root.get("values")) {
        insert_series(&mut dataset, symbol, values);
        return dataset;
    }

    for (key, entry) in root {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        match entry.get("values") {
            Some(values) => insert_series(&mut dataset, key, values),
            None => debug!("Skipping payload key {} without values", key),
        }
    }

    dataset
}

fn insert_series(dataset: &mut HistoricalDataSet, symbol: &str, values: &Value) {
    match parse_series(symbol, values) {
        Ok(series) => {
            debug!("Normalized {} closes for {}", series.len(), symbol);
            dataset.insert(symbol.to_string(), series);
        }
        Err(e) => warn!("Dropping price series for {}: {}", symbol, e),
    }
}

fn parse_series(symbol: &str, values: &Value) -> Result<PriceSeries> {
    let rows = values
        .as_array()
        .ok_or_else(|| anyhow!("values is not an array"))?;

    if rows.is_empty() {
        return Err(anyhow!("no closes in range"));
    }

    let mut closes = Vec::with_capacity(rows.len());
    let mut dates = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let close = row
            .get("close")
            .ok_or_else(|| anyhow!("row {} has no close", i))
            .and_then(parse_close)?;
        let datetime = row
            .get("datetime")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("row {} has no datetime", i))?;

        closes.push(close);
        dates.push(datetime.to_string());
    }

    Ok(PriceSeries {
        symbol: symbol.to_string(),
        closes,
        dates,
    })
}

/// Closes arrive as strings (`"150.25"`) or as bare numbers
fn parse_close(value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(anyhow!("close is not numeric: {}", other)),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| anyhow!("invalid close '{}'", text))
}
