//! Detection of error objects the provider embeds in HTTP 200 responses.
//!
//! Twelve Data answers an invalid ticker with a success status and a body such
//! as `{"code": 400, "message": "**symbol** not found: AAAAA. ...",
//! "status": "error"}`. For multi-symbol requests the same object appears
//! under the offending symbol's key.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ProviderError;

const CODE_BAD_REQUEST: i64 = 400;
const CODE_TOO_MANY_REQUESTS: i64 = 429;

static SYMBOL_NOT_FOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\*symbol\*\* not found(?::\s*([^\s.,]+))?")
        .expect("symbol-not-found pattern is valid")
});

/// Classify a raw payload.
///
/// Scans in the payload's own key order and stops at the first offending
/// symbol; invalid tickers are reported one at a time.
pub fn classify(payload: &Value, requested_symbols: &[String]) -> Result<(), ProviderError> {
    let Some(root) = payload.as_object() else {
        return Err(ProviderError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    // Single-symbol shape: the error object is the payload itself
    if let Some(err) = embedded_error(root) {
        return Err(match err {
            Embedded::SymbolNotFound { symbol, message } => match requested_symbols {
                [only] => ProviderError::InvalidSymbol(only.clone()),
                [] => Embedded::SymbolNotFound { symbol, message }.into_provider_error(),
                many => {
                    let symbol = symbol.unwrap_or_else(|| many.join(","));
                    ProviderError::InvalidSymbol(symbol)
                }
            },
            other => other.into_provider_error(),
        });
    }

    // Multi-symbol shape: look for an error object under each symbol key
    for (key, value) in root {
        let Some(entry) = value.as_object() else {
            continue;
        };
        if let Some(err) = embedded_error(entry) {
            debug!("Provider flagged {} in a multi-symbol response", key);
            return Err(match err {
                Embedded::SymbolNotFound { .. } => ProviderError::InvalidSymbol(key.clone()),
                other => other.into_provider_error(),
            });
        }
    }

    Ok(())
}

enum Embedded {
    SymbolNotFound {
        symbol: Option<String>,
        message: String,
    },
    RateLimited,
    Other { code: i64, message: String },
}

impl Embedded {
    fn into_provider_error(self) -> ProviderError {
        match self {
            Embedded::SymbolNotFound {
                symbol: Some(symbol),
                ..
            } => ProviderError::InvalidSymbol(symbol),
            // Nothing names the bad ticker; pass the provider's text through
            Embedded::SymbolNotFound {
                symbol: None,
                message,
            } => ProviderError::Rejected {
                code: CODE_BAD_REQUEST,
                message,
            },
            Embedded::RateLimited => ProviderError::RateLimited,
            Embedded::Other { code, message } => ProviderError::Rejected { code, message },
        }
    }
}

fn embedded_error(object: &Map<String, Value>) -> Option<Embedded> {
    let code = object.get("code").and_then(Value::as_i64);
    let message = object
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match code {
        Some(CODE_BAD_REQUEST) => {
            if let Some(caps) = SYMBOL_NOT_FOUND.captures(message) {
                return Some(Embedded::SymbolNotFound {
                    symbol: caps.get(1).map(|m| m.as_str().to_string()),
                    message: message.to_string(),
                });
            }
        }
        Some(CODE_TOO_MANY_REQUESTS) => return Some(Embedded::RateLimited),
        _ => {}
    }

    let is_error_status = object.get("status").and_then(Value::as_str) == Some("error");
    if is_error_status {
        return Some(Embedded::Other {
            code: code.unwrap_or_default(),
            message: message.to_string(),
        });
    }

    None
}
