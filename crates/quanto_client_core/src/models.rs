//! Wire types: rates API payload and the JSON snapshots handed to Dart.

use crate::calculator::{HistoryEntry, Operator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// openexchangerates.org `latest.json` body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRatesResponse {
    #[serde(default)]
    pub disclaimer: String,
    #[serde(default)]
    pub license: String,
    /// Seconds since the epoch.
    pub timestamp: i64,
    pub base: String,
    pub rates: HashMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CalculatorSnapshot {
    pub input: String,
    pub current_value: f64,
    pub first_operand: Option<f64>,
    pub operator: Option<Operator>,
    pub history: Vec<HistoryEntry>,
    pub is_calculating: bool,
    pub operators_enabled: bool,
    pub result: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RatesStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub base: Option<String>,
    /// RFC 3339 provider timestamp of the current table.
    pub last_updated: Option<String>,
    pub has_rates: bool,
}

/// Everything the converter screen renders, already formatted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConverterView {
    pub source_currency: String,
    pub target_currency: String,
    /// "5 + 3 = 8" per completed step.
    pub history_lines: Vec<String>,
    /// Muted left part while chaining, e.g. "1,200 ×".
    pub pending_expression: Option<String>,
    /// The number being typed.
    pub amount: String,
    /// Live result while chaining.
    pub result: Option<String>,
    pub target_amount: String,
    pub rate_line: Option<String>,
    pub rates_loading: bool,
    pub rates_error: Option<String>,
    pub operators_enabled: bool,
}
