//! Cross-rate conversion over a base-anchored rate table, and the number and
//! currency formatting used on the converter screen.

use crate::numeric::{group_thousands, grouped_integer, round_half_up};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Currency code -> value of one base unit in that currency.
/// Never mutated after construction; a refresh swaps in a new table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(HashMap<String, f64>);

impl RateTable {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self(rates)
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rate usable as a divisor or multiplier: present, finite and positive.
    fn usable(&self, code: &str) -> Option<f64> {
        self.get(code).filter(|r| r.is_finite() && *r > 0.0)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// `amount * rates[to] / rates[from]`, or `None` when either rate is missing
/// or not positive. Works for any base, including one that is neither side.
pub fn convert(amount: f64, from: &str, to: &str, rates: &RateTable) -> Option<f64> {
    let from_rate = rates.usable(from)?;
    let to_rate = rates.usable(to)?;
    Some(amount * (to_rate / from_rate))
}

/// Converted amount, or the unconverted amount when no conversion is available.
pub fn convert_or_passthrough(amount: f64, from: &str, to: &str, rates: Option<&RateTable>) -> f64 {
    rates
        .and_then(|table| convert(amount, from, to, table))
        .unwrap_or(amount)
}

/// Nearest integer with comma grouping: `1234567.8 -> "1,234,568"`.
pub fn format_integer(n: f64) -> String {
    grouped_integer(round_half_up(n))
}

// en-US currency symbols; codes not listed render as "CODE\u{a0}amount".
const EN_US_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("AUD", "A$"),
    ("CAD", "CA$"),
    ("CNY", "CN¥"),
    ("HKD", "HK$"),
    ("NZD", "NZ$"),
    ("KRW", "₩"),
    ("MXN", "MX$"),
    ("INR", "₹"),
    ("ILS", "₪"),
    ("BRL", "R$"),
    ("TWD", "NT$"),
    ("VND", "₫"),
    ("PHP", "₱"),
    ("XAF", "FCFA"),
    ("XCD", "EC$"),
    ("XOF", "F\u{202f}CFA"),
    ("XPF", "CFPF"),
];

fn is_well_formed_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

/// en-US currency string with no fraction digits, e.g. `"$1,235"`,
/// `"-€3"`, `"CHF\u{a0}1,235"`. A malformed code degrades to
/// `"<code> <grouped-integer>"` instead of failing.
pub fn format_currency(amount: f64, currency_code: &str) -> String {
    if !is_well_formed_code(currency_code) || !amount.is_finite() {
        return format!("{} {}", currency_code, format_integer(amount));
    }

    let rounded = amount.round();
    let digits = group_thousands(&format!("{:.0}", rounded.abs()));
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let code = currency_code.to_ascii_uppercase();

    match EN_US_SYMBOLS.iter().find(|(c, _)| *c == code) {
        Some((_, symbol)) => format!("{}{}{}", sign, symbol, digits),
        None => format!("{}{}\u{a0}{}", sign, code, digits),
    }
}

fn truthy(rate: f64) -> bool {
    rate != 0.0 && !rate.is_nan()
}

/// `"1 FROM = 0.00 TO"`, or `None` when there is no table or no target rate.
/// A missing source rate is treated as the base (rate 1).
pub fn rate_display(rates: Option<&RateTable>, from: &str, to: &str) -> Option<String> {
    let rates = rates?;
    let to_rate = rates.get(to).filter(|r| truthy(*r))?;
    let from_rate = rates.get(from).filter(|r| truthy(*r)).unwrap_or(1.0);
    Some(format!("1 {} = {:.2} {}", from, to_rate / from_rate, to))
}
