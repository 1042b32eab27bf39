//! Which two currencies are active, and which side the selector is open for.

use crate::currency::{self, find_currency, Currency, Direction, CURRENCIES};
use crate::rust_log;
use crate::storage;
use serde::{Deserialize, Serialize};

pub const SOURCE_KEY: &str = "source_currency";
pub const TARGET_KEY: &str = "target_currency";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "source" => Some(Side::Source),
            "target" => Some(Side::Target),
            _ => None,
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            Side::Source => SOURCE_KEY,
            Side::Target => TARGET_KEY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectionSnapshot {
    pub source: &'static str,
    pub target: &'static str,
    pub selecting_for: Option<Side>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencySelection {
    source: &'static Currency,
    target: &'static Currency,
    selecting_for: Option<Side>,
}

impl Default for CurrencySelection {
    fn default() -> Self {
        // USD -> JPY
        Self {
            source: &CURRENCIES[0],
            target: &CURRENCIES[3],
            selecting_for: None,
        }
    }
}

impl CurrencySelection {
    pub fn source(&self) -> &'static Currency {
        self.source
    }

    pub fn target(&self) -> &'static Currency {
        self.target
    }

    pub fn selecting_for(&self) -> Option<Side> {
        self.selecting_for
    }

    pub fn get(&self, side: Side) -> &'static Currency {
        match side {
            Side::Source => self.source,
            Side::Target => self.target,
        }
    }

    pub fn set(&mut self, side: Side, code: &str) -> Result<(), String> {
        let currency = find_currency(code).ok_or_else(|| format!("Unknown currency: {}", code))?;
        self.assign(side, currency);
        Ok(())
    }

    pub fn set_source(&mut self, code: &str) -> Result<(), String> {
        self.set(Side::Source, code)
    }

    pub fn set_target(&mut self, code: &str) -> Result<(), String> {
        self.set(Side::Target, code)
    }

    /// Step one side through the catalog; returns the new code.
    pub fn cycle(&mut self, side: Side, direction: Direction) -> &'static str {
        let next = currency::cycle(self.get(side).code, direction);
        self.assign(side, next);
        next.code
    }

    pub fn begin_selecting(&mut self, side: Side) {
        self.selecting_for = Some(side);
    }

    /// Apply `code` to the side the selector was opened for, then close it.
    /// With no side open only the close happens.
    pub fn select(&mut self, code: &str) -> Result<(), String> {
        let result = match self.selecting_for {
            Some(side) => self.set(side, code),
            None => Ok(()),
        };
        self.selecting_for = None;
        result
    }

    pub fn cancel_selecting(&mut self) {
        self.selecting_for = None;
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            source: self.source().code,
            target: self.target().code,
            selecting_for: self.selecting_for(),
        }
    }

    /// Restore both sides from storage; unknown stored codes are skipped.
    pub fn rehydrate(&mut self) -> Result<(), String> {
        for side in [Side::Source, Side::Target] {
            if let Some(code) = storage::config_get(side.config_key())? {
                match find_currency(&code) {
                    Some(currency) => self.assign_in_memory(side, currency),
                    None => rust_log!("[quanto_rs] session: ignoring stored {} {:?}", side.config_key(), code),
                }
            }
        }
        Ok(())
    }

    fn assign(&mut self, side: Side, currency: &'static Currency) {
        self.assign_in_memory(side, currency);
        if storage::is_ready() {
            if let Err(e) = storage::config_set(side.config_key(), currency.code) {
                rust_log!("[quanto_rs] session: failed to persist {}: {}", side.config_key(), e);
            }
        }
    }

    fn assign_in_memory(&mut self, side: Side, currency: &'static Currency) {
        match side {
            Side::Source => self.source = currency,
            Side::Target => self.target = currency,
        }
    }
}
