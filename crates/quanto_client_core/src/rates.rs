//! Latest rate table snapshot plus its loading/error state.
//!
//! Readers take an `Arc` of the current table; a successful refresh swaps in
//! a new one and a failed refresh keeps the last known table.

use crate::api::RatesError;
use crate::backoff::Backoff;
use crate::conversion::RateTable;
use crate::models::{ExchangeRatesResponse, RatesStatus};
use crate::rust_log;
use crate::storage::{self, CachedRates};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

/// A table older than this is refreshed by `refresh_if_stale`.
pub fn stale_after() -> Duration {
    Duration::hours(1)
}

#[derive(Clone, Debug)]
pub struct RatesSnapshot {
    pub table: Arc<RateTable>,
    pub base: String,
    /// Provider timestamp.
    pub last_updated: Option<DateTime<Utc>>,
    /// When this client received the table.
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct RatesState {
    current: Option<RatesSnapshot>,
    loading: bool,
    error: Option<String>,
    backoff: Backoff,
}

impl Default for RatesState {
    fn default() -> Self {
        Self {
            current: None,
            loading: false,
            error: None,
            backoff: Backoff::for_rates(),
        }
    }
}

impl RatesState {
    pub fn table(&self) -> Option<Arc<RateTable>> {
        self.current.as_ref().map(|s| Arc::clone(&s.table))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match &self.current {
            Some(s) => now - s.fetched_at >= stale_after(),
            None => true,
        }
    }

    /// Mark a fetch as started. `false` while a previous failure's backoff
    /// window is still open (or a fetch is already running).
    pub fn begin_refresh(&mut self) -> bool {
        if self.loading {
            return false;
        }
        if !self.backoff.can_attempt() {
            if let Some(wait) = self.backoff.remaining() {
                rust_log!("[quanto_rs] refresh_rates skipped (backoff active, remaining={}ms)", wait.as_millis());
            }
            return false;
        }
        self.loading = true;
        true
    }

    /// Record the outcome of a fetch started with `begin_refresh`.
    pub fn finish_refresh(
        &mut self,
        outcome: Result<ExchangeRatesResponse, RatesError>,
        now: DateTime<Utc>,
    ) -> Result<(), RatesError> {
        self.loading = false;
        match outcome {
            Ok(resp) => {
                self.apply_response(resp, now);
                Ok(())
            }
            Err(e) => {
                if e.is_transient() {
                    let delay = self.backoff.on_failure();
                    rust_log!(
                        "[quanto_rs] refresh_rates failed (attempt {}, backoff={}ms): {}",
                        self.backoff.failures(),
                        delay.as_millis(),
                        e
                    );
                } else {
                    rust_log!("[quanto_rs] refresh_rates failed: {}", e);
                }
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Install a freshly received table and cache it.
    pub fn apply_response(&mut self, resp: ExchangeRatesResponse, now: DateTime<Utc>) {
        let snapshot = RatesSnapshot {
            table: Arc::new(RateTable::new(resp.rates)),
            base: resp.base,
            last_updated: Utc.timestamp_opt(resp.timestamp, 0).single(),
            fetched_at: now,
        };
        rust_log!(
            "[quanto_rs] refresh_rates success base={} entries={}",
            snapshot.base,
            snapshot.table.len()
        );
        if storage::is_ready() {
            let cached = CachedRates {
                base: snapshot.base.clone(),
                timestamp: resp.timestamp,
                rates: (*snapshot.table).clone(),
                fetched_at: now.to_rfc3339(),
            };
            if let Err(e) = storage::rates_cache_save(&cached) {
                rust_log!("[quanto_rs] rates_cache save failed: {}", e);
            }
        }
        self.current = Some(snapshot);
        self.error = None;
        self.backoff.reset();
    }

    /// Restore the cached table, if any. Does not touch the error state.
    pub fn load_cached(&mut self) -> Result<bool, String> {
        let Some(cached) = storage::rates_cache_load()? else {
            return Ok(false);
        };
        let fetched_at = DateTime::parse_from_rfc3339(&cached.fetched_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        rust_log!(
            "[quanto_rs] rates_cache loaded base={} entries={}",
            cached.base,
            cached.rates.len()
        );
        self.current = Some(RatesSnapshot {
            table: Arc::new(cached.rates),
            base: cached.base,
            last_updated: Utc.timestamp_opt(cached.timestamp, 0).single(),
            fetched_at,
        });
        Ok(true)
    }

    pub fn status(&self) -> RatesStatus {
        RatesStatus {
            loading: self.loading,
            error: self.error.clone(),
            base: self.current.as_ref().map(|s| s.base.clone()),
            last_updated: self
                .current
                .as_ref()
                .and_then(|s| s.last_updated)
                .map(|t| t.to_rfc3339()),
            has_rates: self.current.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn response(eur: f64) -> ExchangeRatesResponse {
        ExchangeRatesResponse {
            disclaimer: String::new(),
            license: String::new(),
            timestamp: 1_760_868_000,
            base: "USD".into(),
            rates: HashMap::from([("USD".to_string(), 1.0), ("EUR".to_string(), eur)]),
        }
    }

    #[test]
    fn empty_state_is_stale_without_table() {
        let state = RatesState::default();
        assert!(state.table().is_none());
        assert!(state.is_stale(Utc::now()));
        assert!(!state.status().has_rates);
    }

    #[test]
    #[serial]
    fn success_installs_table_and_clears_error() {
        storage::close();
        let mut state = RatesState::default();
        assert!(state.begin_refresh());
        assert!(state.is_loading());
        state
            .finish_refresh(Err(RatesError::Api("boom".into())), Utc::now())
            .unwrap_err();
        assert_eq!(state.error(), Some("boom"));

        let mut state = RatesState::default();
        state.begin_refresh();
        let now = Utc::now();
        state.finish_refresh(Ok(response(0.9)), now).unwrap();
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
        assert_eq!(state.table().unwrap().get("EUR"), Some(0.9));
        assert!(!state.is_stale(now + Duration::minutes(59)));
        assert!(state.is_stale(now + Duration::hours(1)));
    }

    #[test]
    #[serial]
    fn failure_keeps_last_table_and_backs_off() {
        storage::close();
        let mut state = RatesState::default();
        state.apply_response(response(0.9), Utc::now());
        let before = state.table().unwrap();

        assert!(state.begin_refresh());
        let err = state
            .finish_refresh(Err(RatesError::Api("API error: 500".into())), Utc::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "API error: 500");
        assert_eq!(state.error(), Some("API error: 500"));
        assert!(Arc::ptr_eq(&before, &state.table().unwrap()));

        assert!(!state.begin_refresh());
    }

    #[test]
    fn missing_key_does_not_back_off() {
        let mut state = RatesState::default();
        state.begin_refresh();
        state.finish_refresh(Err(RatesError::MissingAppId), Utc::now()).unwrap_err();
        assert!(state.begin_refresh());
    }

    #[test]
    #[serial]
    fn refresh_replaces_snapshot_atomically() {
        storage::close();
        let mut state = RatesState::default();
        state.apply_response(response(0.9), Utc::now());
        let old = state.table().unwrap();
        state.apply_response(response(0.95), Utc::now());
        assert_eq!(old.get("EUR"), Some(0.9));
        assert_eq!(state.table().unwrap().get("EUR"), Some(0.95));
    }

    #[test]
    #[serial]
    fn cached_table_survives_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        storage::init(dir.path().to_str().unwrap()).expect("init");
        let fetched = Utc::now();
        RatesState::default().apply_response(response(0.88), fetched);

        let mut restored = RatesState::default();
        assert!(restored.load_cached().unwrap());
        assert_eq!(restored.table().unwrap().get("EUR"), Some(0.88));
        let status = restored.status();
        assert_eq!(status.base.as_deref(), Some("USD"));
        assert_eq!(status.last_updated.as_deref(), Some("2025-10-19T10:00:00+00:00"));
        assert!(!restored.is_stale(fetched + Duration::minutes(5)));
    }
}
