#![allow(unexpected_cfgs)] // flutter_rust_bridge macro emits frb_expand cfg
use std::sync::Mutex;

use chrono::Utc;
use flutter_rust_bridge::frb;
use once_cell::sync::Lazy;

mod api;
mod backoff;
pub mod calculator;
pub mod colors;
pub mod conversion;
pub mod currency;
mod log_bridge;
mod models;
mod numeric;
mod rates;
mod selection;
mod state_builder;
mod storage;
mod theme;

use calculator::{Calculator, Key, Operator};
use currency::Direction;
use selection::{CurrencySelection, Side};
use theme::ThemeStore;

/// All UI-facing state, shared by sync calls on the Dart thread and async
/// calls on the bridge worker pool.
struct Session {
    calculator: Calculator,
    selection: CurrencySelection,
    theme: ThemeStore,
    rates: rates::RatesState,
    rates_config: api::RatesConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            calculator: Calculator::new(),
            selection: CurrencySelection::default(),
            theme: ThemeStore::default(),
            rates: rates::RatesState::default(),
            rates_config: api::RatesConfig::from_env(),
        }
    }
}

impl Session {
    /// Session backed by whatever storage currently holds.
    fn restore() -> Result<Self, String> {
        let mut session = Self::default();
        session.theme.rehydrate()?;
        session.selection.rehydrate()?;
        if let Err(e) = session.rates.load_cached() {
            rust_log!("[quanto_rs] rates_cache load failed: {}", e);
        }
        Ok(session)
    }
}

static SESSION: Lazy<Mutex<Session>> = Lazy::new(|| Mutex::new(Session::default()));

/// Runs `f` under the session lock. Never hold it across a network call.
fn with_session<T>(f: impl FnOnce(&mut Session) -> T) -> T {
    let mut session = SESSION.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut *session)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn parse_side(side: &str) -> Result<Side, String> {
    Side::parse(side).ok_or_else(|| format!("Unknown side: {}", side))
}

fn parse_direction(direction: &str) -> Result<Direction, String> {
    match direction {
        "next" => Ok(Direction::Next),
        "prev" => Ok(Direction::Prev),
        other => Err(format!("Unknown direction: {}", other)),
    }
}

#[frb(init)]
pub fn init_app() {
    // Storage is initialized via init_storage(path) from Dart.
}

/// Call once at startup with the app documents directory path (e.g. from path_provider).
/// Restores the accent, the selected currencies and the last cached rate table.
pub fn init_storage(storage_path: String) -> Result<(), String> {
    storage::init(&storage_path)?;
    let session = Session::restore()?;
    with_session(|s| {
        let rates_config = s.rates_config.clone();
        *s = session;
        s.rates_config = rates_config;
    });
    rust_log!("[quanto_rs] session: storage ready at {}", storage_path);
    Ok(())
}

/// Override the rates endpoint and key. An empty `base_url` keeps the default host.
pub fn set_rates_config(base_url: String, app_id: String) {
    with_session(|s| s.rates_config = api::RatesConfig::new(base_url, app_id));
}

// --- Rates ---

/// Fetch the latest table. A no-op while a failure backoff is active.
/// On failure the previous table stays in use and the error is reported
/// through `rates_status` as well as returned.
pub fn refresh_rates() -> Result<(), String> {
    let config = with_session(|s| {
        s.rates
            .begin_refresh()
            .then(|| s.rates_config.clone())
    });
    let Some(config) = config else {
        return Ok(());
    };
    rust_log!("[quanto_rs] refresh_rates start base_url={}", config.base_url);
    let outcome = api::fetch_latest_rates(&config);
    with_session(|s| s.rates.finish_refresh(outcome, Utc::now())).map_err(|e| e.to_string())
}

/// Refresh only when there is no table or it is older than an hour.
pub fn refresh_rates_if_stale() -> Result<(), String> {
    if with_session(|s| s.rates.is_stale(Utc::now())) {
        refresh_rates()
    } else {
        Ok(())
    }
}

/// Install a `latest.json` body fetched by the host.
pub fn apply_rates_response(json: String) -> Result<(), String> {
    let resp = api::parse_rates_body(&json).map_err(|e| e.to_string())?;
    with_session(|s| s.rates.apply_response(resp, Utc::now()));
    Ok(())
}

#[frb(sync)]
pub fn get_rates_status() -> Result<String, String> {
    with_session(|s| to_json(&s.rates.status()))
}

// --- Calculator ---

/// Press a keypad label: "0"-"9", "C", "⌫", "÷", "×", "+", "−" or "=".
/// Any other label is ignored.
#[frb(sync)]
pub fn press_key(label: String) {
    if let Some(key) = Key::parse(&label) {
        with_session(|s| s.calculator.press(key));
    }
}

#[frb(sync)]
pub fn press_digit(digit: String) -> Result<(), String> {
    match Key::parse(&digit) {
        Some(Key::Digit(d)) => {
            with_session(|s| s.calculator.press_digit(d));
            Ok(())
        }
        _ => Err(format!("Not a digit: {}", digit)),
    }
}

#[frb(sync)]
pub fn press_clear() {
    with_session(|s| s.calculator.press_clear());
}

#[frb(sync)]
pub fn press_backspace() {
    with_session(|s| s.calculator.press_backspace());
}

#[frb(sync)]
pub fn press_operator(operator: String) -> Result<(), String> {
    let op = Operator::from_glyph(&operator).ok_or_else(|| format!("Unknown operator: {}", operator))?;
    with_session(|s| s.calculator.press_operator(op));
    Ok(())
}

#[frb(sync)]
pub fn press_equals() {
    with_session(|s| s.calculator.press_equals());
}

#[frb(sync)]
pub fn get_calculator_state() -> Result<String, String> {
    with_session(|s| to_json(&s.calculator.snapshot()))
}

/// Fully formatted converter screen (amounts, history lines, rate line).
#[frb(sync)]
pub fn get_converter_view() -> Result<String, String> {
    with_session(|s| to_json(&state_builder::build_converter_view(&s.calculator, &s.selection, &s.rates)))
}

// --- Currencies ---

#[frb(sync)]
pub fn list_currencies() -> Result<String, String> {
    to_json(&currency::CURRENCIES[..])
}

#[frb(sync)]
pub fn search_currencies(query: String) -> Result<String, String> {
    to_json(&currency::search_currencies(&query))
}

#[frb(sync)]
pub fn get_selection() -> Result<String, String> {
    with_session(|s| to_json(&s.selection.snapshot()))
}

#[frb(sync)]
pub fn set_source_currency(code: String) -> Result<(), String> {
    with_session(|s| s.selection.set_source(&code))
}

#[frb(sync)]
pub fn set_target_currency(code: String) -> Result<(), String> {
    with_session(|s| s.selection.set_target(&code))
}

/// Step the source currency; `direction` is "next" or "prev". Returns the new code.
#[frb(sync)]
pub fn cycle_source_currency(direction: String) -> Result<String, String> {
    let direction = parse_direction(&direction)?;
    Ok(with_session(|s| s.selection.cycle(Side::Source, direction)).to_string())
}

#[frb(sync)]
pub fn cycle_target_currency(direction: String) -> Result<String, String> {
    let direction = parse_direction(&direction)?;
    Ok(with_session(|s| s.selection.cycle(Side::Target, direction)).to_string())
}

fn swipe(side: Side, dx: f64) -> String {
    with_session(|s| match Direction::from_swipe(dx) {
        Some(direction) => s.selection.cycle(side, direction),
        None => s.selection.get(side).code,
    })
    .to_string()
}

/// Horizontal swipe on the source label. Short swipes change nothing.
/// Returns the code now shown.
#[frb(sync)]
pub fn swipe_source_currency(dx: f64) -> String {
    swipe(Side::Source, dx)
}

#[frb(sync)]
pub fn swipe_target_currency(dx: f64) -> String {
    swipe(Side::Target, dx)
}

/// Open the currency selector for "source" or "target".
#[frb(sync)]
pub fn begin_selecting_currency(side: String) -> Result<(), String> {
    let side = parse_side(&side)?;
    with_session(|s| s.selection.begin_selecting(side));
    Ok(())
}

#[frb(sync)]
pub fn select_currency(code: String) -> Result<(), String> {
    with_session(|s| s.selection.select(&code))
}

#[frb(sync)]
pub fn cancel_selecting_currency() {
    with_session(|s| s.selection.cancel_selecting());
}

// --- Theme ---

#[frb(sync)]
pub fn get_primary_color() -> String {
    with_session(|s| s.theme.primary_color().to_string())
}

/// Returns false (and changes nothing) unless `color` is `#rrggbb`.
#[frb(sync)]
pub fn set_primary_color(color: String) -> bool {
    with_session(|s| s.theme.set_primary_color(&color))
}

#[frb(sync)]
pub fn get_palette() -> Result<String, String> {
    with_session(|s| to_json(s.theme.colors()))
}

#[frb(sync)]
pub fn get_preset_colors() -> Result<String, String> {
    to_json(&theme::PRESET_COLORS)
}

/// Forget persisted settings and cached rates, and start a fresh session.
pub fn reset_settings() -> Result<(), String> {
    if storage::is_ready() {
        storage::clear_all()?;
    }
    with_session(|s| {
        let rates_config = s.rates_config.clone();
        *s = Session::default();
        s.rates_config = rates_config;
    });
    rust_log!("[quanto_rs] session: settings reset");
    Ok(())
}

/// Drain buffered Rust log lines so Dart can show them (e.g. via debugPrint).
pub fn drain_rust_logs() -> Vec<String> {
    log_bridge::drain_rust_logs()
}
