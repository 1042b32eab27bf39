//! Accent color store. The palette is derived from the accent and recomputed
//! whenever the accent changes; only the accent itself is persisted.

use crate::colors::{generate_palette, AccentColor, ColorPalette};
use crate::rust_log;
use crate::storage;
use serde::Serialize;

pub const PRIMARY_COLOR_KEY: &str = "primary_color";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PresetColor {
    pub name: &'static str,
    pub hex: &'static str,
}

pub static PRESET_COLORS: [PresetColor; 5] = [
    PresetColor { name: "Slate", hex: "#334155" },
    PresetColor { name: "Ocean", hex: "#0369a1" },
    PresetColor { name: "Indigo", hex: "#4338ca" },
    PresetColor { name: "Amber", hex: "#b45309" },
    PresetColor { name: "Rose", hex: "#be123c" },
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThemeStore {
    accent: AccentColor,
    colors: ColorPalette,
}

impl ThemeStore {
    pub fn primary_color(&self) -> &str {
        self.accent.as_str()
    }

    pub fn colors(&self) -> &ColorPalette {
        &self.colors
    }

    /// Apply a new accent. Anything but `#rrggbb` is ignored and leaves the
    /// palette untouched; returns whether the accent changed.
    pub fn set_primary_color(&mut self, color: &str) -> bool {
        let Some(accent) = AccentColor::parse(color) else {
            rust_log!("[quanto_rs] theme: ignored invalid accent {:?}", color);
            return false;
        };
        self.apply(accent);
        if storage::is_ready() {
            if let Err(e) = storage::config_set(PRIMARY_COLOR_KEY, color) {
                rust_log!("[quanto_rs] theme: failed to persist accent: {}", e);
            }
        }
        true
    }

    /// Load the persisted accent and regenerate the palette from it.
    /// A corrupt stored value is dropped and the current accent kept.
    pub fn rehydrate(&mut self) -> Result<(), String> {
        let Some(stored) = storage::config_get(PRIMARY_COLOR_KEY)? else {
            return Ok(());
        };
        match AccentColor::parse(&stored) {
            Some(accent) => {
                rust_log!("[quanto_rs] theme: rehydrated accent {}", accent);
                self.apply(accent);
            }
            None => {
                rust_log!("[quanto_rs] theme: dropping invalid stored accent {:?}", stored);
                storage::config_remove(PRIMARY_COLOR_KEY)?;
            }
        }
        Ok(())
    }

    fn apply(&mut self, accent: AccentColor) {
        self.colors = generate_palette(&accent);
        self.accent = accent;
    }
}
