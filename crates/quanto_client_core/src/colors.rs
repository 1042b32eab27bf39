//! Hex <-> HSL conversion and palette derivation from one accent color.
//!
//! Every hue-linked slot keeps the accent's hue and saturation and only moves
//! lightness down by a fixed amount.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PRIMARY_COLOR: &str = "#374151";

pub const TEXT_COLOR: &str = "#ffffff";
pub const TEXT_MUTED_COLOR: &str = "#9ca3af";
pub const ERROR_COLOR: &str = "#ef4444";

/// Lightness reductions (percentage points) for the derived slots.
pub const SECONDARY_REDUCTION: u8 = 14;
pub const BACKGROUND_REDUCTION: u8 = 22;
pub const SELECTED_REDUCTION: u8 = 18;
pub const BORDER_REDUCTION: u8 = 8;

static ACCENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("accent pattern"));

/// Hue in [0, 360), saturation and lightness in [0, 100].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hsl {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

impl Hsl {
    /// Same hue and saturation, lightness lowered by `reduction`, floored at 0.
    pub fn darken(self, reduction: u8) -> Self {
        Self {
            l: self.l.saturating_sub(reduction),
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    /// Parse `#rrggbb` or `rrggbb`.
    fn parse(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    fn to_hsl(self) -> Hsl {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        let (mut h, mut s) = (0.0, 0.0);
        if max != min {
            let d = max - min;
            s = if l > 0.5 {
                d / (2.0 - max - min)
            } else {
                d / (max + min)
            };
            h = if max == r {
                ((g - b) / d + if g < b { 6.0 } else { 0.0 }) / 6.0
            } else if max == g {
                ((b - r) / d + 2.0) / 6.0
            } else {
                ((r - g) / d + 4.0) / 6.0
            };
        }

        Hsl {
            h: ((h * 360.0).round() as u16) % 360,
            s: (s * 100.0).round() as u8,
            l: (l * 100.0).round() as u8,
        }
    }

    fn from_hsl(hsl: Hsl) -> Self {
        let h = f64::from(hsl.h) / 360.0;
        let s = f64::from(hsl.s.min(100)) / 100.0;
        let l = f64::from(hsl.l.min(100)) / 100.0;

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_channel(p, q, h + 1.0 / 3.0),
                hue_to_channel(p, q, h),
                hue_to_channel(p, q, h - 1.0 / 3.0),
            )
        };

        let to_u8 = |x: f64| (x * 255.0).round().clamp(0.0, 255.0) as u8;
        Self {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// `None` when `hex` is not six hex digits (with or without a leading `#`).
pub fn hex_to_hsl(hex: &str) -> Option<Hsl> {
    Rgb::parse(hex).map(Rgb::to_hsl)
}

/// Lowercase `#rrggbb`.
pub fn hsl_to_hex(hsl: Hsl) -> String {
    Rgb::from_hsl(hsl).to_string()
}

/// True for exactly `#` followed by six hex digits.
pub fn is_valid_accent(color: &str) -> bool {
    ACCENT_PATTERN.is_match(color)
}

/// An accent color that passed validation. Keeps the caller's spelling,
/// which is also what gets persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccentColor {
    hex: String,
    hsl: Hsl,
}

impl AccentColor {
    pub fn parse(color: &str) -> Option<Self> {
        if !is_valid_accent(color) {
            return None;
        }
        let hsl = hex_to_hsl(color)?;
        Some(Self {
            hex: color.to_string(),
            hsl,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    pub fn hsl(&self) -> Hsl {
        self.hsl
    }
}

impl Default for AccentColor {
    fn default() -> Self {
        // hex_to_hsl("#374151")
        Self {
            hex: DEFAULT_PRIMARY_COLOR.to_string(),
            hsl: Hsl { h: 217, s: 19, l: 27 },
        }
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Darker shade of `primary_hex` with the same hue and saturation.
pub fn generate_secondary_color(primary_hex: &str, lightness_reduction: u8) -> Option<String> {
    hex_to_hsl(primary_hex).map(|hsl| hsl_to_hex(hsl.darken(lightness_reduction)))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub text: String,
    pub text_muted: String,
    pub border: String,
    pub selected: String,
    pub background: String,
    pub error: String,
}

pub fn generate_palette(accent: &AccentColor) -> ColorPalette {
    let base = accent.hsl();
    ColorPalette {
        primary: accent.as_str().to_string(),
        secondary: hsl_to_hex(base.darken(SECONDARY_REDUCTION)),
        text: TEXT_COLOR.to_string(),
        text_muted: TEXT_MUTED_COLOR.to_string(),
        border: hsl_to_hex(base.darken(BORDER_REDUCTION)),
        selected: hsl_to_hex(base.darken(SELECTED_REDUCTION)),
        background: hsl_to_hex(base.darken(BACKGROUND_REDUCTION)),
        error: ERROR_COLOR.to_string(),
    }
}

/// Palette for a raw `#rrggbb` accent; `None` if it fails validation.
pub fn generate_palette_hex(primary_hex: &str) -> Option<ColorPalette> {
    AccentColor::parse(primary_hex).map(|accent| generate_palette(&accent))
}

impl Default for ColorPalette {
    fn default() -> Self {
        generate_palette(&AccentColor::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_to_hsl_primaries() {
        assert_eq!(hex_to_hsl("#ff0000"), Some(Hsl { h: 0, s: 100, l: 50 }));
        assert_eq!(hex_to_hsl("#00ff00"), Some(Hsl { h: 120, s: 100, l: 50 }));
        assert_eq!(hex_to_hsl("0000ff"), Some(Hsl { h: 240, s: 100, l: 50 }));
    }

    #[test]
    fn achromatic_has_zero_hue_and_saturation() {
        assert_eq!(hex_to_hsl("#000000"), Some(Hsl { h: 0, s: 0, l: 0 }));
        assert_eq!(hex_to_hsl("#ffffff"), Some(Hsl { h: 0, s: 0, l: 100 }));
        assert_eq!(hsl_to_hex(Hsl { h: 0, s: 0, l: 50 }), "#808080");
    }

    #[test]
    fn default_accent_matches_parsed_value() {
        assert_eq!(hex_to_hsl(DEFAULT_PRIMARY_COLOR), Some(AccentColor::default().hsl()));
    }

    #[test]
    fn hsl_to_hex_round_trip_is_close() {
        assert_eq!(hsl_to_hex(Hsl { h: 217, s: 19, l: 27 }), "#384252");
        assert_eq!(hsl_to_hex(Hsl { h: 120, s: 100, l: 50 }), "#00ff00");
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert_eq!(hex_to_hsl("#12345"), None);
        assert_eq!(hex_to_hsl("#gg0000"), None);
        assert_eq!(hex_to_hsl(""), None);
    }

    #[test]
    fn accent_validation_is_strict() {
        assert!(is_valid_accent("#374151"));
        assert!(is_valid_accent("#ABCDEF"));
        assert!(!is_valid_accent("374151"));
        assert!(!is_valid_accent("#3741511"));
        assert!(!is_valid_accent("#fff"));
        assert!(!is_valid_accent(" #374151"));
        assert!(AccentColor::parse("#zz0000").is_none());
    }

    #[test]
    fn palette_for_default_accent() {
        let palette = generate_palette(&AccentColor::default());
        assert_eq!(
            palette,
            ColorPalette {
                primary: "#374151".into(),
                secondary: "#1b2027".into(),
                text: "#ffffff".into(),
                text_muted: "#9ca3af".into(),
                border: "#272e3a".into(),
                selected: "#13161b".into(),
                background: "#0a0c0f".into(),
                error: "#ef4444".into(),
            }
        );
    }

    #[test]
    fn palette_slots_keep_hue_and_saturation() {
        let accent = AccentColor::parse("#374151").unwrap();
        let base = accent.hsl();
        for reduction in [SECONDARY_REDUCTION, BACKGROUND_REDUCTION, SELECTED_REDUCTION, BORDER_REDUCTION] {
            let shade = base.darken(reduction);
            assert_eq!((shade.h, shade.s), (base.h, base.s));
            assert_eq!(shade.l, base.l.saturating_sub(reduction));
        }
        let palette = generate_palette(&accent);
        assert_eq!(palette.background, hsl_to_hex(base.darken(22)));
    }

    #[test]
    fn lightness_floors_at_zero() {
        let dark = AccentColor::parse("#0a0a0a").unwrap();
        assert!(dark.hsl().l < BACKGROUND_REDUCTION);
        assert_eq!(dark.hsl().darken(BACKGROUND_REDUCTION).l, 0);
        assert_eq!(generate_palette(&dark).background, "#000000");
    }

    #[test]
    fn palette_for_presets() {
        let ocean = generate_palette(&AccentColor::parse("#0369a1").unwrap());
        assert_eq!(ocean.secondary, "#023b5a");
        assert_eq!(ocean.border, "#024f78");

        let rose = generate_palette(&AccentColor::parse("#be123c").unwrap());
        assert_eq!(rose.selected, "#6b0a22");
        assert_eq!(rose.background, "#59081c");
    }

    #[test]
    fn secondary_color_uses_given_reduction() {
        assert_eq!(generate_secondary_color("#ff0000", 14).as_deref(), Some("#b80000"));
        assert_eq!(generate_secondary_color("nope", 14), None);
    }

    #[test]
    fn palette_from_hex_string() {
        assert_eq!(
            generate_palette_hex("#374151"),
            Some(generate_palette(&AccentColor::default()))
        );
        assert_eq!(generate_palette_hex("#0369a1").map(|p| p.selected), Some("#012e46".to_string()));
        assert_eq!(generate_palette_hex("374151"), None);
        assert_eq!(generate_palette_hex("#37415"), None);
    }

    #[test]
    fn primary_keeps_original_spelling() {
        let palette = generate_palette(&AccentColor::parse("#4338CA").unwrap());
        assert_eq!(palette.primary, "#4338CA");
        assert_eq!(palette.secondary, "#312895");
    }
}
