//! Light and dark palettes plus typography, handed down to every chart as an
//! immutable value. The application shell owns the active [`Theme`].

use std::fmt;
use std::str::FromStr;

use palette::{LinSrgb, Mix, Srgb};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ChartError;

/// An sRGB color with 8-bit channels and alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    rgb: Srgb<u8>,
    alpha: u8,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            rgb: Srgb::new(r, g, b),
            alpha: 255,
        }
    }

    pub fn components(&self) -> (u8, u8, u8, u8) {
        (self.rgb.red, self.rgb.green, self.rgb.blue, self.alpha)
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.rgb.red, self.rgb.green, self.rgb.blue)
    }

    /// Blends toward `other` in linear light; `t = 0` keeps `self`, `t = 1` yields `other`.
    pub fn mix(self, other: Color, t: f32) -> Color {
        let a: LinSrgb<f32> = self.rgb.into_linear();
        let b: LinSrgb<f32> = other.rgb.into_linear();
        let mixed = a.mix(b, t.clamp(0.0, 1.0));
        Color {
            rgb: Srgb::from_linear(mixed),
            alpha: self.alpha,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl FromStr for Color {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rgb = Srgb::<u8>::from_str(s.trim())
            .map_err(|_| ChartError::InvalidColor(s.to_string()))?;
        Ok(Self { rgb, alpha: 255 })
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(ChartError::InvalidConfig(format!("unknown theme `{other}`"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub border: Color,
    pub text: Color,
    pub text_muted: Color,
    pub grid: Color,
    pub axis: Color,
    pub tooltip_background: Color,
    pub tooltip_text: Color,
    pub series: Vec<Color>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Typography {
    pub font_family: String,
    pub title_size: f32,
    pub label_size: f32,
    pub tick_size: f32,
    pub tooltip_size: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Inter, system-ui, sans-serif".to_string(),
            title_size: 16.0,
            label_size: 12.0,
            tick_size: 11.0,
            tooltip_size: 12.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Theme {
    pub mode: ThemeMode,
    pub colors: Palette,
    pub typography: Typography,
}

fn series(hex: &[&str]) -> Vec<Color> {
    hex.iter().filter_map(|h| h.parse().ok()).collect()
}

impl Theme {
    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            colors: Palette {
                background: Color::rgb(0xff, 0xff, 0xff),
                surface: Color::rgb(0xf4, 0xf6, 0xfa),
                border: Color::rgb(0xdd, 0xe2, 0xea),
                text: Color::rgb(0x0c, 0x16, 0x25),
                text_muted: Color::rgb(0x5b, 0x66, 0x78),
                grid: Color::rgb(0xe6, 0xea, 0xf0),
                axis: Color::rgb(0x9a, 0xa4, 0xb2),
                tooltip_background: Color::rgb(0x1f, 0x29, 0x37),
                tooltip_text: Color::rgb(0xf9, 0xfa, 0xfb),
                series: series(&[
                    "#2563eb", "#f97316", "#10b981", "#e11d48", "#8b5cf6", "#eab308", "#0891b2",
                    "#db2777",
                ]),
            },
            typography: Typography::default(),
        }
    }

    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            colors: Palette {
                background: Color::rgb(0x0b, 0x11, 0x1a),
                surface: Color::rgb(0x11, 0x1a, 0x26),
                border: Color::rgb(0x26, 0x31, 0x40),
                text: Color::rgb(0xe6, 0xed, 0xf7),
                text_muted: Color::rgb(0x7f, 0x8b, 0xa0),
                grid: Color::rgb(0x1c, 0x26, 0x33),
                axis: Color::rgb(0x4b, 0x57, 0x69),
                tooltip_background: Color::rgb(0xe6, 0xed, 0xf7),
                tooltip_text: Color::rgb(0x0c, 0x16, 0x25),
                series: series(&[
                    "#5cb0ff", "#fb923c", "#3fb68b", "#f0635c", "#a78bfa", "#f7c843", "#22d3ee",
                    "#f472b6",
                ]),
            },
            typography: Typography::default(),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    /// Color for series `index`, cycling through `overrides` when given, else the palette.
    pub fn series_color(&self, index: usize, overrides: &[Color]) -> Color {
        let colors = if overrides.is_empty() {
            &self.colors.series
        } else {
            overrides
        };
        colors
            .get(index % colors.len().max(1))
            .copied()
            .unwrap_or(self.colors.text_muted)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_hex() {
        let c: Color = "#2563eb".parse().unwrap();
        assert_eq!(c.components(), (0x25, 0x63, 0xeb, 255));
        assert_eq!(c.hex(), "#2563eb");
        assert!("not-a-color".parse::<Color>().is_err());
    }

    #[test]
    fn color_round_trips_through_json() {
        let c = Color::rgb(1, 2, 3);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn mix_endpoints() {
        let black = Color::rgb(0, 0, 0);
        let white = Color::rgb(255, 255, 255);
        assert_eq!(black.mix(white, 0.0), black);
        assert_eq!(black.mix(white, 1.0), white);
        let mid = black.mix(white, 0.5).components();
        assert!(mid.0 > 100 && mid.0 < 255);
    }

    #[test]
    fn palettes_are_complete() {
        for theme in [Theme::light(), Theme::dark()] {
            assert_eq!(theme.colors.series.len(), 8);
        }
        assert_eq!(Theme::for_mode(ThemeMode::Dark).mode, ThemeMode::Dark);
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!("DARK".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
    }

    #[test]
    fn series_colors_cycle_and_honor_overrides() {
        let theme = Theme::light();
        assert_eq!(theme.series_color(8, &[]), theme.series_color(0, &[]));
        let red = Color::rgb(255, 0, 0);
        assert_eq!(theme.series_color(3, &[red]), red);
    }
}
