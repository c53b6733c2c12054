use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color, written and parsed as a `#` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// `#rrggbb`, dropping alpha.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}' (expected #rgb, #rgba, #rrggbb or #rrggbbaa)")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let err = || ParseColorError(value.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(err());
        }
        let nibble = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).map(|v| v * 17);
        let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16);
        let parsed = match hex.len() {
            3 | 4 => {
                let a = if hex.len() == 4 { nibble(3) } else { Ok(0xff) };
                (nibble(0), nibble(1), nibble(2), a)
            }
            6 | 8 => {
                let a = if hex.len() == 8 { byte(6) } else { Ok(0xff) };
                (byte(0), byte(2), byte(4), a)
            }
            _ => return Err(err()),
        };
        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self { r, g, b, a }),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "{}", self.to_hex_rgb())
        } else {
            write!(f, "{}{:02x}", self.to_hex_rgb(), self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#000000".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!(
            "#11223380".parse::<Color>().unwrap(),
            Color {
                r: 0x11,
                g: 0x22,
                b: 0x33,
                a: 0x80
            }
        );
        assert_eq!("#f008".parse::<Color>().unwrap().a, 0x88);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!("ffffff".parse::<Color>().is_err());
        assert!("#ggg".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn display_omits_opaque_alpha() {
        assert_eq!(Color::rgb(0xc4, 0, 0).to_string(), "#c40000");
        let translucent = Color {
            a: 0x40,
            ..Color::WHITE
        };
        assert_eq!(translucent.to_string(), "#ffffff40");
    }
}
