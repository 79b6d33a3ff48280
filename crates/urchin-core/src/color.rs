//! Colors as the renderer reads them: `#RRGGBB` or `#RRGGBBAA`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize::SanitizeError;

/// A validated hex color, always `#`-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub const WHITE: &'static str = "#FFFFFF";
    pub const BLACK: &'static str = "#000000";

    pub fn white() -> Self {
        Color(Self::WHITE.to_string())
    }

    pub fn black() -> Self {
        Color(Self::BLACK.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Channel bytes, alpha included when present.
    pub fn channels(&self) -> Vec<u8> {
        // Validated on construction.
        hex::decode(&self.0[1..]).unwrap_or_default()
    }

    pub fn to_rgba(&self) -> Rgba {
        Rgba::from(self)
    }

    pub(crate) fn from_channels(channels: &[u8]) -> Self {
        Color(format!("#{}", hex::encode_upper(channels)))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = SanitizeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        sanitize_color(ColorInput::Hex(s))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.0
    }
}

// ── Structured form ───────────────────────────────────────────────────────────

/// Float RGBA in [0, 1], the structured alternative to hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl From<&Color> for Rgba {
    fn from(c: &Color) -> Self {
        let ch = c.channels();
        let at = |i: usize| ch.get(i).copied().unwrap_or(255) as f32 / 255.0;
        Rgba {
            r: at(0),
            g: at(1),
            b: at(2),
            a: at(3),
        }
    }
}

impl TryFrom<Rgba> for Color {
    type Error = SanitizeError;

    /// Rounds to the nearest 8-bit value; opaque colors stay six digits.
    fn try_from(c: Rgba) -> Result<Self, Self::Error> {
        let mut channels = Vec::with_capacity(4);
        for v in [c.r, c.g, c.b, c.a] {
            if !(0.0..=1.0).contains(&v) {
                return Err(SanitizeError::ComponentOutOfRange {
                    value: v as f64,
                    range: "[0, 1]",
                });
            }
            channels.push((v * 255.0).round() as u8);
        }
        if channels[3] == 255 {
            channels.truncate(3);
        }
        Ok(Color::from_channels(&channels))
    }
}

// ── Input forms ───────────────────────────────────────────────────────────────

/// Everything a caller may pass where a color is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorInput {
    /// Hex digits, with or without the leading `#`.
    Hex(String),
    /// Float channels, either normalized to [0, 1] or on the byte scale.
    Floats(Vec<f64>),
    /// Integer channels in [0, 255].
    Bytes(Vec<i64>),
}

impl From<&str> for ColorInput {
    fn from(s: &str) -> Self {
        ColorInput::Hex(s.to_string())
    }
}

impl From<String> for ColorInput {
    fn from(s: String) -> Self {
        ColorInput::Hex(s)
    }
}

impl From<Color> for ColorInput {
    fn from(c: Color) -> Self {
        ColorInput::Hex(c.0)
    }
}

impl From<&Color> for ColorInput {
    fn from(c: &Color) -> Self {
        ColorInput::Hex(c.0.clone())
    }
}

impl<const N: usize> From<[f64; N]> for ColorInput {
    fn from(c: [f64; N]) -> Self {
        ColorInput::Floats(c.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for ColorInput {
    fn from(c: [f32; N]) -> Self {
        ColorInput::Floats(c.iter().map(|&v| v as f64).collect())
    }
}

impl<const N: usize> From<[u8; N]> for ColorInput {
    fn from(c: [u8; N]) -> Self {
        ColorInput::Bytes(c.iter().map(|&v| v as i64).collect())
    }
}

impl<const N: usize> From<[i32; N]> for ColorInput {
    fn from(c: [i32; N]) -> Self {
        ColorInput::Bytes(c.iter().map(|&v| v as i64).collect())
    }
}

impl TryFrom<&Value> for ColorInput {
    type Error = SanitizeError;

    /// JSON integers are bytes; any float makes the array float channels.
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v {
            Value::String(s) => Ok(ColorInput::Hex(s.clone())),
            Value::Array(items) => {
                if items.iter().all(|x| x.is_i64() || x.is_u64()) {
                    let bytes = items.iter().filter_map(Value::as_i64).collect::<Vec<_>>();
                    if bytes.len() != items.len() {
                        return Err(SanitizeError::InvalidColor(v.to_string()));
                    }
                    Ok(ColorInput::Bytes(bytes))
                } else {
                    let floats = items
                        .iter()
                        .map(|x| x.as_f64().ok_or_else(|| SanitizeError::InvalidColor(v.to_string())))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(ColorInput::Floats(floats))
                }
            }
            other => Err(SanitizeError::InvalidColor(other.to_string())),
        }
    }
}

/// Normalize any [`ColorInput`] to a hex [`Color`].
///
/// Float channels all in [0, 1] with at least one fractional value are
/// normalized: scaled by 255 and truncated, so `[0.5, 0.2, 0.8]` becomes
/// `#7F33CC`. Other float channels in [0, 255] are rounded to bytes, so
/// `[1.0, 0.0, 0.0]` is `#010000`. Integer channels are used as-is. Hex
/// digits keep their case; only the `#` is added.
pub fn sanitize_color(input: impl Into<ColorInput>) -> Result<Color, SanitizeError> {
    match input.into() {
        ColorInput::Hex(s) => {
            let digits = s.strip_prefix('#').unwrap_or(&s);
            let valid_len = digits.len() == 6 || digits.len() == 8;
            if !valid_len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(SanitizeError::InvalidColor(s));
            }
            Ok(Color(format!("#{digits}")))
        }
        ColorInput::Floats(components) => {
            check_arity(components.len())?;
            if let Some(&v) = components.iter().find(|v| !(0.0..=255.0).contains(*v)) {
                return Err(SanitizeError::ComponentOutOfRange { value: v, range: "[0, 255]" });
            }
            let normalized = components.iter().all(|v| *v <= 1.0)
                && components.iter().any(|v| v.fract() != 0.0);
            let channels: Vec<u8> = if normalized {
                components.iter().map(|v| (255.0 * v) as u8).collect()
            } else {
                components.iter().map(|v| v.round() as u8).collect()
            };
            Ok(Color::from_channels(&channels))
        }
        ColorInput::Bytes(components) => {
            check_arity(components.len())?;
            let mut channels = Vec::with_capacity(components.len());
            for v in components {
                let byte = u8::try_from(v).map_err(|_| SanitizeError::ComponentOutOfRange {
                    value: v as f64,
                    range: "[0, 255]",
                })?;
                channels.push(byte);
            }
            Ok(Color::from_channels(&channels))
        }
    }
}

fn check_arity(n: usize) -> Result<(), SanitizeError> {
    if n == 3 || n == 4 {
        Ok(())
    } else {
        Err(SanitizeError::WrongLength { expected: 3, actual: n })
    }
}
