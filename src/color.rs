//! Conversion between the bridge's hue/sat/bri encoding and hex RGB.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// A color in canonical hex form (`#rrggbb`, lowercase).
///
/// This is the local representation of a light's color; the bridge side
/// uses the integer triple in [`BridgeColor`].
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use hue_lights_rs::HexColor;
///
/// let color = HexColor::from_str("#FF0000").unwrap();
/// assert_eq!(color.as_str(), "#ff0000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    /// Build a color from RGB components.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        HexColor(format!("#{red:02x}{green:02x}{blue:02x}"))
    }

    /// The canonical `#rrggbb` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The RGB components of this color.
    pub fn components(&self) -> (u8, u8, u8) {
        // Canonical form is enforced on construction, so this cannot fail.
        let r = u8::from_str_radix(&self.0[1..3], 16).unwrap_or(0);
        let g = u8::from_str_radix(&self.0[3..5], 16).unwrap_or(0);
        let b = u8::from_str_radix(&self.0[5..7], 16).unwrap_or(0);
        (r, g, b)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = Error;

    /// Parse from a hex string, with or without the leading `#`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColorString(s.to_string()));
        }
        Ok(HexColor(format!("#{}", digits.to_ascii_lowercase())))
    }
}

/// A color in the bridge's integer encoding.
///
/// Hue covers the full color wheel in 16 bits; saturation and brightness
/// are 8-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeColor {
    pub hue: u16,
    pub sat: u8,
    pub bri: u8,
}

impl BridgeColor {
    pub fn new(hue: u16, sat: u8, bri: u8) -> Self {
        BridgeColor { hue, sat, bri }
    }

    /// Convert the bridge encoding to a hex color.
    ///
    /// Hue maps to degrees (`hue / 65535 * 360`), saturation and brightness
    /// to percent (`/ 255 * 100`) before the HSV to RGB conversion. The
    /// mapping is lossy: nearby triples can land on the same hex value.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::BridgeColor;
    ///
    /// let hex = BridgeColor::new(0, 255, 255).to_hex();
    /// assert_eq!(hex.as_str(), "#ff0000");
    /// ```
    pub fn to_hex(&self) -> HexColor {
        let h = f32::from(self.hue) / 65535.0 * 360.0;
        let s = f32::from(self.sat) / 255.0;
        let v = f32::from(self.bri) / 255.0;

        if s == 0.0 {
            let gray = (v * 255.0) as u8;
            return HexColor::rgb(gray, gray, gray);
        }

        let h = h / 60.0;
        let i = h.floor() as i32;
        let f = h - i as f32;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match i % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        HexColor::rgb(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
        )
    }

    /// Convert a hex color to the bridge encoding.
    ///
    /// Each component is truncated with `floor`, so a round trip through
    /// [`BridgeColor::to_hex`] is not exact. Callers should tolerate a
    /// drift of up to 256 hue steps and 3 sat/bri steps.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// use hue_lights_rs::{BridgeColor, HexColor};
    ///
    /// let color = HexColor::from_str("#0000ff").unwrap();
    /// let bridge = BridgeColor::from_hex(&color);
    /// assert_eq!(bridge.sat, 255);
    /// assert_eq!(bridge.bri, 255);
    /// ```
    pub fn from_hex(color: &HexColor) -> Self {
        let (red, green, blue) = color.components();
        let r = f32::from(red) / 255.0;
        let g = f32::from(green) / 255.0;
        let b = f32::from(blue) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let mut h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        if h < 0.0 {
            h += 360.0;
        }

        let s = if max == 0.0 { 0.0 } else { delta / max };
        let v = max;

        BridgeColor {
            hue: (h / 360.0 * 65535.0).floor() as u16,
            sat: (s * 255.0).floor() as u8,
            bri: (v * 255.0).floor() as u8,
        }
    }
}
