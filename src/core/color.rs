//! RGB color type.
//!
//! Every component stores and exchanges colors as `Rgb` with 8-bit
//! channels. There is no float representation anywhere in the pipeline,
//! so serialized documents can never mix `[0,1]` and `[0,255]` values.

use lab::Lab;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Self = Self([255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0]);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0[2]
    }

    /// Squared Euclidean distance in RGB space.
    #[inline]
    pub fn distance_sq(self, other: Self) -> u32 {
        let dr = i32::from(self.r()) - i32::from(other.r());
        let dg = i32::from(self.g()) - i32::from(other.g());
        let db = i32::from(self.b()) - i32::from(other.b());
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Rec.601 luma in `[0, 255]`.
    #[inline]
    pub fn luma(self) -> f32 {
        0.299 * f32::from(self.r()) + 0.587 * f32::from(self.g()) + 0.114 * f32::from(self.b())
    }

    pub fn to_lab(self) -> Lab {
        Lab::from_rgb(&self.0)
    }

    /// Pack into `0x00RRGGBB`.
    #[inline]
    pub const fn packed(self) -> u32 {
        ((self.0[0] as u32) << 16) | ((self.0[1] as u32) << 8) | self.0[2] as u32
    }

    #[inline]
    pub const fn from_packed(v: u32) -> Self {
        Self([(v >> 16) as u8, (v >> 8) as u8, v as u8])
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{}", hex::encode(self.0))
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self([r, g, b]))
            }
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                    let v = ch.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self(out))
            }
            _ => None,
        }
    }

    /// Parse an SVG paint value: hex, `rgb(r, g, b)` or a handful of keywords.
    ///
    /// Returns `None` for `none`, gradients (`url(...)`) and anything unknown.
    pub fn parse_paint(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }
        if let Some(inner) = value
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut channels = inner.split(',').map(|c| {
                let c = c.trim();
                match c.strip_suffix('%') {
                    Some(pct) => pct
                        .parse::<f32>()
                        .ok()
                        .map(|p| (p.clamp(0.0, 100.0) * 2.55).round() as u8),
                    None => c.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8),
                }
            });
            let r = channels.next()??;
            let g = channels.next()??;
            let b = channels.next()??;
            return Some(Self([r, g, b]));
        }
        match value.to_ascii_lowercase().as_str() {
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self([255, 0, 0])),
            "green" => Some(Self([0, 128, 0])),
            "blue" => Some(Self([0, 0, 255])),
            "gray" | "grey" => Some(Self([128, 128, 128])),
            _ => None,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| format!("invalid hex color `{s}`"))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(v: [u8; 3]) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let c = Rgb::new(0x88, 0xc0, 0xd0);
        assert_eq!(c.to_hex(), "#88c0d0");
        assert_eq!(Rgb::from_hex("#88c0d0"), Some(c));
        assert_eq!(Rgb::from_hex("88C0D0"), Some(c));
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("#f00"), Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Rgb::from_hex("#ffff").is_none());
        assert!(Rgb::from_hex("zzzzzz").is_none());
        assert!("nope".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_parse_paint() {
        assert_eq!(Rgb::parse_paint("rgb(10, 20, 30)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse_paint("rgb(100%,0%,0%)"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse_paint("black"), Some(Rgb::BLACK));
        assert_eq!(Rgb::parse_paint("none"), None);
        assert_eq!(Rgb::parse_paint("url(#grad)"), None);
    }

    #[test]
    fn test_packed_roundtrip() {
        let c = Rgb::new(1, 2, 3);
        assert_eq!(c.packed(), 0x010203);
        assert_eq!(Rgb::from_packed(c.packed()), c);
    }

    #[test]
    fn test_distance_and_luma() {
        assert_eq!(Rgb::BLACK.distance_sq(Rgb::WHITE), 3 * 255 * 255);
        assert_eq!(Rgb::WHITE.distance_sq(Rgb::WHITE), 0);
        assert!(Rgb::WHITE.luma() > 254.0);
        assert_eq!(Rgb::BLACK.luma(), 0.0);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(255, 0, 128)).unwrap();
        assert_eq!(json, "\"#ff0080\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(255, 0, 128));
    }
}
