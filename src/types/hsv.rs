//! Hue/saturation/value color representation.

use super::Color;

/// A color as reported by a bulb in HSV mode.
///
/// - Hue: color angle on the color wheel (0-359 degrees)
/// - Saturation: 0-100 percent
/// - Value: 0-100 percent (the bulb's brightness)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hsv {
    hue: u16,
    saturation: u8,
    value: u8,
}

impl Hsv {
    /// Out-of-range inputs are wrapped (hue) or clamped (saturation, value).
    pub fn new(hue: u16, saturation: u8, value: u8) -> Self {
        Hsv {
            hue: hue % 360,
            saturation: saturation.min(100),
            value: value.min(100),
        }
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    pub fn saturation(&self) -> u8 {
        self.saturation
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Convert to RGB Color.
    ///
    /// # Examples
    ///
    /// ```
    /// use yeelight_bridge::{Color, Hsv};
    ///
    /// assert_eq!(Hsv::new(0, 100, 100).to_color(), Color::rgb(255, 0, 0));
    /// assert_eq!(Hsv::new(120, 100, 50).to_color(), Color::rgb(0, 128, 0));
    /// ```
    pub fn to_color(&self) -> Color {
        let s = f32::from(self.saturation) / 100.0;
        let v = f32::from(self.value) / 100.0;
        let channel = |c: f32| (c * 255.0).round() as u8;

        if s == 0.0 {
            let gray = channel(v);
            return Color::rgb(gray, gray, gray);
        }

        let h = f32::from(self.hue) / 60.0;
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

        Color::rgb(channel(r), channel(g), channel(b))
    }
}
