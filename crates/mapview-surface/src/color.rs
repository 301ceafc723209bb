use palette::{FromColor, LinSrgba, Srgba};

use crate::scene::ColorLinPremul;

// sRGB input, linear premultiplied storage.
impl ColorLinPremul {
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    #[inline]
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_srgba(r, g, b, a as f32 / 255.0)
    }

    #[inline]
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// sRGB u8 RGB with float alpha (CSS-like rgba).
    #[inline]
    pub fn from_srgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        let s = Srgba::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a);
        let lin: LinSrgba = LinSrgba::from_color(s);
        Self {
            r: lin.red * lin.alpha,
            g: lin.green * lin.alpha,
            b: lin.blue * lin.alpha,
            a: lin.alpha,
        }
    }

    /// Same color with its alpha scaled by `factor`.
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: self.r * f,
            g: self.g * f,
            b: self.b * f,
            a: self.a * f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_is_linearized_and_premultiplied() {
        let white = ColorLinPremul::rgb(255, 255, 255);
        assert!((white.r - 1.0).abs() < 1e-6 && (white.a - 1.0).abs() < 1e-6);
        let gray = ColorLinPremul::rgb(128, 128, 128);
        assert!((gray.g - 0.21586).abs() < 1e-4);
        let half = ColorLinPremul::from_srgba(255, 255, 255, 0.5);
        assert!((half.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_scaling_keeps_premultiplied() {
        let c = ColorLinPremul::rgb(255, 0, 0).with_alpha_scaled(0.5);
        assert!((c.a - 0.5).abs() < 1e-6);
        assert!((c.r - 0.5).abs() < 1e-6);
    }
}
