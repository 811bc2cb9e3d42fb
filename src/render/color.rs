/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// HSL(A) to RGBA. `h` in degrees (wraps), `s`/`l`/`a` in [0,1].
    pub fn from_hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        let h = h.rem_euclid(360.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to8 = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(to8(r), to8(g), to8(b), (a.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Linear interpolation between two colors, `t` clamped to [0,1].
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::from_hex("#FFD700"), Some(Color::rgb(255, 215, 0)));
        assert_eq!(Color::from_hex("4169E1"), Some(Color::rgb(65, 105, 225)));
        assert_eq!(
            Color::from_hex("#FF149340"),
            Some(Color::rgba(255, 20, 147, 64))
        );
        assert_eq!(Color::from_hex("#xyz"), None);
        assert_eq!(Color::from_hex(""), None);
    }

    #[test]
    fn hsla_primaries() {
        assert_eq!(Color::from_hsla(0.0, 1.0, 0.5, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hsla(120.0, 1.0, 0.5, 1.0), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hsla(240.0, 1.0, 0.5, 1.0), Color::rgb(0, 0, 255));
        // Hue wraps past 360
        assert_eq!(
            Color::from_hsla(480.0, 1.0, 0.5, 1.0),
            Color::from_hsla(120.0, 1.0, 0.5, 1.0)
        );
    }

    #[test]
    fn lerp_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(255, 255, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5).r, 128);
    }
}
