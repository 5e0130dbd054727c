//! CSS-style color strings normalized to PDF's 0-1 channel range

/// RGB color with channels in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);
    pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0);
    pub const GRAY: Color = Color::new(0.5, 0.5, 0.5);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f32) -> Self {
        Self::new(level, level, level)
    }

    /// Parse `#rrggbb`, `#rgb`, `rgb(r,g,b)` or `rgba(r,g,b,a)`.
    ///
    /// Anything unrecognized is black. Alpha is dropped; opacity is carried
    /// separately by the renderers.
    pub fn parse(input: &str) -> Color {
        Self::try_parse(input).unwrap_or(Color::BLACK)
    }

    /// Like `parse` but `None` for unrecognized input, so callers can pick their own default
    pub fn try_parse(input: &str) -> Option<Color> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let channels: Vec<&str> = args.split(',').map(str::trim).collect();
        if channels.len() < 3 || channels.len() > 4 {
            return None;
        }
        let channel = |s: &str| -> Option<f32> {
            let v: f32 = s.parse().ok()?;
            if !v.is_finite() {
                return None;
            }
            Some(v.clamp(0.0, 255.0) / 255.0)
        };
        Some(Color::new(
            channel(channels[0])?,
            channel(channels[1])?,
            channel(channels[2])?,
        ))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        6 => Some(Color::new(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
        )),
        3 => {
            let short = |i: usize| byte(&hex[i..i + 1].repeat(2));
            Some(Color::new(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}
