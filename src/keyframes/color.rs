use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::foundation::math::lerp;

/// Straight-alpha color with normalized `0..1` channels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ColorDef {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("maroon", [128, 0, 0]),
    ("olive", [128, 128, 0]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("purple", [128, 0, 128]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
];

impl ColorDef {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color literal: named colors, `#rgb[a]`, `#rrggbb[aa]`, `rgb[a](...)`, `hsl[a](...)`.
    pub fn parse_css(s: &str) -> TimewaveResult<Self> {
        let raw = s.trim().to_ascii_lowercase();
        if raw == "transparent" {
            return Ok(Self::rgba(0.0, 0.0, 0.0, 0.0));
        }
        if let Some((_, [r, g, b])) = NAMED.iter().find(|(n, _)| *n == raw) {
            return Ok(Self::rgba(
                f64::from(*r) / 255.0,
                f64::from(*g) / 255.0,
                f64::from(*b) / 255.0,
                1.0,
            ));
        }
        if let Some(hex) = raw.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = function_args(&raw, "rgba").or_else(|| function_args(&raw, "rgb")) {
            return parse_rgb_args(&args, s);
        }
        if let Some(args) = function_args(&raw, "hsla").or_else(|| function_args(&raw, "hsl")) {
            return parse_hsl_args(&args, s);
        }
        Err(TimewaveError::validation(format!(
            "\"{}\" is not a color literal",
            s.trim()
        )))
    }

    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        let [r, g, b, a] = self.to_rgba8_straight();
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }

    pub fn to_rgba8_straight(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Serialize the way computed styles report colors.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8_straight();
        if self.a >= 1.0 {
            format!("rgb({r}, {g}, {b})")
        } else {
            let a = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
            format!("rgba({r}, {g}, {b}, {a})")
        }
    }

    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self::rgba(
            lerp(a.r, b.r, t),
            lerp(a.g, b.g, t),
            lerp(a.b, b.b, t),
            lerp(a.a, b.a, t),
        )
    }

    /// Hue in degrees `[0, 360)`, saturation and lightness in percent.
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let r = self.r.clamp(0.0, 1.0);
        let g = self.g.clamp(0.0, 1.0);
        let b = self.b.clamp(0.0, 1.0);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;
        if d == 0.0 {
            return (0.0, 0.0, l * 100.0);
        }
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h * 60.0, s * 100.0, l * 100.0)
    }

    /// Height-axis proxy for a color: `H + S + L`.
    ///
    /// Deliberately crude: it is not monotonic in any perceptual dimension, it only needs to move
    /// when the color moves.
    pub fn hsl_sum(self) -> f64 {
        let (h, s, l) = self.to_hsl();
        h + s + l
    }
}

fn function_args(raw: &str, name: &str) -> Option<Vec<String>> {
    let inner = raw
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let parts = if inner.contains(',') {
        inner.split(',').map(|p| p.trim().to_owned()).collect()
    } else {
        inner
            .split(|c: char| c.is_whitespace() || c == '/')
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect()
    };
    Some(parts)
}

fn parse_channel(part: &str, scale: f64, original: &str) -> TimewaveResult<f64> {
    let bad = || TimewaveError::validation(format!("\"{}\": bad channel \"{part}\"", original.trim()));
    match part.strip_suffix('%') {
        Some(p) => Ok(p.trim().parse::<f64>().map_err(|_| bad())? / 100.0),
        None => Ok(part.parse::<f64>().map_err(|_| bad())? / scale),
    }
}

fn parse_alpha(parts: &[String], original: &str) -> TimewaveResult<f64> {
    match parts.get(3) {
        Some(a) => parse_channel(a, 1.0, original),
        None => Ok(1.0),
    }
}

fn parse_rgb_args(parts: &[String], original: &str) -> TimewaveResult<ColorDef> {
    if !(3..=4).contains(&parts.len()) {
        return Err(TimewaveError::validation(format!(
            "\"{}\": rgb() takes 3 or 4 channels",
            original.trim()
        )));
    }
    Ok(ColorDef::rgba(
        parse_channel(&parts[0], 255.0, original)?,
        parse_channel(&parts[1], 255.0, original)?,
        parse_channel(&parts[2], 255.0, original)?,
        parse_alpha(parts, original)?,
    ))
}

fn parse_hsl_args(parts: &[String], original: &str) -> TimewaveResult<ColorDef> {
    if !(3..=4).contains(&parts.len()) {
        return Err(TimewaveError::validation(format!(
            "\"{}\": hsl() takes 3 or 4 channels",
            original.trim()
        )));
    }
    let h = parts[0]
        .trim_end_matches("deg")
        .parse::<f64>()
        .map_err(|_| TimewaveError::validation(format!("\"{}\": bad hue", original.trim())))?;
    let s = parse_channel(&parts[1], 100.0, original)?;
    let l = parse_channel(&parts[2], 100.0, original)?;
    Ok(hsla_to_rgba(h, s, l, parse_alpha(parts, original)?))
}

fn parse_hex(s: &str) -> TimewaveResult<ColorDef> {
    fn hex_byte(pair: &str) -> TimewaveResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| TimewaveError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    let expanded: String = match s.len() {
        3 | 4 => s.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => s.to_owned(),
        _ => {
            return Err(TimewaveError::validation(
                "hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA",
            ));
        }
    };
    if !expanded.is_ascii() {
        return Err(TimewaveError::validation("hex color must be ascii"));
    }

    let r = hex_byte(&expanded[0..2])?;
    let g = hex_byte(&expanded[2..4])?;
    let b = hex_byte(&expanded[4..6])?;
    let a = if expanded.len() == 8 {
        hex_byte(&expanded[6..8])?
    } else {
        255
    };

    Ok(ColorDef::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> ColorDef {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return ColorDef::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
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

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    ColorDef::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        a,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/keyframes/color.rs"]
mod tests;
