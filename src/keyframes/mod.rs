//! Declared keyframes and parsing of their literal property values.

pub mod color;

use std::fmt;

use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::keyframes::color::ColorDef;

/// Keys of a keyframe record that are not animated properties.
const RESERVED_KEYS: [&str; 3] = ["offset", "computedOffset", "easing"];

/// One declared keyframe: a normalized offset and literal values per property.
///
/// Property order is the declaration order and is preserved through (de)serialization.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Normalized offset in `[0, 1]`. `None` until [`resolve_offsets`] spaces it.
    pub offset: Option<f64>,
    pub values: Vec<(String, String)>,
}

impl Keyframe {
    pub fn new(offset: f64) -> Self {
        Self {
            offset: Some(offset),
            values: Vec::new(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((property.into(), value.into()));
        self
    }

    pub fn value(&self, property: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, v)| v.as_str())
    }

    /// Resolved offset; `0.0` for unresolved keyframes.
    pub fn computed_offset(&self) -> f64 {
        self.offset.unwrap_or(0.0)
    }
}

impl serde::Serialize for Keyframe {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(None)?;
        if let Some(o) = self.offset {
            map.serialize_entry("offset", &o)?;
        }
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for Keyframe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct KeyframeVisitor;

        impl<'de> serde::de::Visitor<'de> for KeyframeVisitor {
            type Value = Keyframe;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a keyframe object of property -> value")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Keyframe, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut kf = Keyframe {
                    offset: None,
                    values: Vec::new(),
                };
                while let Some(key) = map.next_key::<String>()? {
                    let value: serde_json::Value = map.next_value()?;
                    if key == "offset" {
                        kf.offset = value.as_f64();
                        continue;
                    }
                    if RESERVED_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    let literal = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Number(n) => n.to_string(),
                        other => {
                            return Err(serde::de::Error::custom(format!(
                                "keyframe value for \"{key}\" must be a string or number, got {other}"
                            )));
                        }
                    };
                    kf.values.push((key, literal));
                }
                Ok(kf)
            }
        }

        deserializer.deserialize_map(KeyframeVisitor)
    }
}

/// Fill in missing offsets: first defaults to 0, last to 1, gaps are spaced evenly.
pub fn resolve_offsets(keyframes: &mut [Keyframe]) -> TimewaveResult<()> {
    let n = keyframes.len();
    if n == 0 {
        return Ok(());
    }
    if n == 1 && keyframes[0].offset.is_none() {
        keyframes[0].offset = Some(1.0);
        return Ok(());
    }
    if keyframes[0].offset.is_none() {
        keyframes[0].offset = Some(0.0);
    }
    if keyframes[n - 1].offset.is_none() {
        keyframes[n - 1].offset = Some(1.0);
    }

    let mut prev_idx = 0usize;
    for i in 1..n {
        let Some(o) = keyframes[i].offset else {
            continue;
        };
        let start = keyframes[prev_idx].computed_offset();
        let gap = i - prev_idx;
        for (k, kf) in keyframes[prev_idx + 1..i].iter_mut().enumerate() {
            kf.offset = Some(start + (o - start) * (k + 1) as f64 / gap as f64);
        }
        prev_idx = i;
    }

    let mut last = f64::NEG_INFINITY;
    for kf in keyframes.iter() {
        let o = kf.computed_offset();
        if !(0.0..=1.0).contains(&o) {
            return Err(TimewaveError::validation(format!(
                "keyframe offset {o} is outside [0, 1]"
            )));
        }
        if o < last {
            return Err(TimewaveError::validation(
                "keyframe offsets must be non-decreasing",
            ));
        }
        last = o;
    }
    Ok(())
}

/// How a property is placed on the height axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    Numeric,
    Opacity,
    Color,
}

/// A literal value reduced to something drawable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParsedValue {
    Number(f64),
    Color(ColorDef),
}

impl ParsedValue {
    /// Scalar used for curve height. Colors go through [`ColorDef::hsl_sum`].
    pub fn scalar(self) -> f64 {
        match self {
            Self::Number(v) => v,
            Self::Color(c) => c.hsl_sum(),
        }
    }

    pub fn kind(self, property: &str) -> PropertyKind {
        match self {
            Self::Color(_) => PropertyKind::Color,
            Self::Number(_) if property == "opacity" => PropertyKind::Opacity,
            Self::Number(_) => PropertyKind::Numeric,
        }
    }
}

/// Parse a literal style value (`"10px"`, `"0.5"`, `"red"`, `"rgb(0, 0, 255)"`).
pub fn parse_value(literal: &str) -> TimewaveResult<ParsedValue> {
    let trimmed = literal.trim();
    if let Ok(v) = trimmed.parse::<f64>()
        && v.is_finite()
    {
        return Ok(ParsedValue::Number(v));
    }
    if let Ok(c) = ColorDef::parse_css(trimmed) {
        return Ok(ParsedValue::Color(c));
    }
    numberize(trimmed).map(ParsedValue::Number).ok_or_else(|| {
        TimewaveError::validation(format!("\"{trimmed}\" is neither a number nor a color"))
    })
}

/// Strip the first run of unit letters (`"12.5px"` -> `12.5`) and parse what remains.
pub fn numberize(literal: &str) -> Option<f64> {
    let s = literal.trim();
    let start = s.find(|c: char| c.is_ascii_alphabetic() || c == '%');
    let stripped = match start {
        Some(i) => {
            let rest = &s[i..];
            let len = rest
                .find(|c: char| !(c.is_ascii_alphabetic() || c == '%'))
                .unwrap_or(rest.len());
            format!("{}{}", &s[..i], &rest[len..])
        }
        None => s.to_owned(),
    };
    let v = stripped.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Unit suffix of a numeric literal (`"12px"` -> `"px"`), used when writing interpolated values.
pub fn unit_suffix(literal: &str) -> &str {
    let s = literal.trim();
    s.find(|c: char| c.is_ascii_alphabetic() || c == '%')
        .map(|i| &s[i..])
        .unwrap_or("")
}

#[cfg(test)]
#[path = "../../tests/unit/keyframes/mod.rs"]
mod tests;
