use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{TimewaveError, TimewaveResult};

/// Named easing presets offered by the easing selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EasingPreset {
    /// `linear`
    Linear,
    /// `ease`
    Ease,
    /// `ease-in`
    EaseIn,
    /// `ease-in-out`
    EaseInOut,
    /// `ease-out`
    EaseOut,
}

impl EasingPreset {
    /// All presets, in selector order.
    pub const ALL: [Self; 5] = [
        Self::Linear,
        Self::Ease,
        Self::EaseIn,
        Self::EaseInOut,
        Self::EaseOut,
    ];

    /// Identifier as it appears in timing data.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Ease => "ease",
            Self::EaseIn => "ease-in",
            Self::EaseInOut => "ease-in-out",
            Self::EaseOut => "ease-out",
        }
    }

    /// Fixed control scalars drawn for this preset.
    pub fn control_points(self) -> CubicBezier {
        let (x1, y1, x2, y2) = match self {
            Self::Linear => (0.0, 0.0, 1.0, 1.0),
            Self::Ease => (0.25, 1.0, 0.25, 1.0),
            Self::EaseIn => (0.42, 0.0, 1.0, 1.0),
            Self::EaseInOut => (0.48, 0.0, 0.58, 1.0),
            Self::EaseOut => (0.0, 0.0, 0.58, 1.0),
        };
        CubicBezier { x1, y1, x2, y2 }
    }

    fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == s)
    }
}

/// Four explicit control scalars of a `cubic-bezier(x1, y1, x2, y2)` timing function.
///
/// `x1` and `x2` are confined to `[0, 1]`; `y1`/`y2` may overshoot.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    /// Build a curve, rejecting non-finite scalars and `x` outside `[0, 1]`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> TimewaveResult<Self> {
        let c = Self { x1, y1, x2, y2 };
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> TimewaveResult<()> {
        if ![self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(TimewaveError::invalid_easing(format!(
                "{self}: control scalars must be finite"
            )));
        }
        if !(0.0..=1.0).contains(&self.x1) || !(0.0..=1.0).contains(&self.x2) {
            return Err(TimewaveError::invalid_easing(format!(
                "{self}: x1 and x2 must be within [0, 1]"
            )));
        }
        Ok(())
    }

    /// Map input progress `t` in `[0, 1]` to eased output progress.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        let s = self.solve_param_for_x(t);
        bezier_1d(self.y1, self.y2, s)
    }

    // Newton first, bisection if the slope is too flat to trust.
    fn solve_param_for_x(&self, x: f64) -> f64 {
        const EPS: f64 = 1e-7;

        let mut s = x;
        for _ in 0..8 {
            let err = bezier_1d(self.x1, self.x2, s) - x;
            if err.abs() < EPS {
                return s;
            }
            let d = bezier_1d_derivative(self.x1, self.x2, s);
            if d.abs() < 1e-6 {
                break;
            }
            s -= err / d;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        s = x;
        for _ in 0..64 {
            let v = bezier_1d(self.x1, self.x2, s);
            if (v - x).abs() < EPS {
                break;
            }
            if v < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        s
    }
}

impl fmt::Display for CubicBezier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cubic-bezier({}, {}, {}, {})",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

// B(s) for a 1D cubic with endpoints 0 and 1.
fn bezier_1d(p1: f64, p2: f64, s: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
}

fn bezier_1d_derivative(p1: f64, p2: f64, s: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * p1 + 6.0 * u * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Progress-remapping function of an animation: a named preset or explicit control scalars.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EasingCurve {
    /// One of the named presets.
    Preset(EasingPreset),
    /// Explicit control scalars.
    CubicBezier(CubicBezier),
}

impl Default for EasingCurve {
    fn default() -> Self {
        Self::Preset(EasingPreset::Linear)
    }
}

impl EasingCurve {
    /// Control scalars for this curve, resolving presets through the preset table.
    pub fn control_points(&self) -> CubicBezier {
        match self {
            Self::Preset(p) => p.control_points(),
            Self::CubicBezier(c) => *c,
        }
    }

    pub fn preset(&self) -> Option<EasingPreset> {
        match self {
            Self::Preset(p) => Some(*p),
            Self::CubicBezier(_) => None,
        }
    }

    pub fn apply(&self, t: f64) -> f64 {
        self.control_points().apply(t)
    }

    /// Drop any preset identity, keeping the drawn control scalars.
    pub fn to_explicit(&self) -> Self {
        Self::CubicBezier(self.control_points())
    }
}

impl FromStr for EasingCurve {
    type Err = TimewaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        if let Some(p) = EasingPreset::from_name(&raw) {
            return Ok(Self::Preset(p));
        }

        let Some(args) = raw
            .strip_prefix("cubic-bezier")
            .map(str::trim_start)
            .and_then(|r| r.strip_prefix('('))
            .and_then(|r| r.strip_suffix(')'))
        else {
            return Err(TimewaveError::invalid_easing(format!(
                "\"{}\" is neither a preset nor cubic-bezier(x1, y1, x2, y2)",
                s.trim()
            )));
        };

        let values = args
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    TimewaveError::invalid_easing(format!(
                        "\"{}\": \"{}\" is not a number",
                        s.trim(),
                        part.trim()
                    ))
                })
            })
            .collect::<TimewaveResult<Vec<f64>>>()?;

        let [x1, y1, x2, y2] = values[..] else {
            return Err(TimewaveError::invalid_easing(format!(
                "\"{}\": cubic-bezier takes exactly 4 values, got {}",
                s.trim(),
                values.len()
            )));
        };
        Ok(Self::CubicBezier(CubicBezier::new(x1, y1, x2, y2)?))
    }
}

impl fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(p) => f.write_str(p.name()),
            Self::CubicBezier(c) => c.fmt(f),
        }
    }
}

impl serde::Serialize for EasingCurve {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for EasingCurve {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/easing.rs"]
mod tests;
