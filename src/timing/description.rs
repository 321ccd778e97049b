use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::foundation::math::Fnv1a64;
use crate::timing::easing::EasingCurve;

/// Iteration count cap used when laying out unbounded or very long animations.
pub const DEFAULT_DISPLAY_ITERATION_CAP: u32 = 3;

/// Trailing margin appended to the total time so the curve end is not flush with the edge.
pub const DEFAULT_TRAILING_MARGIN: f64 = 0.1;

/// How timing values are stretched onto a horizontal axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimeLayout {
    pub iteration_cap: u32,
    pub trailing_margin: f64,
}

impl Default for TimeLayout {
    fn default() -> Self {
        Self {
            iteration_cap: DEFAULT_DISPLAY_ITERATION_CAP,
            trailing_margin: DEFAULT_TRAILING_MARGIN,
        }
    }
}

/// Playback order per iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Normal,
    Reverse,
    Alternate,
    AlternateReverse,
}

impl Direction {
    /// Whether iteration `i` (0-indexed) plays from the first keyframe to the last.
    pub fn is_forwarding(self, i: u32) -> bool {
        match self {
            Self::Normal => true,
            Self::Reverse => false,
            Self::Alternate => i % 2 == 0,
            Self::AlternateReverse => i % 2 == 1,
        }
    }
}

/// Whether the first/last keyframe value is held outside the active interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillMode {
    #[default]
    None,
    Forwards,
    Backwards,
    Both,
}

impl FillMode {
    pub fn fills_backwards(self) -> bool {
        matches!(self, Self::Backwards | Self::Both)
    }

    pub fn fills_forwards(self) -> bool {
        matches!(self, Self::Forwards | Self::Both)
    }
}

/// Iteration count: a positive integer or unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Iterations {
    Count(u32),
    Infinite,
}

impl Default for Iterations {
    fn default() -> Self {
        Self::Count(1)
    }
}

impl Iterations {
    pub fn count(self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(n),
            Self::Infinite => None,
        }
    }

    /// Iteration count used for layout; never mutates the real value.
    pub fn displayable(self, cap: u32) -> u32 {
        let cap = cap.max(1);
        match self {
            Self::Count(n) => n.clamp(1, cap),
            Self::Infinite => cap,
        }
    }
}

impl serde::Serialize for Iterations {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Count(n) => serializer.serialize_u32(*n),
            Self::Infinite => serializer.serialize_str("infinite"),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Iterations {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(u32),
            Word(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Count(0) => Err(serde::de::Error::custom("iterations must be >= 1")),
            Repr::Count(n) => Ok(Self::Count(n)),
            Repr::Word(w) if w == "infinite" => Ok(Self::Infinite),
            Repr::Word(w) => Err(serde::de::Error::custom(format!(
                "iterations must be a positive integer or \"infinite\", got \"{w}\""
            ))),
        }
    }
}

/// Timing parameters of one animation, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimingDescription {
    #[serde(default)]
    pub delay: f64,
    pub duration: f64,
    #[serde(default)]
    pub iterations: Iterations,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub fill: FillMode,
    #[serde(default)]
    pub easing: EasingCurve,
}

impl TimingDescription {
    pub fn new(delay: f64, duration: f64) -> Self {
        Self {
            delay,
            duration,
            iterations: Iterations::default(),
            direction: Direction::default(),
            fill: FillMode::default(),
            easing: EasingCurve::default(),
        }
    }

    pub fn validate(&self) -> TimewaveResult<()> {
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(TimewaveError::validation(format!(
                "delay must be finite and >= 0, got {}",
                self.delay
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TimewaveError::validation(format!(
                "duration must be finite and >= 0, got {}",
                self.duration
            )));
        }
        if self.iterations == Iterations::Count(0) {
            return Err(TimewaveError::validation("iterations must be >= 1"));
        }
        if let EasingCurve::CubicBezier(c) = &self.easing {
            c.validate()?;
        }
        Ok(())
    }

    pub fn displayed_iterations(&self, layout: TimeLayout) -> u32 {
        self.iterations.displayable(layout.iteration_cap)
    }

    /// `duration * displayable iterations + delay`.
    pub fn total_time(&self, layout: TimeLayout) -> f64 {
        self.duration * f64::from(self.displayed_iterations(layout)) + self.delay
    }

    /// Total time stretched by the trailing layout margin.
    pub fn display_window(&self, layout: TimeLayout) -> f64 {
        self.total_time(layout) * (1.0 + layout.trailing_margin)
    }

    /// Whether the last displayed iteration is the real last iteration.
    pub fn shows_last_iteration(&self, layout: TimeLayout) -> bool {
        matches!(self.iterations, Iterations::Count(n) if n <= layout.iteration_cap.max(1))
    }

    /// Stable hash of every field that changes sampled values.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_f64(self.delay);
        h.write_f64(self.duration);
        match self.iterations {
            Iterations::Count(n) => {
                h.write_u8(0);
                h.write_u64(u64::from(n));
            }
            Iterations::Infinite => h.write_u8(1),
        }
        h.write_u8(self.direction as u8);
        h.write_u8(self.fill as u8);
        h.write_str(&self.easing.to_string());
        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/description.rs"]
mod tests;
