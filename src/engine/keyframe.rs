use std::collections::BTreeMap;

use crate::engine::TimelineEngine;
use crate::foundation::core::AnimationId;
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::foundation::math::lerp;
use crate::keyframes::{Keyframe, ParsedValue, numberize, parse_value, resolve_offsets, unit_suffix};
use crate::model::context::TargetDesc;
use crate::timing::description::{Iterations, TimingDescription};

/// One in-memory keyframe animation with its own current time.
#[derive(Clone, Debug)]
pub struct KeyframeAnimation {
    pub id: AnimationId,
    pub target: TargetDesc,
    pub timing: TimingDescription,
    pub keyframes: Vec<Keyframe>,
    /// Value of each property when no effect applies.
    pub base: BTreeMap<String, String>,
    pub current_time: f64,
}

/// Where an animation's current time falls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Before,
    Active,
    After,
}

impl KeyframeAnimation {
    fn active_duration(&self) -> f64 {
        match self.timing.iterations {
            Iterations::Count(n) => self.timing.duration * f64::from(n),
            Iterations::Infinite => f64::INFINITY,
        }
    }

    pub fn phase(&self) -> Phase {
        let t = self.current_time;
        let start = self.timing.delay;
        let active = self.active_duration();
        if t < start {
            Phase::Before
        } else if active > 0.0 && t < start + active {
            Phase::Active
        } else {
            Phase::After
        }
    }

    /// Eased keyframe progress at the current time, or `None` when no effect applies.
    pub fn progress(&self) -> Option<f64> {
        let timing = &self.timing;
        let (iteration, simple) = match self.phase() {
            Phase::Before => {
                if !timing.fill.fills_backwards() {
                    return None;
                }
                (0, 0.0)
            }
            Phase::Active => {
                let elapsed = self.current_time - timing.delay;
                let pos = elapsed / timing.duration;
                let index = pos.floor();
                (index as u32, pos - index)
            }
            Phase::After => {
                if !timing.fill.fills_forwards() {
                    return None;
                }
                match timing.iterations {
                    Iterations::Count(n) => (n.saturating_sub(1), 1.0),
                    Iterations::Infinite => return None,
                }
            }
        };
        let directed = if timing.direction.is_forwarding(iteration) {
            simple
        } else {
            1.0 - simple
        };
        Some(timing.easing.apply(directed))
    }

    /// Computed value of `property` at the current time.
    pub fn value_of(&self, property: &str) -> TimewaveResult<String> {
        let stops: Vec<(f64, &str)> = self
            .keyframes
            .iter()
            .filter_map(|kf| kf.value(property).map(|v| (kf.computed_offset(), v)))
            .collect();
        if stops.is_empty() {
            return self
                .base
                .get(property)
                .cloned()
                .ok_or_else(|| not_animated(&self.id, property));
        }
        match self.progress() {
            Some(p) => interpolate_stops(&stops, p),
            None => Ok(self
                .base
                .get(property)
                .cloned()
                .unwrap_or_else(|| stops[0].1.to_owned())),
        }
    }
}

fn not_animated(id: &AnimationId, property: &str) -> TimewaveError {
    TimewaveError::sampling(format!("{id} has no value for \"{property}\""))
}

/// Value at keyframe progress `p`. Progress beyond `[0, 1]` (overshooting easings)
/// extrapolates along the first or last interval.
pub(crate) fn interpolate_stops(stops: &[(f64, &str)], p: f64) -> TimewaveResult<String> {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Err(TimewaveError::sampling("no keyframe stops")),
    };
    if stops.len() == 1 {
        return Ok(first.1.to_owned());
    }

    let i = if p < first.0 {
        0
    } else if p >= last.0 {
        // Last interval with a non-zero span ending at the final stop.
        stops.len() - 2
    } else {
        stops
            .windows(2)
            .position(|w| p >= w[0].0 && p < w[1].0)
            .unwrap_or(stops.len() - 2)
    };
    let (a, b) = (stops[i], stops[i + 1]);
    let span = b.0 - a.0;
    if span <= 0.0 {
        return Ok((if p < a.0 { a.1 } else { b.1 }).to_owned());
    }
    Ok(interpolate_literal(a.1, b.1, (p - a.0) / span))
}

/// Interpolate two style literals: numbers keep the unit of the first, colors blend in RGBA,
/// anything else flips at the midpoint.
pub fn interpolate_literal(a: &str, b: &str, t: f64) -> String {
    match (parse_value(a), parse_value(b)) {
        (Ok(ParsedValue::Color(ca)), Ok(ParsedValue::Color(cb))) => {
            let mut c = crate::keyframes::color::ColorDef::lerp(ca, cb, t);
            c.a = c.a.clamp(0.0, 1.0);
            c.to_css()
        }
        _ => match (number_of(a), number_of(b)) {
            (Some(va), Some(vb)) if units_agree(a, b) => {
                let unit = if unit_suffix(a).is_empty() {
                    unit_suffix(b)
                } else {
                    unit_suffix(a)
                };
                format!("{}{unit}", format_number(lerp(va, vb, t)))
            }
            _ => (if t < 0.5 { a } else { b }).to_owned(),
        },
    }
}

fn number_of(literal: &str) -> Option<f64> {
    match parse_value(literal) {
        Ok(ParsedValue::Number(v)) => Some(v),
        _ => numberize(literal),
    }
}

fn units_agree(a: &str, b: &str) -> bool {
    let (ua, ub) = (unit_suffix(a), unit_suffix(b));
    ua.is_empty() || ub.is_empty() || ua == ub
}

fn format_number(v: f64) -> String {
    let rounded = (v * 10_000.0).round() / 10_000.0 + 0.0;
    format!("{rounded}")
}

/// In-memory engine over keyframe animations, with a shared playback clock.
#[derive(Clone, Debug, Default)]
pub struct KeyframeEngine {
    animations: Vec<KeyframeAnimation>,
}

impl KeyframeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an animation under the next `animation-N` id.
    pub fn add(
        &mut self,
        target: TargetDesc,
        timing: TimingDescription,
        keyframes: Vec<Keyframe>,
        base: BTreeMap<String, String>,
    ) -> TimewaveResult<AnimationId> {
        let id = AnimationId::from_ordinal(self.animations.len() + 1);
        self.add_with_id(id.clone(), target, timing, keyframes, base)?;
        Ok(id)
    }

    pub fn add_with_id(
        &mut self,
        id: AnimationId,
        target: TargetDesc,
        timing: TimingDescription,
        mut keyframes: Vec<Keyframe>,
        base: BTreeMap<String, String>,
    ) -> TimewaveResult<()> {
        if self.animations.iter().any(|a| a.id == id) {
            return Err(TimewaveError::validation(format!("duplicate animation id {id}")));
        }
        timing.validate()?;
        resolve_offsets(&mut keyframes)?;
        self.animations.push(KeyframeAnimation {
            id,
            target,
            timing,
            keyframes,
            base,
            current_time: 0.0,
        });
        Ok(())
    }

    pub fn remove(&mut self, id: &AnimationId) -> Option<KeyframeAnimation> {
        let i = self.animations.iter().position(|a| &a.id == id)?;
        Some(self.animations.remove(i))
    }

    pub fn animation(&self, id: &AnimationId) -> TimewaveResult<&KeyframeAnimation> {
        self.animations
            .iter()
            .find(|a| &a.id == id)
            .ok_or_else(|| unknown(id))
    }

    fn animation_mut(&mut self, id: &AnimationId) -> TimewaveResult<&mut KeyframeAnimation> {
        self.animations
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| unknown(id))
    }

    /// Move every animation's clock forward by `dt` ms.
    pub fn advance(&mut self, dt: f64) {
        for a in &mut self.animations {
            a.current_time += dt;
        }
    }
}

fn unknown(id: &AnimationId) -> TimewaveError {
    TimewaveError::validation(format!("unknown animation {id}"))
}

impl TimelineEngine for KeyframeEngine {
    fn animations(&self) -> Vec<AnimationId> {
        self.animations.iter().map(|a| a.id.clone()).collect()
    }

    fn target(&self, id: &AnimationId) -> TimewaveResult<TargetDesc> {
        Ok(self.animation(id)?.target.clone())
    }

    fn timing(&self, id: &AnimationId) -> TimewaveResult<TimingDescription> {
        Ok(self.animation(id)?.timing)
    }

    fn set_timing(&mut self, id: &AnimationId, timing: TimingDescription) -> TimewaveResult<()> {
        timing.validate()?;
        self.animation_mut(id)?.timing = timing;
        Ok(())
    }

    fn keyframes(&self, id: &AnimationId) -> TimewaveResult<Vec<Keyframe>> {
        Ok(self.animation(id)?.keyframes.clone())
    }

    fn seek(&mut self, id: &AnimationId, t: f64) -> TimewaveResult<()> {
        if !t.is_finite() {
            return Err(TimewaveError::validation(format!("cannot seek to {t}")));
        }
        self.animation_mut(id)?.current_time = t;
        Ok(())
    }

    fn current_time(&self, id: &AnimationId) -> TimewaveResult<f64> {
        Ok(self.animation(id)?.current_time)
    }

    fn computed_value(&self, id: &AnimationId, property: &str) -> TimewaveResult<String> {
        self.animation(id)?.value_of(property)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/keyframe.rs"]
mod tests;
