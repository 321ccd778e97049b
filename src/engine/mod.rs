//! The timeline engine the inspector drives: enumerate, retime, seek, read back.

pub mod document;
pub mod keyframe;

use crate::foundation::core::AnimationId;
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::keyframes::{Keyframe, parse_value};
use crate::model::context::TargetDesc;
use crate::raster::sampler::ColumnSampler;
use crate::timing::description::TimingDescription;

/// Host capability the inspector needs from whatever actually plays the animations.
pub trait TimelineEngine {
    /// Active animations, in the order the host reports them.
    fn animations(&self) -> Vec<AnimationId>;
    fn target(&self, id: &AnimationId) -> TimewaveResult<TargetDesc>;
    fn timing(&self, id: &AnimationId) -> TimewaveResult<TimingDescription>;
    fn set_timing(&mut self, id: &AnimationId, timing: TimingDescription) -> TimewaveResult<()>;
    /// Declared keyframes with resolved offsets.
    fn keyframes(&self, id: &AnimationId) -> TimewaveResult<Vec<Keyframe>>;
    /// Move the animation's current time to `t` (ms, absolute).
    fn seek(&mut self, id: &AnimationId, t: f64) -> TimewaveResult<()>;
    fn current_time(&self, id: &AnimationId) -> TimewaveResult<f64>;
    /// Live computed value of `property` at the current time, as a style literal.
    fn computed_value(&self, id: &AnimationId, property: &str) -> TimewaveResult<String>;
}

/// Samples one animation of an engine column by column.
pub struct EngineSampler<'a, E: TimelineEngine + ?Sized> {
    engine: &'a mut E,
    id: &'a AnimationId,
}

impl<'a, E: TimelineEngine + ?Sized> EngineSampler<'a, E> {
    pub fn new(engine: &'a mut E, id: &'a AnimationId) -> Self {
        Self { engine, id }
    }
}

impl<E: TimelineEngine + ?Sized> ColumnSampler for EngineSampler<'_, E> {
    fn seek(&mut self, t: f64) -> TimewaveResult<()> {
        self.engine.seek(self.id, t)
    }

    fn read(&mut self, property: &str) -> TimewaveResult<f64> {
        let literal = self.engine.computed_value(self.id, property).map_err(|e| {
            TimewaveError::sampling(format!("{}: no computed \"{property}\": {e}", self.id))
        })?;
        parse_value(&literal)
            .map(|v| v.scalar())
            .map_err(|e| TimewaveError::sampling(format!("{}: {property}: {e}", self.id)))
    }
}

pub use document::{AnimationDoc, InspectorDoc};
pub use keyframe::{KeyframeAnimation, KeyframeEngine};

#[cfg(test)]
#[path = "../../tests/unit/engine/mod.rs"]
mod tests;
