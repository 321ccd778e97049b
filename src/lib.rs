//! Timewave is an inspector kernel for declarative keyframe animations.
//!
//! It samples an animation's timeline one pixel column at a time into cached per-property raster
//! layers, and maps timing (delay, duration, direction, fill, easing) to and from the geometry of
//! an interactive easing editor:
//!
//! - Load a [`KeyframeEngine`] (or implement [`TimelineEngine`] for another host)
//! - Create an [`Inspector`] and [`Inspector::discover`] its animations
//! - Composite frames, drag easing handles and commit timing edits
#![forbid(unsafe_code)]

mod foundation;

/// Inspector configuration.
pub mod config;
/// Timeline engines the inspector can drive.
pub mod engine;
/// Easing editor geometry: timing to path, and drags back to timing.
pub mod geometry;
/// The coordinator owning every tracked animation.
pub mod inspector;
/// Declared keyframes and literal value parsing.
pub mod keyframes;
/// Per-animation state: tracked properties and contexts.
pub mod model;
/// Sampling, raster layers, gradients, caching and compositing.
pub mod raster;
/// Timing descriptions and easing curves.
pub mod timing;

pub use crate::foundation::core::{
    AnimationId, BezPath, Canvas, Point, Rect, Rgba8Premul, Vec2, Viewport,
};
pub use crate::foundation::error::{TimewaveError, TimewaveResult};

pub use crate::config::{InspectorOpts, RenderMode};
pub use crate::engine::{AnimationDoc, InspectorDoc, KeyframeEngine, TimelineEngine};
pub use crate::geometry::drag::{EasingEditor, HandleKind};
pub use crate::geometry::layout::EasingLayout;
pub use crate::inspector::{Inspector, Observer, ObserverFrame, RasterReport};
pub use crate::keyframes::Keyframe;
pub use crate::keyframes::color::ColorDef;
pub use crate::model::context::{AnimationContext, TargetDesc};
pub use crate::raster::layer::RasterLayer;
pub use crate::timing::description::{Direction, FillMode, Iterations, TimeLayout, TimingDescription};
pub use crate::timing::easing::{CubicBezier, EasingCurve, EasingPreset};
