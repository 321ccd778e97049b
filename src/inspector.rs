//! Owns every tracked animation and wires engine, sampler, cache and easing editor together.

use crate::config::{InspectorOpts, RenderMode};
use crate::engine::{EngineSampler, TimelineEngine};
use crate::foundation::core::{AnimationId, Canvas, Point, Viewport};
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::geometry::drag::{HandleKind, hit_test};
use crate::geometry::layout::{EasingLayout, layout};
use crate::keyframes::PropertyKind;
use crate::keyframes::color::ColorDef;
use crate::model::context::AnimationContext;
use crate::raster::cache::{LayerKey, LayerRole};
use crate::raster::composite::{LayerSource, compose_sources};
use crate::raster::gradient::{GradientSpec, color_gradient, draw_gradient, opacity_gradient};
use crate::raster::layer::RasterLayer;
use crate::raster::sampler::{SampleTable, curve_columns, draw_columns, sample_properties};
use crate::timing::description::TimingDescription;
use crate::timing::easing::EasingCurve;

/// Pointer distance (viewport units) within which a press grabs a handle.
pub const HANDLE_HIT_RADIUS: f64 = 6.0;

/// Layers drawn for a property, bottom to top.
pub fn layer_roles(kind: PropertyKind, mode: RenderMode) -> &'static [LayerRole] {
    match (mode, kind) {
        (RenderMode::Curve, _) | (RenderMode::AreaFill, PropertyKind::Numeric) => {
            &[LayerRole::Curve]
        }
        (RenderMode::AreaFill, PropertyKind::Opacity) => &[LayerRole::Curve, LayerRole::Gradient],
        (RenderMode::AreaFill, PropertyKind::Color) => &[LayerRole::Gradient],
    }
}

/// Outcome of one rasterization pass.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RasterReport {
    pub rasterized: Vec<(String, LayerRole)>,
    pub cached: Vec<(String, LayerRole)>,
    /// Properties whose layers could not be drawn, with the reason.
    pub failed: Vec<(String, String)>,
}

impl RasterReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What the scrubber shows on one display frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ObserverFrame {
    pub current_time: f64,
    /// Scrubber position as a fraction of the display window.
    pub throbber_fraction: f64,
    /// Live computed value of every tracked property, in discovery order.
    pub values: Vec<(String, String)>,
    /// Whether the host should tick again on its next frame.
    pub reschedule: bool,
}

/// Playback observer for one animation, polled once per display frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observer {
    id: AnimationId,
}

impl Observer {
    pub fn id(&self) -> &AnimationId {
        &self.id
    }

    pub fn tick<E: TimelineEngine>(&self, inspector: &Inspector<E>) -> TimewaveResult<ObserverFrame> {
        let ctx = inspector.context(&self.id)?;
        let current_time = inspector.engine.current_time(&self.id)?;
        let window = ctx.display_window();
        let mut values = Vec::with_capacity(ctx.properties.len());
        for p in &ctx.properties {
            match inspector.engine.computed_value(&self.id, &p.name) {
                Ok(v) => values.push((p.name.clone(), v)),
                Err(err) => tracing::debug!(property = %p.name, %err, "no live value"),
            }
        }
        Ok(ObserverFrame {
            current_time,
            throbber_fraction: if window > 0.0 {
                current_time / window
            } else {
                0.0
            },
            values,
            reschedule: current_time < ctx.total_time(),
        })
    }
}

/// Coordinator owning one [`AnimationContext`] per registered animation, in registration order.
pub struct Inspector<E: TimelineEngine> {
    engine: E,
    opts: InspectorOpts,
    contexts: Vec<AnimationContext>,
}

impl<E: TimelineEngine> Inspector<E> {
    pub fn new(engine: E, opts: InspectorOpts) -> TimewaveResult<Self> {
        opts.validate()?;
        Ok(Self {
            engine,
            opts,
            contexts: Vec::new(),
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn opts(&self) -> &InspectorOpts {
        &self.opts
    }

    pub fn contexts(&self) -> impl Iterator<Item = &AnimationContext> {
        self.contexts.iter()
    }

    pub fn context(&self, id: &AnimationId) -> TimewaveResult<&AnimationContext> {
        self.index_of(id).map(|i| &self.contexts[i])
    }

    fn index_of(&self, id: &AnimationId) -> TimewaveResult<usize> {
        self.contexts
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| TimewaveError::validation(format!("{id} is not registered")))
    }

    /// Register every engine animation not yet tracked and drop contexts whose animation is gone.
    #[tracing::instrument(skip(self))]
    pub fn discover(&mut self) -> TimewaveResult<Vec<AnimationId>> {
        let live = self.engine.animations();
        let before = self.contexts.len();
        self.contexts.retain(|c| live.contains(&c.id));
        if self.contexts.len() != before {
            tracing::debug!(dropped = before - self.contexts.len(), "animations removed");
        }

        let mut added = Vec::new();
        for id in live {
            if self.index_of(&id).is_ok() {
                continue;
            }
            let report = self.register(id.clone())?;
            if !report.is_clean() {
                tracing::warn!(animation = %id, failed = report.failed.len(), "partial raster");
            }
            added.push(id);
        }
        Ok(added)
    }

    /// Build the context for `id`, rasterize it and start playback from 0.
    pub fn register(&mut self, id: AnimationId) -> TimewaveResult<RasterReport> {
        if self.index_of(&id).is_ok() {
            return Err(TimewaveError::validation(format!(
                "{id} is already registered"
            )));
        }
        let ctx = AnimationContext::build(
            id.clone(),
            self.engine.target(&id)?,
            self.engine.timing(&id)?,
            self.engine.keyframes(&id)?,
            self.opts.time_layout,
            self.opts.canvas.height,
        )?;
        tracing::debug!(
            animation = %id,
            target = %ctx.target.label(),
            properties = ctx.properties.len(),
            "registered"
        );
        self.contexts.push(ctx);
        let report = self.rasterize(&id)?;
        self.replay(&id)?;
        Ok(report)
    }

    pub fn unregister(&mut self, id: &AnimationId) -> Option<AnimationContext> {
        let i = self.index_of(id).ok()?;
        Some(self.contexts.remove(i))
    }

    /// Draw every layer of `id` not already cached for its current timing.
    ///
    /// A property whose read-back fails is reported and left without layers; the rest still
    /// rasterize. The engine's current time is restored afterwards.
    #[tracing::instrument(skip(self), fields(animation = %id))]
    pub fn rasterize(&mut self, id: &AnimationId) -> TimewaveResult<RasterReport> {
        let canvas = self.opts.canvas;
        let mode = self.opts.mode;
        let i = self.index_of(id)?;
        let ctx = &self.contexts[i];
        let key = LayerKey {
            timing: ctx.timing.fingerprint(),
            canvas,
            mode,
        };

        let mut report = RasterReport::default();
        let mut wanted: Vec<(usize, LayerRole)> = Vec::new();
        for (pi, p) in ctx.properties.iter().enumerate() {
            for &role in layer_roles(p.kind, mode) {
                if ctx.cache.contains(&p.name, role, key) {
                    report.cached.push((p.name.clone(), role));
                } else {
                    wanted.push((pi, role));
                }
            }
        }
        if wanted.is_empty() {
            return Ok(report);
        }

        let curve_names: Vec<&str> = wanted
            .iter()
            .filter(|(_, role)| *role == LayerRole::Curve)
            .map(|(pi, _)| ctx.properties[*pi].name.as_str())
            .collect();
        let table = if curve_names.is_empty() {
            None
        } else {
            let restore = self.engine.current_time(id)?;
            let mut sampler = EngineSampler::new(&mut self.engine, id);
            let sampled =
                sample_properties(&mut sampler, &curve_names, ctx.display_window(), canvas.width);
            self.engine.seek(id, restore)?;
            Some(sampled?)
        };

        let ctx = &mut self.contexts[i];
        for (pi, role) in wanted {
            let name = ctx.properties[pi].name.clone();
            let drawn = self.opts.color_for(pi).and_then(|color| match role {
                LayerRole::Curve => curve_layer(ctx, pi, table.as_ref(), canvas, color),
                LayerRole::Gradient => gradient_layer(ctx, pi, canvas, color),
            });
            match drawn {
                Ok(layer) => {
                    ctx.cache.insert(&name, role, key, layer);
                    report.rasterized.push((name, role));
                }
                Err(err) => {
                    tracing::warn!(property = %name, ?role, %err, "property not rasterized");
                    ctx.cache.remove_property(&name);
                    report.failed.push((name, err.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// The displayed frame: cached layers over white in discovery order, or one property alone.
    pub fn composite(
        &mut self,
        id: &AnimationId,
        focus: Option<&str>,
    ) -> TimewaveResult<RasterLayer> {
        self.rasterize(id)?;
        let mode = self.opts.mode;
        let ctx = self.context(id)?;
        let sources: Vec<(String, LayerSource)> = ctx
            .properties
            .iter()
            .flat_map(|p| {
                layer_roles(p.kind, mode)
                    .iter()
                    .filter_map(move |&role| ctx.cache.peek(&p.name, role))
                    .map(move |l| (p.name.clone(), LayerSource::Ready(l.clone())))
            })
            .collect();
        compose_sources(self.opts.canvas, self.opts.background(), sources, focus)
    }

    pub fn easing_layout(&self, id: &AnimationId) -> TimewaveResult<EasingLayout> {
        let ctx = self.context(id)?;
        layout(&ctx.timing, self.opts.easing_viewport, ctx.time_layout)
    }

    /// Replace the easing with a named preset (or any easing literal).
    pub fn select_preset(&mut self, id: &AnimationId, easing: &str) -> TimewaveResult<RasterReport> {
        let easing: EasingCurve = easing.parse()?;
        let timing = TimingDescription {
            easing,
            ..self.context(id)?.timing
        };
        self.commit_timing(id, timing)
    }

    /// Apply a timing edit: push it to the engine, drop cached layers, rasterize and replay.
    #[tracing::instrument(skip(self), fields(animation = %id))]
    pub fn commit_timing(
        &mut self,
        id: &AnimationId,
        timing: TimingDescription,
    ) -> TimewaveResult<RasterReport> {
        timing.validate()?;
        let i = self.index_of(id)?;
        self.engine.set_timing(id, timing)?;
        self.contexts[i].set_timing(timing)?;
        let report = self.rasterize(id)?;
        self.replay(id)?;
        Ok(report)
    }

    /// Start a drag if `point` lands on a handle.
    pub fn press(&mut self, id: &AnimationId, point: Point) -> TimewaveResult<Option<HandleKind>> {
        let Some(handle) = hit_test(&self.easing_layout(id)?, point, HANDLE_HIT_RADIUS) else {
            return Ok(None);
        };
        self.press_handle(id, handle, point)?;
        Ok(Some(handle))
    }

    pub fn press_handle(
        &mut self,
        id: &AnimationId,
        handle: HandleKind,
        point: Point,
    ) -> TimewaveResult<()> {
        let viewport = self.opts.easing_viewport;
        let i = self.index_of(id)?;
        let ctx = &mut self.contexts[i];
        ctx.editor
            .press(handle, ctx.timing, ctx.time_layout, viewport, point)
    }

    /// Preview geometry for the pointer at `point`. Never rasterizes.
    pub fn drag_move(
        &self,
        id: &AnimationId,
        point: Point,
    ) -> TimewaveResult<Option<EasingLayout>> {
        self.context(id)?.editor.move_to(point)
    }

    /// Finish the drag and commit its timing; `None` when no drag was active.
    pub fn release(
        &mut self,
        id: &AnimationId,
        point: Point,
    ) -> TimewaveResult<Option<(TimingDescription, RasterReport)>> {
        let i = self.index_of(id)?;
        let Some(timing) = self.contexts[i].editor.release(point) else {
            return Ok(None);
        };
        let report = self.commit_timing(id, timing)?;
        Ok(Some((timing, report)))
    }

    pub fn cancel_drag(&mut self, id: &AnimationId) -> TimewaveResult<()> {
        let i = self.index_of(id)?;
        self.contexts[i].editor.cancel();
        Ok(())
    }

    /// Resize the easing editor. In-flight drags keep their timing and rescale only pixels.
    pub fn resize_easing_viewport(&mut self, viewport: Viewport) -> TimewaveResult<()> {
        let viewport = Viewport::new(viewport.width, viewport.height)?;
        self.opts.easing_viewport = viewport;
        for ctx in &mut self.contexts {
            ctx.editor.resize(viewport)?;
        }
        Ok(())
    }

    /// Seek to 0 and hand back an observer for the scrubber.
    pub fn replay(&mut self, id: &AnimationId) -> TimewaveResult<Observer> {
        self.index_of(id)?;
        self.engine.seek(id, 0.0)?;
        self.observe(id)
    }

    /// Observer for the current playback position, without seeking.
    pub fn observe(&self, id: &AnimationId) -> TimewaveResult<Observer> {
        self.index_of(id)?;
        Ok(Observer { id: id.clone() })
    }
}

fn curve_layer(
    ctx: &AnimationContext,
    pi: usize,
    table: Option<&SampleTable>,
    canvas: Canvas,
    color: ColorDef,
) -> TimewaveResult<RasterLayer> {
    let p = &ctx.properties[pi];
    match table.and_then(|t| t.values(&p.name)) {
        Some(Ok(samples)) => draw_columns(&curve_columns(p, samples, canvas.height), canvas, color),
        Some(Err(err)) => Err(TimewaveError::sampling(err.to_string())),
        None => Err(TimewaveError::sampling(format!("\"{}\" was not sampled", p.name))),
    }
}

fn gradient_layer(
    ctx: &AnimationContext,
    pi: usize,
    canvas: Canvas,
    color: ColorDef,
) -> TimewaveResult<RasterLayer> {
    let p = &ctx.properties[pi];
    let spec: GradientSpec = match p.kind {
        PropertyKind::Color => color_gradient(&ctx.keyframes, &p.name)?,
        PropertyKind::Opacity => opacity_gradient(&ctx.keyframes, &p.name, color)?,
        PropertyKind::Numeric => {
            return Err(TimewaveError::render(format!(
                "\"{}\" has no gradient form",
                p.name
            )));
        }
    };
    // The keyframes span iteration 0's active interval.
    let window = ctx.display_window();
    if window <= 0.0 {
        return Ok(RasterLayer::transparent(canvas));
    }
    let px_per_ms = f64::from(canvas.width) / window;
    let x0 = ctx.timing.delay * px_per_ms;
    let x1 = (ctx.timing.delay + ctx.timing.duration) * px_per_ms;
    draw_gradient(&spec, canvas, x0, x1)
}

#[cfg(test)]
#[path = "../tests/unit/inspector.rs"]
mod tests;
