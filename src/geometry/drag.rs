use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::TimewaveResult;
use crate::geometry::layout::{EasingLayout, layout, layout_with_scale, screen_to_control_point};
use crate::timing::description::{TimeLayout, TimingDescription};
use crate::timing::easing::EasingCurve;

/// Dragged control-point ordinates are kept within `[-1, 2]` of the unit range.
const Y_OVERSHOOT_LIMIT: f64 = 1.0;

/// Baseline handles follow the pointer at most this many viewport widths past either edge.
const EDGE_OVERRUN: f64 = 1.0;

/// Draggable handle of the easing editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleKind {
    Delay,
    Duration,
    ControlPoint1,
    ControlPoint2,
}

/// State captured when a handle is pressed; consumed on release.
#[derive(Clone, Debug)]
pub struct DragSession {
    pub handle: HandleKind,
    pub original_timing: TimingDescription,
    pub original_layout: EasingLayout,
    pub press: Point,
    time_layout: TimeLayout,
}

impl DragSession {
    pub fn begin(
        handle: HandleKind,
        timing: TimingDescription,
        time_layout: TimeLayout,
        viewport: Viewport,
        press: Point,
    ) -> TimewaveResult<Self> {
        let original_layout = layout(&timing, viewport, time_layout)?;
        Ok(Self {
            handle,
            original_timing: timing,
            original_layout,
            press,
            time_layout,
        })
    }

    fn ms_per_px(&self) -> f64 {
        if self.original_layout.px_per_ms > 0.0 {
            1.0 / self.original_layout.px_per_ms
        } else {
            0.0
        }
    }

    /// Timing implied by the pointer at `p`. Always valid; falls back to the original timing
    /// for non-finite pointers.
    pub fn timing_at(&self, p: Point) -> TimingDescription {
        let orig = self.original_timing;
        if !(p.x.is_finite() && p.y.is_finite()) {
            return orig;
        }
        let vw = self.original_layout.viewport.width;
        let px = p.x.clamp(-EDGE_OVERRUN * vw, (1.0 + EDGE_OVERRUN) * vw);
        let dx_ms = (px - self.press.x) * self.ms_per_px();

        match self.handle {
            HandleKind::Delay => TimingDescription {
                delay: (orig.delay + dx_ms).max(0.0),
                ..orig
            },
            HandleKind::Duration => {
                let n = f64::from(orig.displayed_iterations(self.time_layout));
                TimingDescription {
                    duration: (orig.duration + dx_ms / n).max(0.0),
                    ..orig
                }
            }
            HandleKind::ControlPoint1 | HandleKind::ControlPoint2 => {
                let (x0, w) = self.original_layout.first_slot();
                let forwarding = self.original_layout.first_iteration_forwards();
                let h = self.original_layout.viewport.height;
                let mut cp = orig.easing.control_points();
                let Some((x, y)) = screen_to_control_point(p, x0, w, h, forwarding) else {
                    return orig;
                };
                let x = x.clamp(0.0, 1.0);
                let y = y.clamp(-Y_OVERSHOOT_LIMIT, 1.0 + Y_OVERSHOOT_LIMIT);
                if self.handle == HandleKind::ControlPoint1 {
                    cp.x1 = x;
                    cp.y1 = y;
                } else {
                    cp.x2 = x;
                    cp.y2 = y;
                }
                TimingDescription {
                    easing: EasingCurve::CubicBezier(cp),
                    ..orig
                }
            }
        }
    }

    /// Drawing-space visuals for the pointer at `p`. Never touches raster layers.
    pub fn preview(&self, p: Point) -> TimewaveResult<EasingLayout> {
        layout_with_scale(
            &self.timing_at(p),
            self.original_layout.viewport,
            self.time_layout,
            self.original_layout.px_per_ms,
        )
    }

    /// Rescale pixel ratios to a resized viewport. In-flight timing values are untouched.
    pub fn resize(&mut self, viewport: Viewport) -> TimewaveResult<()> {
        let old = self.original_layout.viewport;
        let sx = viewport.width / old.width;
        let sy = viewport.height / old.height;
        self.press = Point::new(self.press.x * sx, self.press.y * sy);
        self.original_layout = layout_with_scale(
            &self.original_timing,
            viewport,
            self.time_layout,
            self.original_layout.px_per_ms * sx,
        )?;
        Ok(())
    }
}

/// Easing editor interaction state.
#[derive(Clone, Debug, Default)]
pub enum EditorState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Per-animation `Idle -> Dragging(handle) -> Idle` state machine.
#[derive(Clone, Debug, Default)]
pub struct EasingEditor {
    state: EditorState,
}

impl EasingEditor {
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, EditorState::Dragging(_))
    }

    /// Enter `Dragging`. A session left over from an earlier gesture is discarded.
    pub fn press(
        &mut self,
        handle: HandleKind,
        timing: TimingDescription,
        time_layout: TimeLayout,
        viewport: Viewport,
        point: Point,
    ) -> TimewaveResult<()> {
        let session = DragSession::begin(handle, timing, time_layout, viewport, point)?;
        if let EditorState::Dragging(stale) = std::mem::take(&mut self.state) {
            tracing::debug!(handle = ?stale.handle, "discarding stale drag session");
        }
        self.state = EditorState::Dragging(session);
        Ok(())
    }

    /// Cheap visual update; `None` when idle.
    pub fn move_to(&self, point: Point) -> TimewaveResult<Option<EasingLayout>> {
        match &self.state {
            EditorState::Idle => Ok(None),
            EditorState::Dragging(s) => s.preview(point).map(Some),
        }
    }

    /// Leave `Dragging` and return the timing to commit; `None` when idle.
    pub fn release(&mut self, point: Point) -> Option<TimingDescription> {
        match std::mem::take(&mut self.state) {
            EditorState::Idle => None,
            EditorState::Dragging(s) => Some(s.timing_at(point)),
        }
    }

    pub fn cancel(&mut self) {
        self.state = EditorState::Idle;
    }

    pub fn resize(&mut self, viewport: Viewport) -> TimewaveResult<()> {
        if let EditorState::Dragging(s) = &mut self.state {
            s.resize(viewport)?;
        }
        Ok(())
    }
}

/// Handle under `point`, if any lies within `radius`. Baseline handles win ties, so a control
/// point sitting on the delay or duration handle never hides it.
pub fn hit_test(layout: &EasingLayout, point: Point, radius: f64) -> Option<HandleKind> {
    let h = &layout.handles;
    [
        (HandleKind::Delay, h.delay),
        (HandleKind::Duration, h.duration),
        (HandleKind::ControlPoint1, h.control_point1),
        (HandleKind::ControlPoint2, h.control_point2),
    ]
    .into_iter()
    .map(|(k, p)| (k, p.distance(point)))
    .filter(|(_, d)| *d <= radius)
    .min_by(|a, b| a.1.total_cmp(&b.1))
    .map(|(k, _)| k)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/drag.rs"]
mod tests;
