use crate::foundation::core::{BezPath, Point, Viewport};
use crate::foundation::error::TimewaveResult;
use crate::timing::description::{TimeLayout, TimingDescription};

/// One displayed iteration of the easing curve, in drawing space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationSegment {
    pub index: u32,
    pub forwarding: bool,
    pub start: Point,
    pub cp1: Point,
    pub cp2: Point,
    pub end: Point,
}

/// Horizontal hold line drawn for fill modes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatSegment {
    pub from: Point,
    pub to: Point,
}

/// Screen positions of the draggable handles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandlePositions {
    /// Start of iteration 0, on the baseline.
    pub delay: Point,
    /// End of the last displayed iteration, on the baseline.
    pub duration: Point,
    /// `(x1, y1)` as drawn on iteration 0.
    pub control_point1: Point,
    /// `(x2, y2)` as drawn on iteration 0.
    pub control_point2: Point,
}

/// Drawing-space geometry of an animation's easing graph.
#[derive(Clone, Debug, PartialEq)]
pub struct EasingLayout {
    pub viewport: Viewport,
    /// Drawing units per millisecond.
    pub px_per_ms: f64,
    pub displayed_iterations: u32,
    pub segments: Vec<IterationSegment>,
    pub fill_backwards: Option<FlatSegment>,
    pub fill_forwards: Option<FlatSegment>,
    pub handles: HandlePositions,
}

impl EasingLayout {
    /// Start x and width of iteration 0's slot.
    pub fn first_slot(&self) -> (f64, f64) {
        match self.segments.first() {
            Some(s) => (s.start.x, s.end.x - s.start.x),
            None => (self.handles.delay.x, 0.0),
        }
    }

    pub fn first_iteration_forwards(&self) -> bool {
        self.segments.first().is_none_or(|s| s.forwarding)
    }

    /// Open path through the fill holds and every iteration curve.
    pub fn outline(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut current: Option<Point> = None;
        let goto = |path: &mut BezPath, p: Point, current: &mut Option<Point>| {
            match *current {
                None => path.move_to(p),
                Some(c) if c != p => path.line_to(p),
                Some(_) => {}
            }
            *current = Some(p);
        };

        if let Some(f) = self.fill_backwards {
            goto(&mut path, f.from, &mut current);
            goto(&mut path, f.to, &mut current);
        }
        for seg in &self.segments {
            goto(&mut path, seg.start, &mut current);
            path.curve_to(seg.cp1, seg.cp2, seg.end);
            current = Some(seg.end);
        }
        if let Some(f) = self.fill_forwards {
            goto(&mut path, f.from, &mut current);
            goto(&mut path, f.to, &mut current);
        }
        path
    }

    /// Outline closed down to the baseline, for filled rendering.
    pub fn area(&self) -> BezPath {
        let mut path = self.outline();
        let first_x = self
            .fill_backwards
            .map(|f| f.from.x)
            .or_else(|| self.segments.first().map(|s| s.start.x));
        let last_x = self
            .fill_forwards
            .map(|f| f.to.x)
            .or_else(|| self.segments.last().map(|s| s.end.x));
        if let (Some(first_x), Some(last_x)) = (first_x, last_x) {
            path.line_to(Point::new(last_x, self.viewport.height));
            path.line_to(Point::new(first_x, self.viewport.height));
            path.close_path();
        }
        path
    }

    pub fn to_svg_path(&self) -> String {
        self.outline().to_svg()
    }
}

/// Map a normalized control point into an iteration slot. Y is flipped: progress 1 is at the top.
pub fn control_point_to_screen(
    x: f64,
    y: f64,
    slot_x0: f64,
    slot_width: f64,
    height: f64,
    forwarding: bool,
) -> Point {
    let x = if forwarding { x } else { 1.0 - x };
    Point::new(slot_x0 + slot_width * x, (1.0 - y) * height)
}

/// Inverse of [`control_point_to_screen`]. `None` when the slot has no width.
pub fn screen_to_control_point(
    p: Point,
    slot_x0: f64,
    slot_width: f64,
    height: f64,
    forwarding: bool,
) -> Option<(f64, f64)> {
    if slot_width <= 0.0 || height <= 0.0 {
        return None;
    }
    let along = (p.x - slot_x0) / slot_width;
    let x = if forwarding { along } else { 1.0 - along };
    Some((x, 1.0 - p.y / height))
}

/// Lay out `timing` so the display window spans the viewport width.
pub fn layout(
    timing: &TimingDescription,
    viewport: Viewport,
    time_layout: TimeLayout,
) -> TimewaveResult<EasingLayout> {
    let window = timing.display_window(time_layout);
    let px_per_ms = if window > 0.0 {
        viewport.width / window
    } else {
        0.0
    };
    layout_with_scale(timing, viewport, time_layout, px_per_ms)
}

/// Lay out `timing` with a fixed horizontal scale (used while a drag is in flight).
pub fn layout_with_scale(
    timing: &TimingDescription,
    viewport: Viewport,
    time_layout: TimeLayout,
    px_per_ms: f64,
) -> TimewaveResult<EasingLayout> {
    timing.validate()?;
    let cp = timing.easing.control_points();
    let h = viewport.height;
    let n = timing.displayed_iterations(time_layout);
    let slot_w = timing.duration * px_per_ms;

    let segments: Vec<IterationSegment> = (0..n)
        .map(|i| {
            let forwarding = timing.direction.is_forwarding(i);
            let x0 = (timing.delay + f64::from(i) * timing.duration) * px_per_ms;
            let x1 = x0 + slot_w;
            // A mirrored iteration is the forward curve reflected in time, so the handles swap.
            let (c1, c2) = if forwarding {
                ((cp.x1, cp.y1), (cp.x2, cp.y2))
            } else {
                ((cp.x2, cp.y2), (cp.x1, cp.y1))
            };
            let (start_y, end_y) = if forwarding { (h, 0.0) } else { (0.0, h) };
            IterationSegment {
                index: i,
                forwarding,
                start: Point::new(x0, start_y),
                cp1: control_point_to_screen(c1.0, c1.1, x0, slot_w, h, forwarding),
                cp2: control_point_to_screen(c2.0, c2.1, x0, slot_w, h, forwarding),
                end: Point::new(x1, end_y),
            }
        })
        .collect();

    let first = segments[0];
    let last = segments[segments.len() - 1];

    let fill_backwards = (timing.fill.fills_backwards() && !first.forwarding && timing.delay > 0.0)
        .then(|| FlatSegment {
            from: Point::new(0.0, first.start.y),
            to: first.start,
        });
    let fill_forwards = (timing.fill.fills_forwards()
        && timing.shows_last_iteration(time_layout)
        && last.forwarding
        && viewport.width > last.end.x)
        .then(|| FlatSegment {
            from: last.end,
            to: Point::new(viewport.width, last.end.y),
        });

    let handles = HandlePositions {
        delay: Point::new(first.start.x, h),
        duration: Point::new(last.end.x, h),
        control_point1: control_point_to_screen(
            cp.x1,
            cp.y1,
            first.start.x,
            slot_w,
            h,
            first.forwarding,
        ),
        control_point2: control_point_to_screen(
            cp.x2,
            cp.y2,
            first.start.x,
            slot_w,
            h,
            first.forwarding,
        ),
    };

    Ok(EasingLayout {
        viewport,
        px_per_ms,
        displayed_iterations: n,
        segments,
        fill_backwards,
        fill_forwards,
        handles,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/layout.rs"]
mod tests;
