use super::*;
use crate::foundation::core::AnimationId;
use crate::keyframes::{Keyframe, PropertyKind};
use crate::model::context::TargetDesc;
use crate::timing::description::{TimeLayout, TimingDescription};

fn linear_context() -> AnimationContext {
    AnimationContext::build(
        AnimationId::new("a"),
        TargetDesc::default(),
        TimingDescription::new(0.0, 1000.0),
        vec![
            Keyframe::new(0.0).with("left", "0px"),
            Keyframe::new(1.0).with("left", "100px"),
        ],
        TimeLayout::default(),
        200,
    )
    .unwrap()
}

struct Scripted {
    t: f64,
    seeks: usize,
    broken: &'static str,
}

impl ColumnSampler for Scripted {
    fn seek(&mut self, t: f64) -> TimewaveResult<()> {
        self.t = t;
        self.seeks += 1;
        Ok(())
    }

    fn read(&mut self, property: &str) -> TimewaveResult<f64> {
        if property == self.broken && self.t > 50.0 {
            return Err(TimewaveError::sampling("detached"));
        }
        Ok(self.t)
    }
}

#[test]
fn columns_map_linearly_onto_the_window() {
    assert_eq!(sample_time(0, 1100.0, 110), 0.0);
    assert!((sample_time(55, 1100.0, 110) - 550.0).abs() < 1e-9);
    assert_eq!(sample_time(3, 1100.0, 0), 0.0);
}

#[test]
fn column_top_follows_vertical_scale() {
    let p = TrackedProperty {
        name: "left".to_owned(),
        kind: PropertyKind::Numeric,
        min: 0.0,
        max: 100.0,
        sample_count: 2,
        vertical_scale: 2.0,
    };
    let spans = curve_columns(&p, &[50.0, f64::NAN, 100.0], 200);
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0], ColumnSpan { x: 0, top: 100.0 });
    assert_eq!(spans[1], ColumnSpan { x: 2, top: 0.0 });
}

#[test]
fn failed_read_only_drops_that_property() {
    let mut s = Scripted {
        t: 0.0,
        seeks: 0,
        broken: "top",
    };
    let table = sample_properties(&mut s, &["left", "top"], 1000.0, 100).unwrap();
    assert_eq!(s.seeks, 100);
    assert_eq!(table.columns, 100);
    let left = table.values("left").unwrap().as_ref().unwrap();
    assert_eq!(left.len(), 100);
    assert!(table.values("top").unwrap().is_err());
    assert!(table.values("width").is_none());
}

#[test]
fn rasterize_draws_a_rising_ramp() {
    let ctx = linear_context();
    let canvas = Canvas {
        width: 110,
        height: 200,
    };
    let color = ColorDef::rgba(0.0, 0.0, 1.0, 1.0);
    let layer = rasterize(&ctx, "left", canvas, color, |t| Ok((t / 10.0).min(100.0))).unwrap();

    // Column 0 has value 0: nothing drawn.
    assert_eq!(layer.pixel(0, 199).unwrap()[3], 0);
    // Past the active interval the column reaches the top.
    assert!(layer.pixel(105, 1).unwrap()[3] > 200);
    // Half way the column covers the bottom half only.
    assert!(layer.pixel(50, 190).unwrap()[3] > 200);
    assert_eq!(layer.pixel(50, 10).unwrap()[3], 0);
}

#[test]
fn rasterize_is_deterministic() {
    let ctx = linear_context();
    let canvas = Canvas {
        width: 64,
        height: 32,
    };
    let color = ColorDef::rgba(1.0, 0.5, 0.0, 0.5);
    let a = rasterize(&ctx, "left", canvas, color, |t| Ok(t / 11.0)).unwrap();
    let b = rasterize(&ctx, "left", canvas, color, |t| Ok(t / 11.0)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn rasterize_rejects_unknown_property() {
    let ctx = linear_context();
    let canvas = Canvas {
        width: 8,
        height: 8,
    };
    let err = rasterize(&ctx, "opacity", canvas, ColorDef::rgba(0.0, 0.0, 0.0, 1.0), |_| Ok(0.0));
    assert!(err.is_err());
}
