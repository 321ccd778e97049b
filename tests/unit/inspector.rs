use super::*;
use crate::engine::KeyframeEngine;
use crate::keyframes::Keyframe;
use crate::model::context::TargetDesc;
use crate::timing::description::{Direction, Iterations};
use crate::timing::easing::EasingPreset;
use std::collections::BTreeMap;

fn alternate_timing() -> TimingDescription {
    TimingDescription {
        iterations: Iterations::Count(2),
        direction: Direction::Alternate,
        ..TimingDescription::new(0.0, 1000.0)
    }
}

fn engine() -> KeyframeEngine {
    let mut e = KeyframeEngine::new();
    e.add(
        TargetDesc {
            tag: "div".to_owned(),
            id: Some("box".to_owned()),
            classes: Vec::new(),
        },
        alternate_timing(),
        vec![
            Keyframe::new(0.0)
                .with("left", "0px")
                .with("opacity", "0")
                .with("color", "red"),
            Keyframe::new(1.0)
                .with("left", "100px")
                .with("opacity", "1")
                .with("color", "blue"),
        ],
        BTreeMap::new(),
    )
    .unwrap();
    e
}

fn inspector(mode: RenderMode) -> (Inspector<KeyframeEngine>, AnimationId) {
    let opts = InspectorOpts {
        mode,
        ..InspectorOpts::default()
    };
    let mut i = Inspector::new(engine(), opts).unwrap();
    let added = i.discover().unwrap();
    assert_eq!(added.len(), 1);
    let id = added[0].clone();
    (i, id)
}

/// Delegates to a keyframe engine but cannot read back `top`.
struct NoTop(KeyframeEngine);

impl TimelineEngine for NoTop {
    fn animations(&self) -> Vec<AnimationId> {
        self.0.animations()
    }
    fn target(&self, id: &AnimationId) -> TimewaveResult<TargetDesc> {
        self.0.target(id)
    }
    fn timing(&self, id: &AnimationId) -> TimewaveResult<TimingDescription> {
        self.0.timing(id)
    }
    fn set_timing(&mut self, id: &AnimationId, timing: TimingDescription) -> TimewaveResult<()> {
        self.0.set_timing(id, timing)
    }
    fn keyframes(&self, id: &AnimationId) -> TimewaveResult<Vec<Keyframe>> {
        self.0.keyframes(id)
    }
    fn seek(&mut self, id: &AnimationId, t: f64) -> TimewaveResult<()> {
        self.0.seek(id, t)
    }
    fn current_time(&self, id: &AnimationId) -> TimewaveResult<f64> {
        self.0.current_time(id)
    }
    fn computed_value(&self, id: &AnimationId, property: &str) -> TimewaveResult<String> {
        if property == "top" {
            return Err(TimewaveError::sampling("computed style unavailable"));
        }
        self.0.computed_value(id, property)
    }
}

#[test]
fn discovery_builds_contexts_in_order() {
    let (i, id) = inspector(RenderMode::Curve);
    assert_eq!(id.as_str(), "animation-1");
    let ctx = i.context(&id).unwrap();
    assert_eq!(ctx.target.label(), "div#box");
    assert_eq!(ctx.property_names(), ["left", "opacity", "color"]);
    assert_eq!(ctx.cache.len(), 3);
    assert!((ctx.display_window() - 2200.0).abs() < 1e-9);
    assert_eq!(i.engine().current_time(&id).unwrap(), 0.0);
}

#[test]
fn second_pass_is_served_from_cache() {
    let (mut i, id) = inspector(RenderMode::Curve);
    let report = i.rasterize(&id).unwrap();
    assert!(report.rasterized.is_empty());
    assert_eq!(report.cached.len(), 3);

    let a = i.composite(&id, None).unwrap();
    let b = i.composite(&id, None).unwrap();
    assert_eq!(a, b);
    assert!(a.data.chunks_exact(4).any(|px| px != [255, 255, 255, 255]));
}

#[test]
fn composite_goes_through_the_ordered_decode_join() {
    let (mut i, id) = inspector(RenderMode::Curve);
    let frame = i.composite(&id, None).unwrap();
    let ctx = i.context(&id).unwrap();
    let sources = || -> Vec<(String, LayerSource)> {
        ctx.properties
            .iter()
            .filter_map(|p| {
                ctx.cache
                    .peek(&p.name, LayerRole::Curve)
                    .map(|l| (p.name.clone(), LayerSource::Ready(l.clone())))
            })
            .collect()
    };
    assert_eq!(sources().len(), 3);

    let canvas = i.opts().canvas;
    let bg = i.opts().background();
    assert_eq!(compose_sources(canvas, bg, sources(), None).unwrap(), frame);

    // A layer that fails to decode is skipped; the rest keep their order.
    let mut with_garbage = vec![("garbage".to_owned(), LayerSource::Encoded(vec![1, 2, 3]))];
    with_garbage.extend(sources());
    assert_eq!(
        compose_sources(canvas, bg, with_garbage, None).unwrap(),
        frame
    );
}

#[test]
fn focus_shows_a_single_property() {
    let (mut i, id) = inspector(RenderMode::Curve);
    let all = i.composite(&id, None).unwrap();
    let left = i.composite(&id, Some("left")).unwrap();
    assert_ne!(all, left);
    assert!(i.composite(&id, Some("width")).is_err());
}

#[test]
fn failed_read_back_is_isolated_to_its_property() {
    let mut e = KeyframeEngine::new();
    e.add(
        TargetDesc::default(),
        TimingDescription::new(0.0, 100.0),
        vec![
            Keyframe::new(0.0).with("left", "0px").with("top", "0px"),
            Keyframe::new(1.0).with("left", "10px").with("top", "10px"),
        ],
        BTreeMap::new(),
    )
    .unwrap();
    let mut i = Inspector::new(NoTop(e), InspectorOpts::default()).unwrap();
    i.discover().unwrap();
    let id = AnimationId::from_ordinal(1);

    let ctx = i.context(&id).unwrap();
    assert!(ctx.cache.peek("left", LayerRole::Curve).is_some());
    assert!(ctx.cache.peek("top", LayerRole::Curve).is_none());

    let report = i.rasterize(&id).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "top");
    assert_eq!(report.cached, [("left".to_owned(), LayerRole::Curve)]);
}

#[test]
fn timing_commit_invalidates_and_replays() {
    let (mut i, id) = inspector(RenderMode::Curve);
    i.engine_mut().seek(&id, 700.0).unwrap();
    let before = i.context(&id).unwrap().cache.stats().invalidations;

    let timing = TimingDescription {
        delay: 250.0,
        ..alternate_timing()
    };
    let report = i.commit_timing(&id, timing).unwrap();
    assert_eq!(report.rasterized.len(), 3);
    assert!(report.cached.is_empty());

    let ctx = i.context(&id).unwrap();
    assert_eq!(ctx.cache.stats().invalidations, before + 1);
    assert_eq!(ctx.timing.delay, 250.0);
    assert_eq!(i.engine().timing(&id).unwrap().delay, 250.0);
    assert_eq!(i.engine().current_time(&id).unwrap(), 0.0);
}

#[test]
fn preset_selection() {
    let (mut i, id) = inspector(RenderMode::Curve);
    i.select_preset(&id, "ease-in").unwrap();
    assert_eq!(
        i.context(&id).unwrap().timing.easing.preset(),
        Some(EasingPreset::EaseIn)
    );

    let err = i.select_preset(&id, "bouncy").unwrap_err();
    assert!(matches!(err, TimewaveError::InvalidEasingFormat(_)));
    assert_eq!(
        i.context(&id).unwrap().timing.easing.preset(),
        Some(EasingPreset::EaseIn)
    );
}

#[test]
fn duration_drag_previews_cheaply_then_commits() {
    let (mut i, id) = inspector(RenderMode::Curve);
    let handle = i.easing_layout(&id).unwrap().handles.duration;
    assert_eq!(i.press(&id, handle).unwrap(), Some(HandleKind::Duration));

    let inserts = i.context(&id).unwrap().cache.stats().inserts;
    let to = Point::new(handle.x + 60.0, handle.y);
    let preview = i.drag_move(&id, to).unwrap().unwrap();
    assert!(preview.handles.duration.x > handle.x);
    assert_eq!(i.context(&id).unwrap().cache.stats().inserts, inserts);
    assert_eq!(i.context(&id).unwrap().timing.duration, 1000.0);

    let (timing, report) = i.release(&id, to).unwrap().unwrap();
    // 60px of a 2200ms window over 600px is 220ms, shared by 2 iterations.
    assert!((timing.duration - 1110.0).abs() < 1e-6);
    assert!(!report.rasterized.is_empty());
    assert!((i.engine().timing(&id).unwrap().duration - 1110.0).abs() < 1e-6);
    assert!(i.release(&id, to).unwrap().is_none());
}

#[test]
fn press_reaches_baseline_handles_of_linear_easing() {
    let (mut i, id) = inspector(RenderMode::Curve);
    let l = i.easing_layout(&id).unwrap();
    assert_eq!(l.handles.delay, l.handles.control_point1);
    assert_eq!(i.press(&id, l.handles.delay).unwrap(), Some(HandleKind::Delay));
    i.cancel_drag(&id).unwrap();

    i.commit_timing(
        &id,
        TimingDescription {
            direction: Direction::Reverse,
            ..TimingDescription::new(0.0, 1000.0)
        },
    )
    .unwrap();
    let l = i.easing_layout(&id).unwrap();
    assert_eq!(l.handles.duration, l.handles.control_point1);
    assert_eq!(
        i.press(&id, l.handles.duration).unwrap(),
        Some(HandleKind::Duration)
    );
}

#[test]
fn release_far_outside_viewport_commits_clamped_timing() {
    let (mut i, id) = inspector(RenderMode::Curve);
    let handle = i.easing_layout(&id).unwrap().handles.delay;
    assert_eq!(i.press(&id, handle).unwrap(), Some(HandleKind::Delay));
    let (timing, _) = i
        .release(&id, Point::new(1e308, handle.y))
        .unwrap()
        .unwrap();
    assert!(timing.delay.is_finite() && timing.delay > 0.0);
    assert_eq!(i.engine().timing(&id).unwrap().delay, timing.delay);
}

#[test]
fn press_off_handles_does_nothing() {
    let (mut i, id) = inspector(RenderMode::Curve);
    assert_eq!(i.press(&id, Point::new(300.0, 50.0)).unwrap(), None);
    assert!(!i.context(&id).unwrap().editor.is_dragging());
}

#[test]
fn resize_mid_drag_keeps_timing() {
    let (mut i, id) = inspector(RenderMode::Curve);
    let handle = i.easing_layout(&id).unwrap().handles.delay;
    i.press_handle(&id, HandleKind::Delay, handle).unwrap();
    i.resize_easing_viewport(Viewport {
        width: 1200.0,
        height: 200.0,
    })
    .unwrap();
    assert!(i.context(&id).unwrap().editor.is_dragging());
    assert_eq!(i.context(&id).unwrap().timing, alternate_timing());
    i.cancel_drag(&id).unwrap();
    assert!(i.release(&id, Point::new(0.0, 0.0)).unwrap().is_none());
}

#[test]
fn observer_runs_until_total_time() {
    let (mut i, id) = inspector(RenderMode::Curve);
    let observer = i.replay(&id).unwrap();
    let mut frames = Vec::new();
    loop {
        let frame = observer.tick(&i).unwrap();
        let again = frame.reschedule;
        frames.push(frame);
        if !again {
            break;
        }
        i.engine_mut().advance(100.0);
    }
    assert_eq!(frames.len(), 21);
    assert_eq!(frames[0].throbber_fraction, 0.0);
    assert_eq!(frames[0].values[0], ("left".to_owned(), "0px".to_owned()));
    assert_eq!(frames[5].values[0].1, "50px");
    let last = frames.last().unwrap();
    assert!((last.throbber_fraction - 2000.0 / 2200.0).abs() < 1e-9);
}

#[test]
fn area_fill_adds_gradients() {
    let (mut i, id) = inspector(RenderMode::AreaFill);
    let ctx = i.context(&id).unwrap();
    assert!(ctx.cache.peek("color", LayerRole::Gradient).is_some());
    assert!(ctx.cache.peek("color", LayerRole::Curve).is_none());
    assert!(ctx.cache.peek("opacity", LayerRole::Gradient).is_some());
    assert!(ctx.cache.peek("opacity", LayerRole::Curve).is_some());

    let frame = i.composite(&id, Some("color")).unwrap();
    // Iteration 0 spans columns 0..272; its left edge is the first keyframe's red.
    let px = frame.pixel(1, 50).unwrap();
    assert!(px[0] > 240 && px[2] < 30);
    assert_eq!(frame.pixel(590, 50).unwrap(), [255, 255, 255, 255]);
}

#[test]
fn vanished_animations_are_dropped() {
    let (mut i, id) = inspector(RenderMode::Curve);
    assert!(i.register(id.clone()).is_err());
    i.engine_mut().remove(&id);
    assert!(i.discover().unwrap().is_empty());
    assert!(i.context(&id).is_err());
    assert!(i.unregister(&id).is_none());
}
