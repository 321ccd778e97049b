use super::*;
use crate::timing::description::{Direction, FillMode, Iterations};
use crate::timing::easing::{EasingCurve, EasingPreset};

fn viewport() -> Viewport {
    Viewport::new(220.0, 100.0).unwrap()
}

fn timing(direction: Direction, iterations: u32, easing: EasingPreset) -> TimingDescription {
    TimingDescription {
        iterations: Iterations::Count(iterations),
        direction,
        easing: EasingCurve::Preset(easing),
        ..TimingDescription::new(0.0, 1000.0)
    }
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn presets_round_trip_through_screen_space() {
    for direction in [
        Direction::Normal,
        Direction::Reverse,
        Direction::Alternate,
        Direction::AlternateReverse,
    ] {
        for preset in EasingPreset::ALL {
            let t = timing(direction, 2, preset);
            let l = layout(&t, viewport(), TimeLayout::default()).unwrap();
            let (x0, w) = l.first_slot();
            let fwd = l.first_iteration_forwards();
            let (x1, y1) =
                screen_to_control_point(l.handles.control_point1, x0, w, 100.0, fwd).unwrap();
            let (x2, y2) =
                screen_to_control_point(l.handles.control_point2, x0, w, 100.0, fwd).unwrap();
            let cp = preset.control_points();
            assert_close(x1, cp.x1);
            assert_close(y1, cp.y1);
            assert_close(x2, cp.x2);
            assert_close(y2, cp.y2);
        }
    }
}

#[test]
fn alternate_two_iterations_end_to_end() {
    let t = timing(Direction::Alternate, 2, EasingPreset::Linear);
    assert_close(t.display_window(TimeLayout::default()), 2200.0);

    let l = layout(&t, viewport(), TimeLayout::default()).unwrap();
    assert_eq!(l.displayed_iterations, 2);
    assert_eq!(l.segments.len(), 2);
    assert!(l.segments[0].forwarding);
    assert!(!l.segments[1].forwarding);
    assert_close(l.px_per_ms, 0.1);

    // iteration 0 rises from the baseline, iteration 1 falls back.
    assert_eq!(l.segments[0].start, Point::new(0.0, 100.0));
    assert_eq!(l.segments[0].end, Point::new(100.0, 0.0));
    assert_eq!(l.segments[1].start, Point::new(100.0, 0.0));
    assert_eq!(l.segments[1].end, Point::new(200.0, 100.0));
    assert_eq!(l.handles.duration, Point::new(200.0, 100.0));
}

#[test]
fn control_points_use_slot_width_and_flipped_y() {
    let t = timing(Direction::Normal, 1, EasingPreset::EaseIn);
    let l = layout(&t, viewport(), TimeLayout::default()).unwrap();
    // window = 1100ms over 220 units -> the slot is 200 wide.
    let seg = l.segments[0];
    assert_close(seg.cp1.x, 200.0 * 0.42);
    assert_close(seg.cp1.y, 100.0);
    assert_close(seg.cp2.x, 200.0);
    assert_close(seg.cp2.y, 0.0);
}

#[test]
fn mirrored_iteration_reflects_handles_in_time() {
    let t = timing(Direction::Reverse, 1, EasingPreset::EaseIn);
    let l = layout(&t, viewport(), TimeLayout::default()).unwrap();
    let seg = l.segments[0];
    assert!(!seg.forwarding);
    assert_eq!(seg.start, Point::new(0.0, 0.0));
    assert_eq!(seg.end, Point::new(200.0, 100.0));
    // P1' = (1 - x2, y2), P2' = (1 - x1, y1)
    assert_close(seg.cp1.x, 0.0);
    assert_close(seg.cp1.y, 0.0);
    assert_close(seg.cp2.x, 200.0 * (1.0 - 0.42));
    assert_close(seg.cp2.y, 100.0);
    assert_eq!(l.handles.control_point1, seg.cp2);
}

#[test]
fn iterations_occupy_delay_offset_slots() {
    let t = TimingDescription {
        delay: 500.0,
        iterations: Iterations::Count(3),
        ..TimingDescription::new(0.0, 1000.0)
    };
    let l = layout(&t, Viewport::new(385.0, 50.0).unwrap(), TimeLayout::default()).unwrap();
    // window = (3000 + 500) * 1.1 = 3850
    assert_close(l.px_per_ms, 0.1);
    let expect = [(50.0, 150.0), (150.0, 250.0), (250.0, 350.0)];
    for (seg, (x0, x1)) in l.segments.iter().zip(expect) {
        assert!((seg.start.x - x0).abs() < 1e-6);
        assert!((seg.end.x - x1).abs() < 1e-6);
    }
    assert!((l.handles.delay.x - 50.0).abs() < 1e-6);
    assert_eq!(l.handles.delay.y, 50.0);
}

#[test]
fn infinite_iterations_are_clamped_for_layout() {
    let t = TimingDescription {
        iterations: Iterations::Infinite,
        ..TimingDescription::new(0.0, 100.0)
    };
    let l = layout(&t, viewport(), TimeLayout::default()).unwrap();
    assert_eq!(l.segments.len(), 3);
    assert_eq!(t.iterations, Iterations::Infinite);
}

#[test]
fn backwards_fill_only_when_first_iteration_is_mirrored() {
    let base = TimingDescription {
        delay: 200.0,
        fill: FillMode::Backwards,
        ..TimingDescription::new(0.0, 1000.0)
    };
    let l = layout(&base, viewport(), TimeLayout::default()).unwrap();
    assert!(l.fill_backwards.is_none());

    let mirrored = TimingDescription {
        direction: Direction::Reverse,
        ..base
    };
    let l = layout(&mirrored, viewport(), TimeLayout::default()).unwrap();
    let fill = l.fill_backwards.unwrap();
    assert_eq!(fill.from, Point::new(0.0, 0.0));
    assert_eq!(fill.to, l.segments[0].start);

    let no_delay = TimingDescription {
        delay: 0.0,
        ..mirrored
    };
    let l = layout(&no_delay, viewport(), TimeLayout::default()).unwrap();
    assert!(l.fill_backwards.is_none());
}

#[test]
fn forwards_fill_only_for_real_last_iteration() {
    let t = TimingDescription {
        fill: FillMode::Forwards,
        iterations: Iterations::Count(2),
        ..TimingDescription::new(0.0, 1000.0)
    };
    let l = layout(&t, viewport(), TimeLayout::default()).unwrap();
    let fill = l.fill_forwards.unwrap();
    assert_eq!(fill.from, Point::new(200.0, 0.0));
    assert_eq!(fill.to, Point::new(220.0, 0.0));

    let ends_low = TimingDescription {
        direction: Direction::Alternate,
        ..t
    };
    let l = layout(&ends_low, viewport(), TimeLayout::default()).unwrap();
    assert!(l.fill_forwards.is_none());

    let endless = TimingDescription {
        iterations: Iterations::Infinite,
        ..t
    };
    let l = layout(&endless, viewport(), TimeLayout::default()).unwrap();
    assert!(l.fill_forwards.is_none());

    let clamped = TimingDescription {
        iterations: Iterations::Count(7),
        ..t
    };
    let l = layout(&clamped, viewport(), TimeLayout::default()).unwrap();
    assert!(l.fill_forwards.is_none());
}

#[test]
fn invalid_timing_is_rejected_before_layout() {
    let t = TimingDescription::new(0.0, -5.0);
    assert!(layout(&t, viewport(), TimeLayout::default()).is_err());
}

#[test]
fn zero_length_timing_collapses_without_nan() {
    let t = TimingDescription::new(0.0, 0.0);
    let l = layout(&t, viewport(), TimeLayout::default()).unwrap();
    assert_eq!(l.px_per_ms, 0.0);
    for seg in &l.segments {
        assert!(seg.cp1.x.is_finite() && seg.cp2.x.is_finite());
    }
    assert!(screen_to_control_point(l.handles.control_point1, 0.0, 0.0, 100.0, true).is_none());
}

#[test]
fn outline_and_area_paths() {
    let t = timing(Direction::Alternate, 2, EasingPreset::Linear);
    let l = layout(&t, viewport(), TimeLayout::default()).unwrap();
    let svg = l.to_svg_path();
    assert!(svg.starts_with('M'));
    assert_eq!(svg.matches('C').count(), 2);

    let area = l.area();
    let last = area.elements().last().copied();
    assert_eq!(last, Some(kurbo::PathEl::ClosePath));
}
