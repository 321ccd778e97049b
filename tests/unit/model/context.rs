use super::*;
use crate::timing::description::Iterations;

fn ctx() -> AnimationContext {
    AnimationContext::build(
        AnimationId::from_ordinal(1),
        TargetDesc {
            tag: "DIV".to_owned(),
            id: None,
            classes: vec!["box".to_owned(), "red".to_owned()],
        },
        TimingDescription {
            iterations: Iterations::Count(2),
            ..TimingDescription::new(0.0, 1000.0)
        },
        vec![
            Keyframe::new(0.0).with("left", "0px"),
            Keyframe::new(1.0).with("left", "100px"),
        ],
        TimeLayout::default(),
        200,
    )
    .unwrap()
}

#[test]
fn target_labels() {
    let c = ctx();
    assert_eq!(c.target.label(), "div.box.red");
    let with_id = TargetDesc {
        tag: "span".to_owned(),
        id: Some("hero".to_owned()),
        classes: vec!["ignored".to_owned()],
    };
    assert_eq!(with_id.label(), "span#hero");
}

#[test]
fn derived_times_and_ruler() {
    let c = ctx();
    assert_eq!(c.total_time(), 2000.0);
    assert!((c.display_window() - 2200.0).abs() < 1e-9);
    let labels = c.ruler_labels();
    assert_eq!(labels[0].value, 0.0);
    assert_eq!(labels[1].value, 1000.0);
    assert_eq!(labels[2].value, 2000.0);
    assert!((labels[2].fraction - 2000.0 / 2200.0).abs() < 1e-9);
}

#[test]
fn timing_edits_keep_property_ranges() {
    let mut c = ctx();
    let before = c.properties.clone();
    c.set_timing(TimingDescription::new(300.0, 50.0)).unwrap();
    assert_eq!(c.properties, before);
    assert_eq!(c.timing.delay, 300.0);
    assert!(c.set_timing(TimingDescription::new(-1.0, 50.0)).is_err());
    assert_eq!(c.timing.delay, 300.0);
}

#[test]
fn rejects_bad_keyframe_offsets() {
    let err = AnimationContext::build(
        AnimationId::new("a"),
        TargetDesc::default(),
        TimingDescription::new(0.0, 10.0),
        vec![Keyframe::new(0.9), Keyframe::new(0.1)],
        TimeLayout::default(),
        100,
    );
    assert!(err.is_err());
}
