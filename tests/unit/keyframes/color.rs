use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn parses_named_and_hex() {
    assert_eq!(
        ColorDef::parse_css("red").unwrap(),
        ColorDef::rgba(1.0, 0.0, 0.0, 1.0)
    );
    assert_eq!(
        ColorDef::parse_css("#00f").unwrap(),
        ColorDef::rgba(0.0, 0.0, 1.0, 1.0)
    );
    let c = ColorDef::parse_css("#1f77b488").unwrap();
    assert!(close(c.a, 136.0 / 255.0));
    assert!(ColorDef::parse_css("#12345").is_err());
    assert!(ColorDef::parse_css("chartreuse-ish").is_err());
}

#[test]
fn parses_functional_forms() {
    let c = ColorDef::parse_css("rgb(255, 128, 0)").unwrap();
    assert_eq!(c.to_rgba8_straight(), [255, 128, 0, 255]);
    let c = ColorDef::parse_css("rgba(0, 0, 255, 0.5)").unwrap();
    assert!(close(c.a, 0.5));
    let c = ColorDef::parse_css("rgb(0 0 255 / 50%)").unwrap();
    assert!(close(c.a, 0.5));
    let c = ColorDef::parse_css("hsl(120, 100%, 50%)").unwrap();
    assert_eq!(c.to_rgba8_straight(), [0, 255, 0, 255]);
}

#[test]
fn css_serialization_matches_computed_style_shape() {
    assert_eq!(
        ColorDef::rgba(1.0, 0.0, 0.0, 1.0).to_css(),
        "rgb(255, 0, 0)"
    );
    assert_eq!(
        ColorDef::rgba(0.0, 0.0, 1.0, 0.25).to_css(),
        "rgba(0, 0, 255, 0.25)"
    );
}

#[test]
fn hsl_of_primaries() {
    let (h, s, l) = ColorDef::parse_css("blue").unwrap().to_hsl();
    assert!(close(h, 240.0) && close(s, 100.0) && close(l, 50.0));
    let (h, s, l) = ColorDef::parse_css("gray").unwrap().to_hsl();
    assert!(close(h, 0.0) && close(s, 0.0));
    assert!(close(l, 128.0 / 255.0 * 100.0));
}

#[test]
fn hsl_sum_is_a_plain_sum() {
    let red = ColorDef::parse_css("red").unwrap();
    let blue = ColorDef::parse_css("blue").unwrap();
    assert!(close(red.hsl_sum(), 0.0 + 100.0 + 50.0));
    assert!(close(blue.hsl_sum(), 240.0 + 100.0 + 50.0));
}

#[test]
fn lerp_midpoint() {
    let a = ColorDef::rgba(0.0, 0.0, 0.0, 1.0);
    let b = ColorDef::rgba(1.0, 1.0, 1.0, 0.0);
    let m = ColorDef::lerp(a, b, 0.5);
    assert!(close(m.r, 0.5) && close(m.a, 0.5));
}
