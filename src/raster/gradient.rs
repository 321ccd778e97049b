use crate::foundation::core::Canvas;
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::keyframes::color::ColorDef;
use crate::keyframes::{Keyframe, numberize};
use crate::raster::layer::RasterLayer;

/// A stop placed at a keyframe's normalized offset.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GradientStop {
    pub offset: f64,
    /// The keyframe literal the stop was built from.
    pub literal: String,
    pub color: ColorDef,
}

/// Horizontal gradient; stops are sorted by offset and never synthesized between keyframes.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct GradientSpec {
    pub stops: Vec<GradientStop>,
}

impl GradientSpec {
    /// Color at normalized position `t`. Positions outside the stops take the nearest end color.
    pub fn color_at(&self, t: f64) -> Option<ColorDef> {
        let first = self.stops.first()?;
        let last = self.stops.last()?;
        if t <= first.offset {
            return Some(first.color);
        }
        if t >= last.offset {
            return Some(last.color);
        }
        let i = self.stops.iter().rposition(|s| s.offset <= t)?;
        let a = &self.stops[i];
        let b = self.stops.get(i + 1).unwrap_or(a);
        let span = b.offset - a.offset;
        if span <= 0.0 {
            return Some(b.color);
        }
        Some(ColorDef::lerp(a.color, b.color, (t - a.offset) / span))
    }
}

/// Stops for a color-valued property, one per declaring keyframe, colored with its literal.
pub fn color_gradient(keyframes: &[Keyframe], property: &str) -> TimewaveResult<GradientSpec> {
    let mut stops = Vec::new();
    for kf in keyframes {
        let Some(literal) = kf.value(property) else {
            continue;
        };
        stops.push(GradientStop {
            offset: kf.computed_offset(),
            literal: literal.to_owned(),
            color: ColorDef::parse_css(literal)?,
        });
    }
    finish(stops, property)
}

/// Stops for `opacity`: `tint` with its alpha replaced by each keyframe's opacity value.
pub fn opacity_gradient(
    keyframes: &[Keyframe],
    property: &str,
    tint: ColorDef,
) -> TimewaveResult<GradientSpec> {
    let mut stops = Vec::new();
    for kf in keyframes {
        let Some(literal) = kf.value(property) else {
            continue;
        };
        let alpha = literal
            .trim()
            .parse::<f64>()
            .ok()
            .or_else(|| numberize(literal))
            .ok_or_else(|| {
                TimewaveError::validation(format!("{property}: \"{literal}\" is not a number"))
            })?;
        stops.push(GradientStop {
            offset: kf.computed_offset(),
            literal: literal.to_owned(),
            color: ColorDef {
                a: alpha.clamp(0.0, 1.0),
                ..tint
            },
        });
    }
    finish(stops, property)
}

fn finish(mut stops: Vec<GradientStop>, property: &str) -> TimewaveResult<GradientSpec> {
    if stops.is_empty() {
        return Err(TimewaveError::validation(format!(
            "no keyframe declares \"{property}\""
        )));
    }
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    Ok(GradientSpec { stops })
}

/// Fill columns `[x_start, x_end)` with the gradient mapped across that span.
///
/// Colors are evaluated once per column; every row of a column gets the same pixel.
pub fn draw_gradient(
    spec: &GradientSpec,
    canvas: Canvas,
    x_start: f64,
    x_end: f64,
) -> TimewaveResult<RasterLayer> {
    canvas.validate()?;
    let mut layer = RasterLayer::transparent(canvas);
    let span = x_end - x_start;
    if span.is_nan() || span <= 0.0 {
        return Ok(layer);
    }

    let w = canvas.width as usize;
    let first = x_start.max(0.0).floor() as usize;
    let last = (x_end.ceil().max(0.0) as usize).min(w);
    for x in first..last {
        let t = ((x as f64 + 0.5 - x_start) / span).clamp(0.0, 1.0);
        let Some(color) = spec.color_at(t) else {
            return Ok(layer);
        };
        let px = color.to_rgba8_premul().to_array();
        for y in 0..canvas.height as usize {
            let idx = (y * w + x) * 4;
            layer.data[idx..idx + 4].copy_from_slice(&px);
        }
    }
    Ok(layer)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/gradient.rs"]
mod tests;
