use crate::foundation::core::Canvas;
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::keyframes::color::ColorDef;
use crate::model::context::AnimationContext;
use crate::model::property::TrackedProperty;
use crate::raster::layer::RasterLayer;

/// One drawn column: a vertical segment from `top` down to the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSpan {
    pub x: u32,
    pub top: f64,
}

/// Timeline position sampled for pixel column `x`.
pub fn sample_time(x: u32, display_window: f64, width: u32) -> f64 {
    if width == 0 {
        return 0.0;
    }
    f64::from(x) * (display_window / f64::from(width))
}

/// Seek-then-read access to live computed values.
pub trait ColumnSampler {
    /// Move the timeline to absolute time `t` (ms).
    fn seek(&mut self, t: f64) -> TimewaveResult<()>;
    /// Height-axis scalar of `property` at the current position.
    fn read(&mut self, property: &str) -> TimewaveResult<f64>;
}

/// Per-property sampled scalars; a property whose read-back fails keeps its error.
#[derive(Debug)]
pub struct SampleTable {
    pub columns: u32,
    pub rows: Vec<(String, TimewaveResult<Vec<f64>>)>,
}

impl SampleTable {
    pub fn values(&self, property: &str) -> Option<&TimewaveResult<Vec<f64>>> {
        self.rows
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, v)| v)
    }
}

/// Walk the display window one pixel column at a time, seeking once per column and reading
/// every property. A failed read stops sampling that property only; a failed seek is fatal.
pub fn sample_properties(
    sampler: &mut dyn ColumnSampler,
    properties: &[&str],
    display_window: f64,
    width: u32,
) -> TimewaveResult<SampleTable> {
    let mut rows: Vec<(String, TimewaveResult<Vec<f64>>)> = properties
        .iter()
        .map(|p| ((*p).to_owned(), Ok(Vec::with_capacity(width as usize))))
        .collect();

    for x in 0..width {
        let t = sample_time(x, display_window, width);
        sampler.seek(t)?;
        for (name, row) in &mut rows {
            let Ok(values) = row else {
                continue;
            };
            match sampler.read(name) {
                Ok(v) => values.push(v),
                Err(err) => {
                    tracing::warn!(property = %name, t, %err, "read-back failed; dropping property");
                    *row = Err(err);
                }
            }
        }
    }

    Ok(SampleTable {
        columns: width,
        rows,
    })
}

/// Column spans for a property's samples. Non-finite samples leave their column empty.
pub fn curve_columns(property: &TrackedProperty, samples: &[f64], height: u32) -> Vec<ColumnSpan> {
    let h = f64::from(height);
    samples
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(x, &v)| ColumnSpan {
            x: x as u32,
            top: property.column_top(v, h),
        })
        .collect()
}

/// Draw column spans into a transparent layer.
pub fn draw_columns(
    spans: &[ColumnSpan],
    canvas: Canvas,
    color: ColorDef,
) -> TimewaveResult<RasterLayer> {
    let (w, h) = canvas_u16(canvas)?;
    let bottom = f64::from(canvas.height);

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    let [r, g, b, a] = color.to_rgba8_straight();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    for s in spans {
        let top = s.top.clamp(0.0, bottom);
        if top >= bottom || s.x >= canvas.width {
            continue;
        }
        let x = f64::from(s.x);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x, top, x + 1.0, bottom));
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    RasterLayer::from_premul_bytes(canvas, pixmap.data_as_u8_slice().to_vec())
}

/// Rasterize one property of `context`, calling `sample_at(t)` for every pixel column.
#[tracing::instrument(skip(context, sample_at), fields(animation = %context.id))]
pub fn rasterize<F>(
    context: &AnimationContext,
    property: &str,
    canvas: Canvas,
    color: ColorDef,
    mut sample_at: F,
) -> TimewaveResult<RasterLayer>
where
    F: FnMut(f64) -> TimewaveResult<f64>,
{
    canvas.validate()?;
    let tracked = context.property(property).ok_or_else(|| {
        TimewaveError::validation(format!("{} does not animate \"{property}\"", context.id))
    })?;
    let window = context.display_window();
    let samples = (0..canvas.width)
        .map(|x| sample_at(sample_time(x, window, canvas.width)))
        .collect::<TimewaveResult<Vec<f64>>>()?;
    draw_columns(
        &curve_columns(tracked, &samples, canvas.height),
        canvas,
        color,
    )
}

fn canvas_u16(canvas: Canvas) -> TimewaveResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| TimewaveError::render("layer width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| TimewaveError::render("layer height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/sampler.rs"]
mod tests;
