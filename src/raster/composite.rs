use rayon::prelude::*;

use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::foundation::math::mul_div255_u8;
use crate::raster::layer::RasterLayer;

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> TimewaveResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TimewaveError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// A cached layer as stored: either decoded pixels or an encoded PNG still to decode.
#[derive(Clone, Debug)]
pub enum LayerSource {
    Ready(RasterLayer),
    Encoded(Vec<u8>),
}

impl LayerSource {
    pub fn decode(self) -> TimewaveResult<RasterLayer> {
        match self {
            Self::Ready(layer) => Ok(layer),
            Self::Encoded(bytes) => RasterLayer::decode_png(&bytes),
        }
    }
}

/// Decode every source in parallel. Results come back in input order whatever order the
/// individual decodes finish in.
pub fn decode_ordered(
    sources: Vec<(String, LayerSource)>,
) -> Vec<(String, TimewaveResult<RasterLayer>)> {
    sources
        .into_par_iter()
        .map(|(name, src)| (name, src.decode()))
        .collect()
}

/// Composite `layers` in order over a `background` fill.
///
/// With `focus`, only that property's layer is drawn.
pub fn compose(
    canvas: Canvas,
    background: Rgba8Premul,
    layers: &[(&str, &RasterLayer)],
    focus: Option<&str>,
) -> TimewaveResult<RasterLayer> {
    canvas.validate()?;
    let mut frame = RasterLayer::filled(canvas, background);

    if let Some(name) = focus
        && !layers.iter().any(|(n, _)| *n == name)
    {
        return Err(TimewaveError::validation(format!(
            "focus property \"{name}\" has no layer"
        )));
    }

    for (name, layer) in layers {
        if focus.is_some_and(|f| f != *name) {
            continue;
        }
        if layer.canvas() != canvas {
            return Err(TimewaveError::render(format!(
                "layer \"{name}\" is {}x{}, frame is {}x{}",
                layer.width, layer.height, canvas.width, canvas.height
            )));
        }
        over_in_place(&mut frame.data, &layer.data, 1.0)?;
    }
    Ok(frame)
}

/// Decode then composite, skipping layers that fail to decode.
#[tracing::instrument(skip(sources, background))]
pub fn compose_sources(
    canvas: Canvas,
    background: Rgba8Premul,
    sources: Vec<(String, LayerSource)>,
    focus: Option<&str>,
) -> TimewaveResult<RasterLayer> {
    let decoded = decode_ordered(sources);
    let mut ready = Vec::with_capacity(decoded.len());
    for (name, res) in &decoded {
        match res {
            Ok(layer) => ready.push((name.as_str(), layer)),
            Err(err) => tracing::warn!(property = %name, %err, "layer decode failed; skipping"),
        }
    }
    compose(canvas, background, &ready, focus)
}

/// Stack equally wide frames top to bottom into one image.
pub fn stack_rows(frames: &[RasterLayer]) -> TimewaveResult<RasterLayer> {
    let Some(first) = frames.first() else {
        return Err(TimewaveError::render("nothing to stack"));
    };
    let width = first.width;
    let mut height = 0u32;
    let mut data = Vec::new();
    for f in frames {
        if f.width != width {
            return Err(TimewaveError::render(format!(
                "cannot stack a {}px wide frame under a {width}px one",
                f.width
            )));
        }
        height += f.height;
        data.extend_from_slice(&f.data);
    }
    RasterLayer::from_premul_bytes(Canvas { width, height }, data)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
