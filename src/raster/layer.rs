use std::io::Cursor;

use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{TimewaveError, TimewaveResult};

/// A rasterized property layer (or composited frame) as RGBA8 pixels.
///
/// Pixels are **premultiplied alpha**, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterLayer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RasterLayer {
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.byte_len()],
        }
    }

    pub fn filled(canvas: Canvas, color: Rgba8Premul) -> Self {
        let mut data = Vec::with_capacity(canvas.byte_len());
        for _ in 0..(canvas.width as usize) * (canvas.height as usize) {
            data.extend_from_slice(&color.to_array());
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    pub fn from_premul_bytes(canvas: Canvas, data: Vec<u8>) -> TimewaveResult<Self> {
        if data.len() != canvas.byte_len() {
            return Err(TimewaveError::render(format!(
                "layer byte len {} does not match {}x{}",
                data.len(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data,
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Straight-alpha RGBA8 copy, for image encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Encode as a PNG bitmap that can be cached or handed to another compositor.
    pub fn encode_png(&self) -> TimewaveResult<Vec<u8>> {
        use image::ImageEncoder as _;

        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(Cursor::new(&mut out))
            .write_image(
                &self.to_straight_rgba8(),
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| TimewaveError::render(format!("png encode: {e}")))?;
        Ok(out)
    }

    pub fn decode_png(bytes: &[u8]) -> TimewaveResult<Self> {
        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| TimewaveError::render(format!("png decode: {e}")))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let mut data = img.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul_bytes(Canvas { width, height }, data)
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
