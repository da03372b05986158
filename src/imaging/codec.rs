use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::{Matrix, Shape};
use crate::foundation::error::{MixerError, MixerResult};

/// Decode encoded image bytes into an 8-bit grayscale intensity matrix (`0.0..=255.0`).
///
/// Color inputs are converted to luma; any container the `image` crate was built with is
/// accepted.
pub fn decode_grayscale(bytes: &[u8]) -> MixerResult<Matrix> {
    if bytes.is_empty() {
        return Err(MixerError::decode("no image content provided"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| MixerError::decode(format!("decode image from memory: {e}")))?;
    let luma = dyn_img.to_luma8();
    let (width, height) = luma.dimensions();
    let shape = Shape::new(height as usize, width as usize)
        .map_err(|_| MixerError::decode("decoded image has zero size"))?;
    let data = luma.into_raw().into_iter().map(f64::from).collect();
    Matrix::from_vec(shape, data)
}

/// Encode an intensity matrix as an 8-bit grayscale PNG, clamping to `0..=255`.
pub fn encode_png_gray(m: &Matrix) -> MixerResult<Vec<u8>> {
    let bytes = m
        .as_slice()
        .iter()
        .map(|&v| v.clamp(0.0, 255.0).round() as u8)
        .collect();
    write_png(m.shape(), bytes)
}

/// Encode a display matrix (`0.0..=1.0`) as an 8-bit grayscale PNG.
pub fn display_to_png(m: &Matrix) -> MixerResult<Vec<u8>> {
    encode_png_gray(&m.map(|v| v * 255.0))
}

fn write_png(shape: Shape, bytes: Vec<u8>) -> MixerResult<Vec<u8>> {
    let width = u32::try_from(shape.width()).context("png width exceeds u32")?;
    let height = u32::try_from(shape.height()).context("png height exceeds u32")?;
    let img = image::GrayImage::from_raw(width, height, bytes)
        .ok_or_else(|| MixerError::validation("png buffer does not match shape"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode grayscale png")?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/codec.rs"]
mod tests;
