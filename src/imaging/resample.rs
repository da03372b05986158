use anyhow::Context;
use image::{ImageBuffer, Luma};

use crate::foundation::config::ResampleFilter;
use crate::foundation::core::{Matrix, Shape};
use crate::foundation::error::{MixerError, MixerResult};

/// Resample `src` to `target` with `filter`.
///
/// Output values are clamped to the value range of `src` so ringing from the Lanczos lobes
/// never produces intensities the source could not.
pub fn resample(src: &Matrix, target: Shape, filter: ResampleFilter) -> MixerResult<Matrix> {
    if src.shape() == target {
        return Ok(src.clone());
    }
    let (lo, hi) = src.min_max();
    if hi <= lo {
        return Ok(Matrix::filled(target, lo));
    }
    let src_w = u32::try_from(src.shape().width()).context("source width exceeds u32")?;
    let src_h = u32::try_from(src.shape().height()).context("source height exceeds u32")?;
    let dst_w = u32::try_from(target.width()).context("target width exceeds u32")?;
    let dst_h = u32::try_from(target.height()).context("target height exceeds u32")?;

    // Float buffers are resampled in the unit range, so scale into it and back out.
    let span = hi - lo;
    let pixels: Vec<f32> = src
        .as_slice()
        .iter()
        .map(|&v| ((v - lo) / span) as f32)
        .collect();
    let buf: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(src_w, src_h, pixels)
        .ok_or_else(|| MixerError::validation("resample buffer does not match shape"))?;

    let resized = image::imageops::resize(&buf, dst_w, dst_h, filter.to_image_filter());
    let data = resized
        .into_raw()
        .into_iter()
        .map(|v| (lo + f64::from(v) * span).clamp(lo, hi))
        .collect();
    Matrix::from_vec(target, data)
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/resample.rs"]
mod tests;
