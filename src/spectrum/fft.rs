use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::foundation::core::{ComplexMatrix, Matrix};

/// Forward 2-D DFT of `m` with the zero-frequency term moved to the center.
///
/// The result is unnormalized, matching the usual `fft2` convention.
#[tracing::instrument(skip(m), fields(shape = %m.shape()))]
pub fn fft2_centered(m: &Matrix, parallel: bool) -> ComplexMatrix {
    let mut z = ComplexMatrix::from_real(m);
    fft2_in_place(&mut z, FftDirection::Forward, parallel);
    fftshift(&z)
}

/// Inverse of [`fft2_centered`]: undo the centering shift, then inverse 2-D DFT scaled by
/// `1 / (height * width)`.
#[tracing::instrument(skip(z), fields(shape = %z.shape()))]
pub fn ifft2_centered(z: &ComplexMatrix, parallel: bool) -> ComplexMatrix {
    let mut out = ifftshift(z);
    fft2_in_place(&mut out, FftDirection::Inverse, parallel);
    let scale = 1.0 / out.shape().len() as f64;
    for v in out.as_mut_slice() {
        *v *= scale;
    }
    out
}

/// Move the zero-frequency term from `(0, 0)` to `(h / 2, w / 2)`.
pub fn fftshift(z: &ComplexMatrix) -> ComplexMatrix {
    let s = z.shape();
    roll(z, s.height() / 2, s.width() / 2)
}

/// Exact inverse of [`fftshift`], including odd dimensions.
pub fn ifftshift(z: &ComplexMatrix) -> ComplexMatrix {
    let s = z.shape();
    roll(z, s.height() - s.height() / 2, s.width() - s.width() / 2)
}

fn roll(z: &ComplexMatrix, shift_rows: usize, shift_cols: usize) -> ComplexMatrix {
    let shape = z.shape();
    let (height, width) = (shape.height(), shape.width());
    let src = z.as_slice();
    let mut out = z.clone();
    let dst = out.as_mut_slice();
    for r in 0..height {
        let dst_row = (r + shift_rows) % height;
        for c in 0..width {
            let dst_col = (c + shift_cols) % width;
            dst[dst_row * width + dst_col] = src[r * width + c];
        }
    }
    out
}

fn fft2_in_place(z: &mut ComplexMatrix, direction: FftDirection, parallel: bool) {
    let shape = z.shape();
    let (height, width) = (shape.height(), shape.width());
    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft(width, direction);
    let col_fft = planner.plan_fft(height, direction);

    process_rows(z.as_mut_slice(), width, &row_fft, parallel);

    let mut transposed = transpose(z.as_slice(), height, width);
    process_rows(&mut transposed, height, &col_fft, parallel);
    let restored = transpose(&transposed, width, height);
    z.as_mut_slice().copy_from_slice(&restored);
}

fn process_rows(data: &mut [Complex64], row_len: usize, fft: &Arc<dyn Fft<f64>>, parallel: bool) {
    let scratch_len = fft.get_inplace_scratch_len();
    let zero = Complex64::new(0.0, 0.0);
    if parallel {
        data.par_chunks_mut(row_len).for_each_init(
            || vec![zero; scratch_len],
            |scratch, row| fft.process_with_scratch(row, scratch),
        );
    } else {
        let mut scratch = vec![zero; scratch_len];
        for row in data.chunks_exact_mut(row_len) {
            fft.process_with_scratch(row, &mut scratch);
        }
    }
}

fn transpose(src: &[Complex64], height: usize, width: usize) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); src.len()];
    for r in 0..height {
        for c in 0..width {
            out[c * height + r] = src[r * width + c];
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/spectrum/fft.rs"]
mod tests;
