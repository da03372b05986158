use crate::foundation::core::{ComponentKind, Matrix};

/// Map a component to the `[0, 1]` display range.
///
/// Spectral kinds are compressed with `log(1 + |x|)` first. Min-max normalization follows;
/// a flat input maps to all zeros. The input is consumed, so the log step can never be
/// applied twice to the same buffer.
pub fn to_display(data: Matrix, kind: ComponentKind) -> Matrix {
    let data = if kind.is_spectral() {
        data.map(|v| v.abs().ln_1p())
    } else {
        data
    };
    normalize_unit(&data)
}

/// Min-max normalize into `[0, 1]`, clamped; constant input yields zeros.
pub fn normalize_unit(data: &Matrix) -> Matrix {
    let (lo, hi) = data.min_max();
    if hi <= lo {
        return Matrix::zeros(data.shape());
    }
    let span = hi - lo;
    data.map(|v| ((v - lo) / span).clamp(0.0, 1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/display.rs"]
mod tests;
