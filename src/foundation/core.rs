use std::fmt;
use std::str::FromStr;

use rustfft::num_complex::Complex64;

use crate::foundation::error::{MixerError, MixerResult};

/// Number of image slots a session can hold.
pub const MAX_SLOTS: usize = 4;

/// Index of an image slot (`0..MAX_SLOTS`).
pub type SlotIndex = usize;

/// Matrix dimensions, height first. Both are always non-zero.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "ShapeRepr")]
pub struct Shape {
    height: usize,
    width: usize,
}

#[derive(serde::Deserialize)]
struct ShapeRepr {
    height: usize,
    width: usize,
}

impl TryFrom<ShapeRepr> for Shape {
    type Error = MixerError;

    fn try_from(repr: ShapeRepr) -> Result<Self, Self::Error> {
        Shape::new(repr.height, repr.width)
    }
}

impl Shape {
    /// Build a shape; both dimensions must be non-zero.
    pub fn new(height: usize, width: usize) -> MixerResult<Self> {
        if height == 0 || width == 0 {
            return Err(MixerError::validation(format!(
                "shape must be non-empty, got {height}x{width}"
            )));
        }
        Ok(Self { height, width })
    }

    /// Number of rows.
    pub fn height(self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(self) -> usize {
        self.width
    }

    /// Per-axis minimum of `self` and `other`.
    pub fn min_axes(self, other: Shape) -> Shape {
        Shape {
            height: self.height.min(other.height),
            width: self.width.min(other.width),
        }
    }

    /// Total element count.
    pub fn len(self) -> usize {
        self.height * self.width
    }

    /// Always `false`; kept alongside [`len`](Self::len).
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Dense row-major `f64` matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    shape: Shape,
    data: Vec<f64>,
}

impl Matrix {
    /// Wrap a row-major buffer; `data.len()` must equal `shape.len()`.
    pub fn from_vec(shape: Shape, data: Vec<f64>) -> MixerResult<Self> {
        if data.len() != shape.len() {
            return Err(MixerError::validation(format!(
                "matrix buffer holds {} values, shape {shape} needs {}",
                data.len(),
                shape.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Build from nested rows. Rows must be non-empty and of equal length.
    pub fn from_rows(rows: &[Vec<f64>]) -> MixerResult<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let shape = Shape::new(height, width)?;
        if rows.iter().any(|r| r.len() != width) {
            return Err(MixerError::validation("matrix rows must have equal length"));
        }
        Ok(Self {
            shape,
            data: rows.concat(),
        })
    }

    /// Matrix of `shape` with every element set to `value`.
    pub fn filled(shape: Shape, value: f64) -> Self {
        Self {
            shape,
            data: vec![value; shape.len()],
        }
    }

    /// All-zero matrix.
    pub fn zeros(shape: Shape) -> Self {
        Self::filled(shape, 0.0)
    }

    /// All-one matrix.
    pub fn ones(shape: Shape) -> Self {
        Self::filled(shape, 1.0)
    }

    /// Matrix dimensions.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Element at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.shape.height || col >= self.shape.width {
            return None;
        }
        Some(self.data[row * self.shape.width + col])
    }

    /// Row-major view of the values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major view of the values.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume into the row-major buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Iterator over rows.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.shape.width)
    }

    /// Apply `f` to every element, producing a new matrix.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            shape: self.shape,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Smallest and largest element.
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Element-wise product in place.
    pub fn mul_assign(&mut self, other: &Matrix) -> MixerResult<()> {
        self.ensure_same_shape(other)?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a *= *b;
        }
        Ok(())
    }

    /// `self += other * scale`, element-wise.
    pub fn add_scaled(&mut self, other: &Matrix, scale: f64) -> MixerResult<()> {
        self.ensure_same_shape(other)?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += *b * scale;
        }
        Ok(())
    }

    fn ensure_same_shape(&self, other: &Matrix) -> MixerResult<()> {
        if self.shape != other.shape {
            return Err(MixerError::shape_mismatch(self.shape, other.shape));
        }
        Ok(())
    }
}

/// Dense row-major complex matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexMatrix {
    shape: Shape,
    data: Vec<Complex64>,
}

impl ComplexMatrix {
    /// Wrap a row-major buffer; `data.len()` must equal `shape.len()`.
    pub fn from_vec(shape: Shape, data: Vec<Complex64>) -> MixerResult<Self> {
        if data.len() != shape.len() {
            return Err(MixerError::validation(format!(
                "complex buffer holds {} values, shape {shape} needs {}",
                data.len(),
                shape.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Promote a real matrix (imaginary parts zero).
    pub fn from_real(m: &Matrix) -> Self {
        Self {
            shape: m.shape(),
            data: m.as_slice().iter().map(|&re| Complex64::new(re, 0.0)).collect(),
        }
    }

    /// Combine two real matrices as `re + i*im`.
    pub fn from_parts(re: &Matrix, im: &Matrix) -> MixerResult<Self> {
        if re.shape() != im.shape() {
            return Err(MixerError::shape_mismatch(re.shape(), im.shape()));
        }
        Ok(Self {
            shape: re.shape(),
            data: re
                .as_slice()
                .iter()
                .zip(im.as_slice())
                .map(|(&r, &i)| Complex64::new(r, i))
                .collect(),
        })
    }

    /// Combine magnitude and phase as `mag * exp(i*phase)`.
    pub fn from_polar(magnitude: &Matrix, phase: &Matrix) -> MixerResult<Self> {
        if magnitude.shape() != phase.shape() {
            return Err(MixerError::shape_mismatch(magnitude.shape(), phase.shape()));
        }
        Ok(Self {
            shape: magnitude.shape(),
            data: magnitude
                .as_slice()
                .iter()
                .zip(phase.as_slice())
                .map(|(&r, &theta)| Complex64::from_polar(r, theta))
                .collect(),
        })
    }

    /// Matrix dimensions.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Row-major view of the values.
    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    /// Mutable row-major view of the values.
    pub fn as_mut_slice(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    /// Project every element through `f` into a real matrix.
    pub fn project(&self, f: impl Fn(Complex64) -> f64) -> Matrix {
        Matrix {
            shape: self.shape,
            data: self.data.iter().map(|&z| f(z)).collect(),
        }
    }
}

/// One of the five representations of an image.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Spatial-domain intensities.
    Raw,
    /// `|z|` of the centered spectrum.
    Magnitude,
    /// `arg(z)` of the centered spectrum.
    Phase,
    /// `Re(z)` of the centered spectrum.
    Real,
    /// `Im(z)` of the centered spectrum.
    Imag,
}

impl ComponentKind {
    /// All kinds in declaration order.
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Raw,
        ComponentKind::Magnitude,
        ComponentKind::Phase,
        ComponentKind::Real,
        ComponentKind::Imag,
    ];

    /// Kinds whose display path applies `log(1 + |x|)` compression.
    pub fn is_spectral(self) -> bool {
        matches!(
            self,
            ComponentKind::Magnitude | ComponentKind::Real | ComponentKind::Imag
        )
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Raw => "raw",
            ComponentKind::Magnitude => "magnitude",
            ComponentKind::Phase => "phase",
            ComponentKind::Real => "real",
            ComponentKind::Imag => "imag",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| MixerError::validation(format!("unknown component kind '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
