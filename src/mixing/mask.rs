use crate::foundation::core::{Matrix, Shape};

/// Rectangle in pixel coordinates, bounds inclusive. Corners may arrive in any order and
/// outside the image; [`create_mask`] clamps and orders them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// First corner column.
    pub x1: i64,
    /// First corner row.
    pub y1: i64,
    /// Second corner column.
    pub x2: i64,
    /// Second corner row.
    pub y2: i64,
}

impl Rect {
    /// Rectangle from two corners.
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Same rectangle with `x1 <= x2` and `y1 <= y2`.
    pub fn normalized(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }
}

/// Binary weighting matrix for frequency gating.
///
/// Without a rectangle every element is `1.0`. Otherwise the rectangle (clamped into the
/// matrix, bounds inclusive) is `1.0` on an all-zero background when `is_inner`, or `0.0` on
/// an all-one background when not. With DC-centered spectra, inner keeps low frequencies.
pub fn create_mask(shape: Shape, rect: Option<Rect>, is_inner: bool) -> Matrix {
    let Some(rect) = rect else {
        return Matrix::ones(shape);
    };
    // Clamping is monotonic, so ordering first gives the same box as ordering after.
    let rect = rect.normalized();
    let clamp = |v: i64, len: usize| v.clamp(0, len as i64 - 1) as usize;
    let (x1, x2) = (clamp(rect.x1, shape.width()), clamp(rect.x2, shape.width()));
    let (y1, y2) = (clamp(rect.y1, shape.height()), clamp(rect.y2, shape.height()));

    let (inside, outside) = if is_inner { (1.0, 0.0) } else { (0.0, 1.0) };
    let mut mask = Matrix::filled(shape, outside);
    let width = shape.width();
    let data = mask.as_mut_slice();
    for row in y1..=y2 {
        data[row * width + x1..=row * width + x2].fill(inside);
    }
    mask
}

/// Remembers the last drawn rectangle and polarity, and builds masks from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSelection {
    rect: Option<Rect>,
    is_inner: bool,
}

impl Default for RegionSelection {
    fn default() -> Self {
        Self {
            rect: None,
            is_inner: true,
        }
    }
}

impl RegionSelection {
    /// No rectangle, inner polarity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `rect`, stored with ordered corners.
    pub fn set_rectangle(&mut self, rect: Rect) {
        self.rect = Some(rect.normalized());
    }

    /// Forget the rectangle; masks become all-ones.
    pub fn clear_rectangle(&mut self) {
        self.rect = None;
    }

    /// Select the inner (`true`) or outer (`false`) region.
    pub fn set_inner(&mut self, is_inner: bool) {
        self.is_inner = is_inner;
    }

    /// Stored rectangle.
    pub fn rectangle(&self) -> Option<Rect> {
        self.rect
    }

    /// Current polarity.
    pub fn is_inner(&self) -> bool {
        self.is_inner
    }

    /// Whether a rectangle is stored.
    pub fn has_rectangle(&self) -> bool {
        self.rect.is_some()
    }

    /// Mask for `shape` from the stored rectangle and polarity.
    pub fn mask_for(&self, shape: Shape) -> Matrix {
        create_mask(shape, self.rect, self.is_inner)
    }

    /// One-line summary for status displays.
    pub fn describe(&self) -> String {
        let mode = if self.is_inner {
            "Inner (Low Frequencies)"
        } else {
            "Outer (High Frequencies)"
        };
        match self.rect {
            None => format!("No region selected (using full image), Mode: {mode}"),
            Some(r) => format!(
                "Region: {}x{} pixels, Mode: {mode}",
                r.x2 - r.x1,
                r.y2 - r.y1
            ),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mixing/mask.rs"]
mod tests;
