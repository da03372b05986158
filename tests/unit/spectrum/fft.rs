use super::*;
use crate::Shape;

fn ramp(height: usize, width: usize) -> Matrix {
    let shape = Shape::new(height, width).unwrap();
    let data = (0..shape.len())
        .map(|i| ((i * 37) % 251) as f64)
        .collect();
    Matrix::from_vec(shape, data).unwrap()
}

#[test]
fn dc_term_lands_at_center() {
    let m = Matrix::filled(Shape::new(4, 6).unwrap(), 2.0);
    let z = fft2_centered(&m, false);
    let w = z.shape().width();
    let dc = z.as_slice()[2 * w + 3];
    assert!((dc.re - 48.0).abs() < 1e-9);
    assert!(dc.im.abs() < 1e-9);
    let energy_elsewhere: f64 = z
        .as_slice()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 2 * w + 3)
        .map(|(_, v)| v.norm())
        .sum();
    assert!(energy_elsewhere < 1e-9);
}

#[test]
fn round_trip_recovers_input_for_odd_and_even_sizes() {
    for (h, w) in [(8, 8), (5, 7), (1, 9), (6, 3)] {
        let m = ramp(h, w);
        for parallel in [false, true] {
            let back = ifft2_centered(&fft2_centered(&m, parallel), parallel);
            for (a, b) in back.as_slice().iter().zip(m.as_slice()) {
                assert!((a.re - b).abs() < 1e-9, "{h}x{w}: {} vs {b}", a.re);
                assert!(a.im.abs() < 1e-9);
            }
        }
    }
}

#[test]
fn ifftshift_inverts_fftshift() {
    let m = ramp(5, 4);
    let z = ComplexMatrix::from_real(&m);
    assert_eq!(ifftshift(&fftshift(&z)), z);
}

#[test]
fn parallel_and_serial_agree() {
    let m = ramp(12, 10);
    let a = fft2_centered(&m, false);
    let b = fft2_centered(&m, true);
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert!((x - y).norm() < 1e-9);
    }
}
