use super::*;
use crate::foundation::core::Shape;

#[test]
fn flat_input_maps_to_zeros() {
    let m = Matrix::filled(Shape::new(3, 3).unwrap(), 42.0);
    let out = to_display(m, ComponentKind::Raw);
    assert!(out.as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn raw_is_linear_min_max() {
    let m = Matrix::from_rows(&[vec![10.0, 20.0, 30.0]]).unwrap();
    let out = to_display(m, ComponentKind::Raw);
    assert_eq!(out.as_slice(), &[0.0, 0.5, 1.0]);
}

#[test]
fn spectral_kinds_are_log_compressed() {
    let m = Matrix::from_rows(&[vec![0.0, (1.0f64).exp_m1(), (2.0f64).exp_m1()]]).unwrap();
    let out = to_display(m, ComponentKind::Magnitude);
    for (got, want) in out.as_slice().iter().zip([0.0, 0.5, 1.0]) {
        assert!((got - want).abs() < 1e-12);
    }
}

#[test]
fn negative_spectral_values_use_absolute_value() {
    let m = Matrix::from_rows(&[vec![-3.0, 0.0, 3.0]]).unwrap();
    let out = to_display(m, ComponentKind::Imag);
    assert_eq!(out.as_slice()[0], out.as_slice()[2]);
    assert_eq!(out.as_slice()[1], 0.0);
}

#[test]
fn phase_is_not_log_compressed() {
    let m = Matrix::from_rows(&[vec![-std::f64::consts::PI, 0.0, std::f64::consts::PI]]).unwrap();
    let out = to_display(m, ComponentKind::Phase);
    assert_eq!(out.as_slice(), &[0.0, 0.5, 1.0]);
}
