use super::*;

#[test]
fn shape_rejects_zero_dimensions() {
    assert!(Shape::new(0, 4).is_err());
    assert!(Shape::new(4, 0).is_err());
    let s = Shape::new(3, 5).unwrap();
    assert_eq!(s.len(), 15);
    assert_eq!(s.to_string(), "3x5");
}

#[test]
fn shape_accessors_and_per_axis_min() {
    let a = Shape::new(3, 8).unwrap();
    let b = Shape::new(5, 2).unwrap();
    assert_eq!((a.height(), a.width()), (3, 8));
    assert_eq!(a.min_axes(b), Shape::new(3, 2).unwrap());
    assert!(!a.is_empty());
}

#[test]
fn deserialized_shape_must_be_non_zero() {
    let s: Shape = serde_json::from_str(r#"{"height":2,"width":3}"#).unwrap();
    assert_eq!(s, Shape::new(2, 3).unwrap());
    assert!(serde_json::from_str::<Shape>(r#"{"height":0,"width":4}"#).is_err());
    assert!(serde_json::from_str::<Shape>(r#"{"height":4,"width":0}"#).is_err());
}

#[test]
fn single_row_and_column_matrices_iterate_rows() {
    let row = Matrix::filled(Shape::new(1, 5).unwrap(), 2.0);
    assert_eq!(row.rows().count(), 1);
    assert_eq!(row.rows().next().map(<[f64]>::len), Some(5));

    let column = Matrix::filled(Shape::new(4, 1).unwrap(), 2.0);
    assert_eq!(column.rows().count(), 4);
    assert!(column.rows().all(|r| r == [2.0]));
}

#[test]
fn matrix_from_rows_is_row_major() {
    let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    assert_eq!(m.shape(), Shape::new(2, 3).unwrap());
    assert_eq!(m.get(1, 0), Some(4.0));
    assert_eq!(m.get(0, 2), Some(3.0));
    assert_eq!(m.get(2, 0), None);
    assert_eq!(m.rows().count(), 2);
}

#[test]
fn matrix_from_rows_rejects_ragged_input() {
    assert!(Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
    assert!(Matrix::from_rows(&[]).is_err());
}

#[test]
fn matrix_from_vec_checks_length() {
    let shape = Shape::new(2, 2).unwrap();
    assert!(Matrix::from_vec(shape, vec![0.0; 3]).is_err());
    assert!(Matrix::from_vec(shape, vec![0.0; 4]).is_ok());
}

#[test]
fn elementwise_ops_require_equal_shapes() {
    let mut a = Matrix::filled(Shape::new(2, 2).unwrap(), 2.0);
    let b = Matrix::filled(Shape::new(2, 2).unwrap(), 3.0);
    a.mul_assign(&b).unwrap();
    assert!(a.as_slice().iter().all(|&v| v == 6.0));
    a.add_scaled(&b, 0.5).unwrap();
    assert!(a.as_slice().iter().all(|&v| v == 7.5));

    let c = Matrix::ones(Shape::new(1, 4).unwrap());
    assert!(matches!(
        a.mul_assign(&c),
        Err(MixerError::ShapeMismatch { .. })
    ));
}

#[test]
fn min_max_and_map() {
    let m = Matrix::from_rows(&[vec![-1.0, 4.0], vec![2.5, 0.0]]).unwrap();
    assert_eq!(m.min_max(), (-1.0, 4.0));
    let doubled = m.map(|v| v * 2.0);
    assert_eq!(doubled.min_max(), (-2.0, 8.0));
}

#[test]
fn complex_from_polar_matches_parts() {
    let mag = Matrix::from_rows(&[vec![2.0, 1.0]]).unwrap();
    let phase = Matrix::from_rows(&[vec![0.0, std::f64::consts::FRAC_PI_2]]).unwrap();
    let z = ComplexMatrix::from_polar(&mag, &phase).unwrap();
    let re = z.project(|c| c.re);
    let im = z.project(|c| c.im);
    assert!((re.as_slice()[0] - 2.0).abs() < 1e-12);
    assert!(re.as_slice()[1].abs() < 1e-12);
    assert!((im.as_slice()[1] - 1.0).abs() < 1e-12);
}

#[test]
fn component_kind_parses_and_classifies() {
    assert_eq!(
        "magnitude".parse::<ComponentKind>().unwrap(),
        ComponentKind::Magnitude
    );
    assert_eq!(" IMAG ".parse::<ComponentKind>().unwrap(), ComponentKind::Imag);
    assert!("hue".parse::<ComponentKind>().is_err());

    assert!(ComponentKind::Magnitude.is_spectral());
    assert!(ComponentKind::Real.is_spectral());
    assert!(ComponentKind::Imag.is_spectral());
    assert!(!ComponentKind::Phase.is_spectral());
    assert!(!ComponentKind::Raw.is_spectral());
}
