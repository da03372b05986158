use std::sync::Arc;

use super::*;

fn gradient(height: usize, width: usize, scale: f64) -> Matrix {
    let shape = Shape::new(height, width).unwrap();
    let data = (0..shape.len())
        .map(|i| ((i % width) as f64 + (i / width) as f64) * scale)
        .collect();
    Matrix::from_vec(shape, data).unwrap()
}

#[test]
fn empty_store_reports_no_image() {
    let store = ImageStore::default();
    assert_eq!(store.cache_state(), CacheState::Empty);
    assert!(!store.is_loaded());
    assert_eq!(store.shape(), None);
    for kind in ComponentKind::ALL {
        assert!(matches!(
            store.get_component(kind),
            Err(MixerError::NoImageLoaded)
        ));
    }
}

#[test]
fn resize_on_empty_store_is_a_no_op() {
    let store = ImageStore::default();
    store.resize(Shape::new(4, 4).unwrap()).unwrap();
    assert_eq!(store.cache_state(), CacheState::Empty);
}

#[test]
fn state_machine_transitions() {
    let store = ImageStore::default();
    store.load(gradient(4, 4, 1.0)).unwrap();
    assert_eq!(store.cache_state(), CacheState::RawOnly);

    store.get_component(ComponentKind::Raw).unwrap();
    assert_eq!(store.cache_state(), CacheState::RawOnly);

    store.get_component(ComponentKind::Phase).unwrap();
    assert_eq!(store.cache_state(), CacheState::TransformComputed);

    store.resize(Shape::new(2, 2).unwrap()).unwrap();
    assert_eq!(store.cache_state(), CacheState::RawOnly);
    assert_eq!(store.shape(), Some(Shape::new(2, 2).unwrap()));
    assert_eq!(store.original_shape(), Some(Shape::new(4, 4).unwrap()));
}

#[test]
fn panicking_transform_keeps_the_pixels() {
    let pixels = gradient(4, 5, 2.0);
    let mut state = ImageState::RawOnly(Pixels {
        original: pixels.clone(),
        raw: pixels.clone(),
    });

    let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        fill_transform(&mut state, |_| panic!("transform failed")).map(|_| ())
    }));
    assert!(unwound.is_err());
    assert_eq!(state.cache_state(), CacheState::RawOnly);
    assert_eq!(state.pixels().map(|p| &p.raw), Some(&pixels));

    fill_transform(&mut state, |raw| fft::fft2_centered(raw, false)).unwrap();
    assert_eq!(state.cache_state(), CacheState::TransformComputed);
    assert_eq!(state.pixels().map(|p| &p.raw), Some(&pixels));
}

#[test]
fn raw_is_returned_as_a_copy() {
    let store = ImageStore::default();
    store.load(gradient(3, 3, 1.0)).unwrap();
    let mut copy = store.get_component(ComponentKind::Raw).unwrap();
    copy.as_mut_slice()[0] = 999.0;
    assert_eq!(
        store.get_component(ComponentKind::Raw).unwrap().as_slice()[0],
        0.0
    );
}

#[test]
fn derived_views_match_the_transform() {
    let store = ImageStore::default();
    store.load(gradient(5, 6, 3.0)).unwrap();
    let z = store.transform().unwrap();
    let mag = store.get_component(ComponentKind::Magnitude).unwrap();
    let phase = store.get_component(ComponentKind::Phase).unwrap();
    let re = store.get_component(ComponentKind::Real).unwrap();
    let im = store.get_component(ComponentKind::Imag).unwrap();
    for (i, c) in z.as_slice().iter().enumerate() {
        assert_eq!(mag.as_slice()[i], c.norm());
        assert_eq!(phase.as_slice()[i], c.arg());
        assert_eq!(re.as_slice()[i], c.re);
        assert_eq!(im.as_slice()[i], c.im);
    }
}

#[test]
fn load_invalidates_cached_magnitude() {
    let store = ImageStore::default();
    store.load(gradient(4, 4, 1.0)).unwrap();
    let before = store.get_component(ComponentKind::Magnitude).unwrap();

    store.load(gradient(4, 4, 2.0)).unwrap();
    let after = store.get_component(ComponentKind::Magnitude).unwrap();
    assert_ne!(before, after);

    let fresh = ImageStore::with_matrix(gradient(4, 4, 2.0), &MixerConfig::default()).unwrap();
    assert_eq!(after, fresh.get_component(ComponentKind::Magnitude).unwrap());
}

#[test]
fn resize_invalidates_every_derived_view() {
    let store = ImageStore::default();
    store.load(gradient(8, 8, 1.0)).unwrap();
    for kind in ComponentKind::ALL {
        assert_eq!(store.get_component(kind).unwrap().shape(), Shape::new(8, 8).unwrap());
    }
    let target = Shape::new(4, 6).unwrap();
    store.resize(target).unwrap();
    for kind in ComponentKind::ALL {
        assert_eq!(store.get_component(kind).unwrap().shape(), target);
    }
}

#[test]
fn resize_resamples_from_the_original() {
    let store = ImageStore::default();
    let original = gradient(8, 8, 1.0);
    store.load(original.clone()).unwrap();
    store.resize(Shape::new(2, 2).unwrap()).unwrap();
    store.resize(Shape::new(8, 8).unwrap()).unwrap();
    assert_eq!(store.get_component(ComponentKind::Raw).unwrap(), original);
}

#[test]
fn display_component_is_bounded_and_idempotent() {
    let store = ImageStore::default();
    store.load(gradient(6, 5, 10.0)).unwrap();
    for kind in ComponentKind::ALL {
        let a = store.get_display_component(kind).unwrap();
        let b = store.get_display_component(kind).unwrap();
        assert!(a.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
        let bits_a: Vec<u64> = a.as_slice().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.as_slice().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b, "{kind} display drifted between calls");
    }
}

#[test]
fn non_finite_pixels_are_rejected() {
    let store = ImageStore::default();
    let bad = Matrix::from_rows(&[vec![1.0, f64::NAN]]).unwrap();
    assert!(matches!(store.load(bad), Err(MixerError::Validation(_))));
    assert!(!store.is_loaded());
}

#[test]
fn failed_decode_leaves_previous_image() {
    let store = ImageStore::default();
    store.load(gradient(2, 2, 1.0)).unwrap();
    assert!(matches!(
        store.load_encoded(b"junk"),
        Err(MixerError::Decode(_))
    ));
    assert_eq!(store.shape(), Some(Shape::new(2, 2).unwrap()));
}

#[test]
fn concurrent_readers_see_consistent_components() {
    let store = Arc::new(ImageStore::default());
    store.load(gradient(16, 16, 1.0)).unwrap();
    let expected = {
        let reference =
            ImageStore::with_matrix(gradient(16, 16, 1.0), &MixerConfig::default()).unwrap();
        reference.get_component(ComponentKind::Magnitude).unwrap()
    };

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.get_component(ComponentKind::Magnitude).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
