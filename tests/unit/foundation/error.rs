use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(MixerError::decode("x").to_string().contains("decode error:"));
    assert!(MixerError::job("x").to_string().contains("job error:"));
    assert!(
        MixerError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        MixerError::NoImageLoaded
            .to_string()
            .contains("no image loaded")
    );
    assert!(
        MixerError::EmptyImageSet
            .to_string()
            .contains("empty image set")
    );
}

#[test]
fn shape_mismatch_names_both_shapes() {
    let err = MixerError::shape_mismatch(Shape::new(4, 8).unwrap(), Shape::new(2, 2).unwrap());
    let msg = err.to_string();
    assert!(msg.starts_with("shape mismatch:"));
    assert!(msg.contains("4x8"));
    assert!(msg.contains("2x2"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MixerError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
