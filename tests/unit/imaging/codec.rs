use super::*;

fn png_bytes_rgb(width: u32, height: u32, px: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_converts_color_to_luma() {
    let bytes = png_bytes_rgb(3, 2, [200, 200, 200]);
    let m = decode_grayscale(&bytes).unwrap();
    assert_eq!(m.shape(), Shape::new(2, 3).unwrap());
    assert!(m.as_slice().iter().all(|&v| v == 200.0));
}

#[test]
fn decode_rejects_garbage_and_empty_input() {
    assert!(matches!(
        decode_grayscale(b"not an image"),
        Err(MixerError::Decode(_))
    ));
    assert!(matches!(decode_grayscale(&[]), Err(MixerError::Decode(_))));
}

#[test]
fn encode_then_decode_clamps_and_rounds() {
    let m = Matrix::from_rows(&[vec![-5.0, 10.4], vec![254.6, 400.0]]).unwrap();
    let png = encode_png_gray(&m).unwrap();
    let back = decode_grayscale(&png).unwrap();
    assert_eq!(back.as_slice(), &[0.0, 10.0, 255.0, 255.0]);
}

#[test]
fn display_png_scales_unit_range() {
    let m = Matrix::from_rows(&[vec![0.0, 0.5, 1.0]]).unwrap();
    let back = decode_grayscale(&display_to_png(&m).unwrap()).unwrap();
    assert_eq!(back.as_slice(), &[0.0, 128.0, 255.0]);
}
