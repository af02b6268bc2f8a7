//! PNG structure checks.

use image::{Rgba, RgbaImage};
use renderer::png::{create_png, create_png_auto, create_png_indexed, write_png};

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Chunk types in file order.
fn chunk_types(png: &[u8]) -> Vec<String> {
    let mut types = Vec::new();
    let mut pos = 8;
    while pos + 8 <= png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        types.push(String::from_utf8_lossy(&png[pos + 4..pos + 8]).to_string());
        pos += 12 + len;
    }
    types
}

#[test]
fn test_few_colors_encode_indexed() {
    let pixels = [
        255, 0, 0, 255, //
        0, 255, 0, 255, //
        0, 255, 0, 255, //
        255, 0, 0, 255,
    ];
    let png = create_png_auto(&pixels, 2, 2).unwrap();
    assert_eq!(&png[0..8], &SIGNATURE);
    assert_eq!(chunk_types(&png), vec!["IHDR", "PLTE", "IDAT", "IEND"]);
}

#[test]
fn test_transparent_palette_gets_trns() {
    let png = create_png_indexed(2, 1, &[(255, 0, 0, 255), (0, 0, 0, 0)], &[0, 1]).unwrap();
    assert_eq!(chunk_types(&png), vec!["IHDR", "PLTE", "tRNS", "IDAT", "IEND"]);
}

#[test]
fn test_rgba_has_no_palette() {
    let png = create_png(&[1, 2, 3, 255], 1, 1).unwrap();
    assert_eq!(chunk_types(&png), vec!["IHDR", "IDAT", "IEND"]);
}

#[test]
fn test_indexed_and_rgba_decode_to_same_pixels() {
    let mut img = RgbaImage::from_pixel(16, 8, Rgba([255, 255, 255, 255]));
    for x in 0..16 {
        img.put_pixel(x, 3, Rgba([(x * 10) as u8, 0, 128, 255]));
    }

    let auto = create_png_auto(img.as_raw(), 16, 8).unwrap();
    let rgba = create_png(img.as_raw(), 16, 8).unwrap();

    let a = image::load_from_memory(&auto).unwrap().to_rgba8();
    let b = image::load_from_memory(&rgba).unwrap().to_rgba8();
    assert_eq!(a, img);
    assert_eq!(b, img);
}

#[test]
fn test_write_png_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("map.png");
    let img = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 255, 255]));

    write_png(&path, &img).unwrap();
    assert!(path.exists());
    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded, img);
}

#[test]
fn test_write_png_rejects_empty_image() {
    let dir = tempfile::tempdir().unwrap();
    assert!(write_png(&dir.path().join("x.png"), &RgbaImage::new(0, 0)).is_err());
}
