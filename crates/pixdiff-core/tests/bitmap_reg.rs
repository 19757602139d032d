//! Bitmap regression test - access, crop, equality and diff
//!
//! Tests corner pixel access, lazy crop composition, equality with and
//! without tolerance, and PNG-backed difference images.

use pixdiff_core::{Bitmap, Bpp, Error, MetadataValue, RgbaColor};
use pixdiff_io::PngCodec;
use pixdiff_test::RegParams;

/// 8x6 RGB gradient, pixel (x, y) = (30x, 40y, 100)
fn gradient() -> Bitmap {
    let mut pixels = Vec::new();
    for y in 0..6u8 {
        for x in 0..8u8 {
            pixels.extend_from_slice(&[x * 30, y * 40, 100]);
        }
    }
    Bitmap::new(3, 8, 6, pixels).expect("gradient")
}

#[test]
fn bitmap_reg() {
    let mut rp = RegParams::new("bitmap");

    // --- Test 1: corner colors of a 2x2 RGBA image ---
    let corners = [
        RgbaColor::rgba(255, 0, 0, 255),
        RgbaColor::rgba(0, 255, 0, 128),
        RgbaColor::rgba(0, 0, 255, 64),
        RgbaColor::rgba(9, 9, 9, 0),
    ];
    let pixels: Vec<u8> = corners.iter().flat_map(|c| c.channels()).collect();
    let mut quad = Bitmap::new(4, 2, 2, pixels).expect("quad");
    for (i, expected) in corners.iter().enumerate() {
        let (x, y) = (i as u32 % 2, i as u32 / 2);
        let c = quad.get_pixel_color(x, y).expect("pixel");
        rp.compare_values(expected.to_packed() as f64, c.to_packed() as f64, 0.0);
        rp.compare_values(expected.a as f64, c.a as f64, 0.0);
    }

    // --- Test 2: metadata reflects the logical image ---
    let meta = quad.metadata();
    rp.compare_values(
        1.0,
        if meta.get("alpha") == Some(&MetadataValue::Bool(true)) {
            1.0
        } else {
            0.0
        },
        0.0,
    );
    rp.compare_values(
        1.0,
        if meta.get("size") == Some(&MetadataValue::Size(2, 2)) {
            1.0
        } else {
            0.0
        },
        0.0,
    );

    // --- Test 3: chained crops compose ---
    let mut bmp = gradient();
    bmp.crop(2, 1, 5, 4).expect("crop").crop(1, 2, 3, 2).expect("crop");
    rp.compare_values(3.0, bmp.width() as f64, 0.0);
    rp.compare_values(2.0, bmp.height() as f64, 0.0);
    // Logical (0, 0) is original (3, 3)
    let c = bmp.get_pixel_color(0, 0).expect("pixel");
    rp.compare_values(90.0, c.r as f64, 0.0);
    rp.compare_values(120.0, c.g as f64, 0.0);
    rp.compare_values(255.0, c.a as f64, 0.0);

    // --- Test 4: invalid crop leaves the size alone ---
    let before = (bmp.width(), bmp.height());
    let rejected = matches!(bmp.crop(1, 0, 3, 1), Err(Error::InvalidCrop { .. }));
    rp.compare_values(1.0, if rejected { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(before.0 as f64, bmp.width() as f64, 0.0);
    rp.compare_values(before.1 as f64, bmp.height() as f64, 0.0);

    // --- Test 5: equality ---
    let mut a = gradient();
    let mut b = gradient();
    rp.compare_bitmaps(&mut a, &mut b, 0);
    let mut off_by_two = gradient();
    off_by_two.pixels_mut().expect("pixels")[4] += 2;
    rp.compare_values(
        0.0,
        if a.is_equal(&mut off_by_two, 0).unwrap() { 1.0 } else { 0.0 },
        0.0,
    );
    rp.compare_values(
        0.0,
        if a.is_equal(&mut off_by_two, 1).unwrap() { 1.0 } else { 0.0 },
        0.0,
    );
    rp.compare_bitmaps(&mut a, &mut off_by_two, 2);

    // --- Test 6: diff against self is black at the same size ---
    let mut same = gradient();
    let mut zero = a.diff(&mut same, &PngCodec).expect("diff");
    rp.compare_values(8.0, zero.width() as f64, 0.0);
    rp.compare_values(6.0, zero.height() as f64, 0.0);
    rp.compare_values(
        1.0,
        if zero.bpp() == Bpp::Rgb { 1.0 } else { 0.0 },
        0.0,
    );
    let max = zero.pixels().expect("pixels").iter().copied().max().unwrap_or(0);
    rp.compare_values(0.0, max as f64, 0.0);

    // --- Test 7: diff of different sizes pads with transparent black ---
    let mut small = Bitmap::new(3, 1, 1, vec![10, 20, 30]).expect("small");
    let mut wide = Bitmap::new(4, 2, 1, vec![15, 15, 15, 255, 40, 50, 60, 255]).expect("wide");
    let mut d = small.diff(&mut wide, &PngCodec).expect("diff");
    rp.compare_values(2.0, d.width() as f64, 0.0);
    let c0 = d.get_pixel_color(0, 0).expect("pixel");
    rp.compare_values(
        RgbaColor::new(5, 5, 15).to_packed() as f64,
        c0.to_packed() as f64,
        0.0,
    );
    let c1 = d.get_pixel_color(1, 0).expect("pixel");
    rp.compare_values(
        RgbaColor::new(40, 50, 60).to_packed() as f64,
        c1.to_packed() as f64,
        0.0,
    );

    // --- Test 8: diff image written for inspection reads back unchanged ---
    let mut left = gradient();
    let mut right = gradient();
    right.crop(1, 1, 6, 4).expect("crop");
    let mut shifted = left.diff(&mut right, &PngCodec).expect("diff");
    rp.compare_values(8.0, shifted.width() as f64, 0.0);
    // (0, 0): (0, 0, 100) vs original (1, 1) = (30, 40, 100)
    let c = shifted.get_pixel_color(0, 0).expect("pixel");
    rp.compare_values(
        RgbaColor::new(30, 40, 0).to_packed() as f64,
        c.to_packed() as f64,
        0.0,
    );
    rp.write_bitmap(&mut shifted).expect("write diff");

    assert!(rp.cleanup(), "bitmap regression test failed");
}
