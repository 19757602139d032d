//! PNG image format support
//!
//! Decoding expands palette and low-bit grayscale images and converts
//! grayscale to RGB, so every PNG reads as an 8-bit RGB or RGBA bitmap.
//! 16-bit PNGs are rejected.

use crate::{IoError, IoResult};
use pixdiff_core::{Bitmap, Bpp};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Bitmap> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNG bit depth: {:?}",
            bit_depth
        )));
    }

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let width = output_info.width;
    let height = output_info.height;
    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];

    let (bpp, pixels) = match color_type {
        ColorType::Rgb | ColorType::Rgba => {
            let bpp: u32 = if color_type == ColorType::Rgba { 4 } else { 3 };
            let row_len = width as usize * bpp as usize;
            let mut pixels = Vec::with_capacity(row_len * height as usize);
            for row in data.chunks(bytes_per_row).take(height as usize) {
                pixels.extend_from_slice(&row[..row_len]);
            }
            (bpp, pixels)
        }
        ColorType::Grayscale => {
            let mut pixels = Vec::with_capacity(3 * width as usize * height as usize);
            for row in data.chunks(bytes_per_row).take(height as usize) {
                for &g in &row[..width as usize] {
                    pixels.extend_from_slice(&[g, g, g]);
                }
            }
            (3, pixels)
        }
        ColorType::GrayscaleAlpha => {
            let mut pixels = Vec::with_capacity(4 * width as usize * height as usize);
            for row in data.chunks(bytes_per_row).take(height as usize) {
                for ga in row[..2 * width as usize].chunks_exact(2) {
                    pixels.extend_from_slice(&[ga[0], ga[0], ga[0], ga[1]]);
                }
            }
            (4, pixels)
        }
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "indexed PNG was not expanded".to_string(),
            ));
        }
    };

    Ok(Bitmap::new(bpp, width, height, pixels)?)
}

/// Write raw 8-bit RGB or RGBA pixels as a PNG image
pub fn write_png_pixels<W: Write>(
    bpp: Bpp,
    width: u32,
    height: u32,
    pixels: &[u8],
    writer: W,
) -> IoResult<()> {
    let expected = bpp.bytes() as usize * width as usize * height as usize;
    if pixels.len() != expected {
        return Err(IoError::InvalidData(format!(
            "pixel buffer has {} bytes, expected {}",
            pixels.len(),
            expected
        )));
    }

    let color_type = match bpp {
        Bpp::Rgb => ColorType::Rgb,
        Bpp::Rgba => ColorType::Rgba,
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;
    writer
        .write_image_data(pixels)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;
    writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {}", e)))?;

    Ok(())
}

/// Write a PNG image
///
/// A pending crop is applied first.
pub fn write_png<W: Write>(bitmap: &mut Bitmap, writer: W) -> IoResult<()> {
    let (bpp, width, height) = (bitmap.bpp(), bitmap.width(), bitmap.height());
    write_png_pixels(bpp, width, height, bitmap.pixels()?, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixdiff_core::RgbaColor;
    use std::io::Cursor;

    fn encode_raw(color_type: ColorType, width: u32, height: u32, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
        writer.finish().unwrap();
        out
    }

    #[test]
    fn test_png_roundtrip_rgb() {
        let pixels: Vec<u8> = (0..5 * 4 * 3).map(|i| (i * 7) as u8).collect();
        let mut bmp = Bitmap::new(3, 5, 4, pixels.clone()).unwrap();

        let mut buffer = Vec::new();
        write_png(&mut bmp, &mut buffer).unwrap();
        let mut bmp2 = read_png(Cursor::new(buffer)).unwrap();

        assert_eq!(bmp2.bpp(), Bpp::Rgb);
        assert_eq!((bmp2.width(), bmp2.height()), (5, 4));
        assert_eq!(bmp2.pixels().unwrap(), pixels.as_slice());
    }

    #[test]
    fn test_png_roundtrip_rgba() {
        let pixels = [1u8, 2, 3, 4].repeat(6);
        let mut bmp = Bitmap::new(4, 3, 2, pixels.clone()).unwrap();

        let mut buffer = Vec::new();
        write_png(&mut bmp, &mut buffer).unwrap();
        let mut bmp2 = read_png(Cursor::new(buffer)).unwrap();

        assert_eq!(bmp2.bpp(), Bpp::Rgba);
        assert_eq!(bmp2.pixels().unwrap(), pixels.as_slice());
    }

    #[test]
    fn test_png_write_applies_crop() {
        let pixels: Vec<u8> = (0..4 * 4 * 3).map(|i| i as u8).collect();
        let mut bmp = Bitmap::new(3, 4, 4, pixels).unwrap();
        bmp.crop(1, 1, 2, 2).unwrap();

        let mut buffer = Vec::new();
        write_png(&mut bmp, &mut buffer).unwrap();
        let mut bmp2 = read_png(Cursor::new(buffer)).unwrap();

        assert_eq!((bmp2.width(), bmp2.height()), (2, 2));
        // Pixel (1, 1) of the original starts at byte 3 * 5
        assert_eq!(bmp2.get_pixel_color(0, 0).unwrap(), RgbaColor::new(15, 16, 17));
    }

    #[test]
    fn test_png_read_grayscale_as_rgb() {
        let data = encode_raw(ColorType::Grayscale, 2, 1, &[10, 200]);
        let mut bmp = read_png(Cursor::new(data)).unwrap();
        assert_eq!(bmp.bpp(), Bpp::Rgb);
        assert_eq!(bmp.get_pixel_color(1, 0).unwrap(), RgbaColor::new(200, 200, 200));
    }

    #[test]
    fn test_png_read_grayscale_alpha_as_rgba() {
        let data = encode_raw(ColorType::GrayscaleAlpha, 1, 1, &[50, 60]);
        let mut bmp = read_png(Cursor::new(data)).unwrap();
        assert_eq!(bmp.bpp(), Bpp::Rgba);
        assert_eq!(
            bmp.get_pixel_color(0, 0).unwrap(),
            RgbaColor::rgba(50, 50, 50, 60)
        );
    }

    #[test]
    fn test_png_rejects_garbage() {
        assert!(matches!(
            read_png(Cursor::new(vec![1u8, 2, 3, 4])),
            Err(IoError::DecodeError(_))
        ));
    }

    #[test]
    fn test_write_png_pixels_checks_length() {
        let mut out = Vec::new();
        assert!(matches!(
            write_png_pixels(Bpp::Rgb, 2, 2, &[0; 5], &mut out),
            Err(IoError::InvalidData(_))
        ));
    }
}
