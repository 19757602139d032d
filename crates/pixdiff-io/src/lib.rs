//! pixdiff-io - image decode/encode for pixdiff
//!
//! Reads encoded images into [`Bitmap`]s and writes bitmaps back out.
//! PNG is the only supported format (feature `png-format`, on by default).
//!
//! [`PngCodec`] plugs PNG into [`Bitmap::diff`], which re-encodes its
//! difference image:
//!
//! ```
//! use pixdiff_core::Bitmap;
//! use pixdiff_io::PngCodec;
//!
//! let mut a = Bitmap::new(3, 2, 2, vec![0; 12]).unwrap();
//! let mut b = Bitmap::new(3, 2, 2, vec![5; 12]).unwrap();
//! let mut d = a.diff(&mut b, &PngCodec).unwrap();
//! assert_eq!(d.get_pixel_color(1, 1).unwrap().g, 5);
//! ```

mod error;
pub mod format;
#[cfg(feature = "png-format")]
pub mod png;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format, detect_format_from_bytes};

use pixdiff_core::{Bitmap, Bpp, ImageCodec};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Read an image from a file path
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Bitmap> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    let file = File::open(path)?;
    read_image_format(BufReader::new(file), format)
}

/// Read an image from memory
pub fn read_image_mem(data: &[u8]) -> IoResult<Bitmap> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(Cursor::new(data), format)
}

fn read_image_format<R: std::io::BufRead + std::io::Seek>(
    reader: R,
    format: ImageFormat,
) -> IoResult<Bitmap> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(reader),
        _ => {
            let _ = reader;
            Err(IoError::UnsupportedFormat(format!("{:?}", format)))
        }
    }
}

/// Write an image to a file path
pub fn write_image<P: AsRef<Path>>(
    bitmap: &mut Bitmap,
    path: P,
    format: ImageFormat,
) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_image_format(bitmap, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Write an image to memory
pub fn write_image_mem(bitmap: &mut Bitmap, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    write_image_format(bitmap, &mut out, format)?;
    Ok(out)
}

fn write_image_format<W: Write>(
    bitmap: &mut Bitmap,
    writer: W,
    format: ImageFormat,
) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(bitmap, writer),
        _ => {
            let _ = (bitmap, writer);
            Err(IoError::UnsupportedFormat(format!("{:?}", format)))
        }
    }
}

/// PNG [`ImageCodec`]
#[cfg(feature = "png-format")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

#[cfg(feature = "png-format")]
impl ImageCodec for PngCodec {
    fn encode(
        &self,
        bpp: Bpp,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> pixdiff_core::Result<Vec<u8>> {
        let mut out = Vec::new();
        png::write_png_pixels(bpp, width, height, pixels, &mut out)
            .map_err(|e| pixdiff_core::Error::EncodeError(e.to_string()))?;
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> pixdiff_core::Result<Bitmap> {
        png::read_png(Cursor::new(data)).map_err(IoError::into_core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_roundtrip() {
        let mut bmp = Bitmap::new(3, 2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let data = write_image_mem(&mut bmp, ImageFormat::Png).unwrap();
        let mut back = read_image_mem(&data).unwrap();
        assert_eq!(back.pixels().unwrap(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut bmp = Bitmap::new(3, 1, 1, vec![0, 0, 0]).unwrap();
        assert!(matches!(
            write_image_mem(&mut bmp, ImageFormat::Unknown),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            read_image_mem(b"not an image"),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_png_codec_error_mapping() {
        assert!(matches!(
            PngCodec.decode(b"garbage"),
            Err(pixdiff_core::Error::DecodeError(_))
        ));
        assert!(matches!(
            PngCodec.encode(Bpp::Rgb, 2, 2, &[0; 3]),
            Err(pixdiff_core::Error::EncodeError(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = std::env::temp_dir().join("pixdiff_io_file_roundtrip");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rgba.png");

        let mut bmp = Bitmap::new(4, 1, 2, vec![9, 8, 7, 6, 5, 4, 3, 2]).unwrap();
        write_image(&mut bmp, &path, ImageFormat::Png).unwrap();
        let mut back = read_image(&path).unwrap();
        assert_eq!(back.pixels().unwrap(), &[9, 8, 7, 6, 5, 4, 3, 2]);
    }
}
