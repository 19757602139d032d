//! Engine side of the protocol

use crate::protocol::{self, Command};
use pixdiff_core::{NativeEngine, PixelEngine, Result};
use std::io::{Read, Write};

/// Answer one request with [`NativeEngine`].
pub fn serve<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    serve_with(&NativeEngine, input, output)
}

/// Read one request and command from `input`, run it on `engine` and
/// write the length-prefixed response to `output`.
///
/// Nothing is written on error, so the client sees an empty response.
pub fn serve_with<E, R, W>(engine: &E, input: &mut R, output: &mut W) -> Result<()>
where
    E: PixelEngine + ?Sized,
    R: Read,
    W: Write,
{
    let request = protocol::read_request(input)?;
    let command = Command::read_from(input)?;
    let frame = request.frame()?;
    log::debug!(
        "serving {:?} on {}x{} crop {:?}",
        command,
        request.width,
        request.height,
        request.crop
    );

    let payload = match command {
        Command::CropPixels => engine.crop_pixels(&frame)?,
        Command::Histogram {
            ignore_color,
            tolerance,
        } => protocol::encode_histogram(&engine.histogram(&frame, ignore_color, tolerance)?)?,
        Command::BoundingBox { color, tolerance } => {
            protocol::encode_bounding_box(&engine.bounding_box(&frame, color, tolerance)?)?
        }
    };
    protocol::write_response(output, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixdiff_core::{Bpp, PixelFrame, Rect, RgbaColor};
    use std::io::Cursor;

    fn exchange(frame: &PixelFrame<'_>, command: Command) -> Result<Vec<u8>> {
        let mut input = Vec::new();
        protocol::write_request(&mut input, frame)?;
        command.write_to(&mut input)?;

        let mut output = Vec::new();
        serve(&mut Cursor::new(input), &mut output)?;
        Ok(protocol::read_response(&mut Cursor::new(output))?.unwrap_or_default())
    }

    fn checker() -> Vec<u8> {
        // 2x2 RGBA: white, orange / orange, white
        let w = [255u8, 255, 255, 255];
        let o = [222u8, 100, 13, 255];
        [w, o, o, w].concat()
    }

    #[test]
    fn test_serve_crop() {
        let px = checker();
        let frame = PixelFrame::new(Bpp::Rgba, 2, 2, Rect::new_unchecked(1, 0, 1, 2), &px).unwrap();
        let out = exchange(&frame, Command::CropPixels).unwrap();
        assert_eq!(out, [[222u8, 100, 13, 255], [255, 255, 255, 255]].concat());
    }

    #[test]
    fn test_serve_histogram() {
        let px = checker();
        let frame = PixelFrame::new(Bpp::Rgba, 2, 2, Rect::full(2, 2), &px).unwrap();
        let payload = exchange(
            &frame,
            Command::Histogram {
                ignore_color: Some(RgbaColor::WHITE),
                tolerance: 0,
            },
        )
        .unwrap();
        let hist = protocol::decode_histogram(&payload, None).unwrap();
        assert_eq!(hist.r[222], 2);
        assert_eq!(hist.channel_total(2), 2);
    }

    #[test]
    fn test_serve_bounding_box_no_match() {
        let px = checker();
        let frame = PixelFrame::new(Bpp::Rgba, 2, 2, Rect::full(2, 2), &px).unwrap();
        let payload = exchange(
            &frame,
            Command::BoundingBox {
                color: RgbaColor::new(0, 0, 0),
                tolerance: 0,
            },
        )
        .unwrap();
        assert_eq!(
            payload,
            [-1i32, -1, -1, -1, 0]
                .iter()
                .flat_map(|v| v.to_ne_bytes())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_serve_writes_nothing_on_error() {
        let mut input = Vec::new();
        input.extend((3i32).to_ne_bytes());
        let mut output = Vec::new();
        assert!(serve(&mut Cursor::new(input), &mut output).is_err());
        assert!(output.is_empty());
    }
}
