//! Binary pixel-engine protocol
//!
//! A request is seven native-endian `i32`s
//! `(bpp, width, height, box_left, box_top, box_width, box_height)`, the raw
//! pixel bytes of the un-cropped buffer, and one command frame. The client
//! then closes its write side. The engine answers with a single
//! length-prefixed response and exits.

use pixdiff_core::{BoundingBox, Bpp, ColorHistogram, Error, PixelFrame, Rect, Result, RgbaColor};
use std::io::{self, Read, Write};

/// Command code: extract the crop box
pub const CROP_PIXELS: i32 = 0;
/// Command code: per-channel color histogram
pub const HISTOGRAM: i32 = 1;
/// Command code: bounding box of a color
pub const BOUNDING_BOX: i32 = 2;

/// Number of `i32` values in a histogram response
pub const HISTOGRAM_VALUES: usize = 768;
/// Number of `i32` values in a bounding-box response
pub const BOUNDING_BOX_VALUES: usize = 5;

/// Largest pixel buffer or response payload accepted (1 GiB)
pub const MAX_PAYLOAD_SIZE: usize = 1 << 30;

const HEADER_VALUES: usize = 7;
const NO_COLOR: i32 = -1;

/// One engine command with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CropPixels,
    Histogram {
        ignore_color: Option<RgbaColor>,
        tolerance: u8,
    },
    BoundingBox {
        color: RgbaColor,
        tolerance: u8,
    },
}

impl Command {
    /// Wire code of the command
    pub fn code(&self) -> i32 {
        match self {
            Command::CropPixels => CROP_PIXELS,
            Command::Histogram { .. } => HISTOGRAM,
            Command::BoundingBox { .. } => BOUNDING_BOX,
        }
    }

    /// Encode the command frame.
    pub fn encode(&self) -> Vec<u8> {
        let values: Vec<i32> = match *self {
            Command::CropPixels => vec![CROP_PIXELS],
            Command::Histogram {
                ignore_color,
                tolerance,
            } => vec![
                HISTOGRAM,
                ignore_color.map_or(NO_COLOR, |c| c.to_packed() as i32),
                tolerance as i32,
            ],
            Command::BoundingBox { color, tolerance } => vec![
                BOUNDING_BOX,
                color.to_packed() as i32,
                tolerance as i32,
            ],
        };
        encode_i32s(&values)
    }

    /// Write the command frame.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }

    /// Read a command frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for an unknown code, an out-of-range
    /// argument or a truncated frame.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        match read_i32(reader)? {
            CROP_PIXELS => Ok(Command::CropPixels),
            HISTOGRAM => {
                let packed = read_i32(reader)?;
                let tolerance = read_tolerance(reader)?;
                let ignore_color = match packed {
                    NO_COLOR => None,
                    p => Some(packed_color(p)?),
                };
                Ok(Command::Histogram {
                    ignore_color,
                    tolerance,
                })
            }
            BOUNDING_BOX => {
                let color = packed_color(read_i32(reader)?)?;
                let tolerance = read_tolerance(reader)?;
                Ok(Command::BoundingBox { color, tolerance })
            }
            code => Err(Error::Protocol(format!("unknown command code {}", code))),
        }
    }
}

fn packed_color(packed: i32) -> Result<RgbaColor> {
    if !(0..=0xff_ffff).contains(&packed) {
        return Err(Error::Protocol(format!("invalid packed color {}", packed)));
    }
    Ok(RgbaColor::from_packed(packed as u32))
}

fn read_tolerance<R: Read>(reader: &mut R) -> Result<u8> {
    let value = read_i32(reader)?;
    u8::try_from(value).map_err(|_| Error::Protocol(format!("invalid tolerance {}", value)))
}

/// An owned request as received by the engine.
#[derive(Debug, Clone)]
pub struct Request {
    pub bpp: Bpp,
    pub width: u32,
    pub height: u32,
    pub crop: Rect,
    pub pixels: Vec<u8>,
}

impl Request {
    /// Borrow the request as a validated frame.
    pub fn frame(&self) -> Result<PixelFrame<'_>> {
        PixelFrame::new(self.bpp, self.width, self.height, self.crop, &self.pixels)
    }
}

/// Write the request header and pixel bytes for `frame`.
pub fn write_request<W: Write>(writer: &mut W, frame: &PixelFrame<'_>) -> Result<()> {
    let crop = frame.crop();
    let header = [
        frame.bpp().bytes() as i32,
        dimension(frame.width())?,
        dimension(frame.height())?,
        crop.x,
        crop.y,
        crop.w,
        crop.h,
    ];
    log::trace!(
        "request header {:?}, {} pixel bytes",
        header,
        frame.pixels().len()
    );
    writer.write_all(&encode_i32s(&header))?;
    writer.write_all(frame.pixels())?;
    Ok(())
}

fn dimension(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::Protocol(format!("dimension {} exceeds i32", value)))
}

/// Read a request header and its pixel bytes.
///
/// # Errors
///
/// Returns [`Error::Protocol`] on truncation or an invalid header, and the
/// frame validation error if the crop box leaves the buffer.
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let mut header = [0i32; HEADER_VALUES];
    for value in header.iter_mut() {
        *value = read_i32(reader)?;
    }
    let [bpp, width, height, left, top, box_width, box_height] = header;
    log::trace!("request header {:?}", header);

    let bpp = Bpp::from_bytes(
        u32::try_from(bpp).map_err(|_| Error::Protocol(format!("invalid bpp {}", bpp)))?,
    )?;
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(Error::Protocol(format!(
            "invalid dimensions {}x{}",
            width, height
        )));
    };
    let crop = Rect::new(left, top, box_width, box_height)
        .map_err(|e| Error::Protocol(format!("invalid crop box: {}", e)))?;

    let len = (bpp.bytes() as usize)
        .checked_mul(width as usize)
        .and_then(|n| n.checked_mul(height as usize))
        .filter(|&n| n <= MAX_PAYLOAD_SIZE)
        .ok_or_else(|| {
            Error::Protocol(format!(
                "pixel data for {}x{} at {} bytes per pixel exceeds {} bytes",
                width,
                height,
                bpp.bytes(),
                MAX_PAYLOAD_SIZE
            ))
        })?;
    let pixels = read_payload(reader, len, "pixel data")?;

    let request = Request {
        bpp,
        width,
        height,
        crop,
        pixels,
    };
    request.frame()?;
    Ok(request)
}

/// Write a length-prefixed response.
pub fn write_response<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = i32::try_from(payload.len())
        .map_err(|_| Error::Protocol(format!("response too large: {} bytes", payload.len())))?;
    writer.write_all(&len.to_ne_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read a length-prefixed response.
///
/// Returns `Ok(None)` if the stream ended before any byte of the length was
/// read, which means the engine failed without answering.
///
/// # Errors
///
/// Returns [`Error::Protocol`] for a partial length, a negative length or a
/// payload shorter than announced.
pub fn read_response<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    match filled {
        0 => return Ok(None),
        4 => {}
        n => {
            return Err(Error::Protocol(format!(
                "truncated response length: {} of 4 bytes",
                n
            )));
        }
    }

    let len = i32::from_ne_bytes(prefix);
    let len = usize::try_from(len)
        .map_err(|_| Error::Protocol(format!("negative response length {}", len)))?;
    if len > MAX_PAYLOAD_SIZE {
        return Err(Error::Protocol(format!(
            "response too large: {} bytes (max {})",
            len, MAX_PAYLOAD_SIZE
        )));
    }
    log::trace!("response of {} bytes", len);

    read_payload(reader, len, "response").map(Some)
}

/// Encode histogram counts as a response payload.
pub fn encode_histogram(hist: &ColorHistogram) -> Result<Vec<u8>> {
    let values = hist
        .to_flat()
        .into_iter()
        .map(|count| {
            i32::try_from(count)
                .map_err(|_| Error::Protocol(format!("histogram count {} exceeds i32", count)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(encode_i32s(&values))
}

/// Decode a histogram response payload.
///
/// # Errors
///
/// Returns [`Error::Protocol`] unless the payload holds exactly 768
/// non-negative counts.
pub fn decode_histogram(
    payload: &[u8],
    default_color: Option<RgbaColor>,
) -> Result<ColorHistogram> {
    let values = decode_i32s(payload)?;
    if values.len() != HISTOGRAM_VALUES {
        return Err(Error::Protocol(format!(
            "the color histogram has the wrong number of buckets: {}",
            values.len()
        )));
    }
    let counts = values
        .into_iter()
        .map(|v| {
            u32::try_from(v).map_err(|_| Error::Protocol(format!("negative histogram count {}", v)))
        })
        .collect::<Result<Vec<_>>>()?;
    ColorHistogram::from_flat(&counts, default_color)
}

/// Encode a bounding-box result as a response payload.
///
/// "No match" is sent as `(-1, -1, -1, -1, count)`.
pub fn encode_bounding_box(bb: &BoundingBox) -> Result<Vec<u8>> {
    let (left, top, width, height) = bb.rect.map_or((-1, -1, -1, -1), Rect::to_tuple);
    let count = i32::try_from(bb.match_count)
        .map_err(|_| Error::Protocol(format!("match count {} exceeds i32", bb.match_count)))?;
    Ok(encode_i32s(&[left, top, width, height, count]))
}

/// Decode a bounding-box response payload.
///
/// A negative width or height means nothing matched.
pub fn decode_bounding_box(payload: &[u8]) -> Result<BoundingBox> {
    let values = decode_i32s(payload)?;
    let [left, top, width, height, count] = values[..] else {
        return Err(Error::Protocol(format!(
            "bounding box response has {} values, expected {}",
            values.len(),
            BOUNDING_BOX_VALUES
        )));
    };
    let match_count = u32::try_from(count)
        .map_err(|_| Error::Protocol(format!("negative match count {}", count)))?;
    let rect = (width >= 0 && height >= 0)
        .then(|| Rect::new_unchecked(left, top, width, height));
    Ok(BoundingBox { rect, match_count })
}

fn encode_i32s(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

fn decode_i32s(payload: &[u8]) -> Result<Vec<i32>> {
    if payload.len() % 4 != 0 {
        return Err(Error::Protocol(format!(
            "payload of {} bytes is not a sequence of 32-bit integers",
            payload.len()
        )));
    }
    Ok(payload
        .chunks_exact(4)
        .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, "integer")?;
    Ok(i32::from_ne_bytes(buf))
}

/// Read exactly `len` bytes, growing the buffer as data arrives.
fn read_payload<R: Read>(reader: &mut R, len: usize, what: &str) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut payload)?;
    if payload.len() != len {
        return Err(Error::Protocol(format!(
            "stream ended while reading {}: {} of {} bytes",
            what,
            payload.len(),
            len
        )));
    }
    Ok(payload)
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            Error::Protocol(format!("stream ended while reading {}", what))
        }
        _ => Error::Io(e),
    })
}
