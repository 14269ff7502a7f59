//! Per-format codecs and the byte-level pixel views they operate on.
//!
//! Every format gets a zero-sized codec type implementing [`Pixel`]. Codecs
//! read and write one sub-pixel slot of a storage unit, leaving the other
//! slots of the unit untouched. Channel values are in the format's native bit
//! widths; see [`crate::rescale`] for moving between widths.

use crate::{FormatDescriptor, PixelFormat};

/// Channel samples of one pixel at the native widths of its format.
///
/// Channels the format does not have are zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Channels {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub w: u8,
}

pub trait Pixel {
    const FORMAT: PixelFormat;
    const DESCRIPTOR: FormatDescriptor = Self::FORMAT.descriptor();
    /// Whether [`Pixel::is_transparent`] can ever return true.
    const TRANSPARENCY: bool = false;

    fn decode(unit: &[u8], slot: usize) -> Channels;

    /// Writes `channels` into `slot` without disturbing the other slots.
    fn encode(unit: &mut [u8], slot: usize, channels: Channels);

    fn is_transparent(_unit: &[u8], _slot: usize) -> bool {
        false
    }

    /// On/off state for color-key formats; always on elsewhere.
    fn is_on(_unit: &[u8], _slot: usize) -> bool {
        true
    }
}

#[inline]
fn bit_mask(slot: usize) -> u8 {
    assert!(slot < 8, "slot {slot} out of range for a 1-bit format");
    1 << (7 - slot)
}

#[inline]
fn read_bit(unit: &[u8], slot: usize) -> bool {
    unit[0] & bit_mask(slot) != 0
}

#[inline]
fn write_bit(unit: &mut [u8], slot: usize, on: bool) {
    let mask = bit_mask(slot);
    if on {
        unit[0] |= mask;
    } else {
        unit[0] &= !mask;
    }
}

pub struct A1;
pub struct W1;
pub struct W4;
pub struct W8;
pub struct W8Key;
pub struct Rgb332;
pub struct Rgb565;
pub struct Rgb565Be;
pub struct Rgb888;
pub struct Rgba4444;
pub struct Rgba8888;

impl Pixel for A1 {
    const FORMAT: PixelFormat = PixelFormat::A1;
    const TRANSPARENCY: bool = true;

    fn decode(unit: &[u8], slot: usize) -> Channels {
        Channels {
            a: read_bit(unit, slot) as u8,
            ..Channels::default()
        }
    }

    fn encode(unit: &mut [u8], slot: usize, channels: Channels) {
        write_bit(unit, slot, channels.a & 1 != 0);
    }

    fn is_transparent(unit: &[u8], slot: usize) -> bool {
        !read_bit(unit, slot)
    }

    fn is_on(unit: &[u8], slot: usize) -> bool {
        read_bit(unit, slot)
    }
}

impl Pixel for W1 {
    const FORMAT: PixelFormat = PixelFormat::W1;

    fn decode(unit: &[u8], slot: usize) -> Channels {
        Channels {
            w: read_bit(unit, slot) as u8,
            ..Channels::default()
        }
    }

    fn encode(unit: &mut [u8], slot: usize, channels: Channels) {
        write_bit(unit, slot, channels.w & 1 != 0);
    }

    fn is_on(unit: &[u8], slot: usize) -> bool {
        read_bit(unit, slot)
    }
}

impl Pixel for W4 {
    const FORMAT: PixelFormat = PixelFormat::W4;

    fn decode(unit: &[u8], slot: usize) -> Channels {
        let w = match slot {
            0 => unit[0] & 0x0F,
            1 => unit[0] >> 4,
            _ => panic!("slot {slot} out of range for W4"),
        };
        Channels {
            w,
            ..Channels::default()
        }
    }

    fn encode(unit: &mut [u8], slot: usize, channels: Channels) {
        let w = channels.w & 0x0F;
        match slot {
            0 => unit[0] = (unit[0] & 0xF0) | w,
            1 => unit[0] = (unit[0] & 0x0F) | (w << 4),
            _ => panic!("slot {slot} out of range for W4"),
        }
    }
}

impl Pixel for W8 {
    const FORMAT: PixelFormat = PixelFormat::W8;

    fn decode(unit: &[u8], _slot: usize) -> Channels {
        Channels {
            w: unit[0],
            ..Channels::default()
        }
    }

    fn encode(unit: &mut [u8], _slot: usize, channels: Channels) {
        unit[0] = channels.w;
    }
}

impl Pixel for W8Key {
    const FORMAT: PixelFormat = PixelFormat::W8Key;
    const TRANSPARENCY: bool = true;

    fn decode(unit: &[u8], slot: usize) -> Channels {
        W8::decode(unit, slot)
    }

    fn encode(unit: &mut [u8], slot: usize, channels: Channels) {
        W8::encode(unit, slot, channels)
    }

    // A raw value of 1 is reserved as the key.
    fn is_transparent(unit: &[u8], _slot: usize) -> bool {
        unit[0] == 1
    }
}

impl Pixel for Rgb332 {
    const FORMAT: PixelFormat = PixelFormat::Rgb332;

    fn decode(unit: &[u8], _slot: usize) -> Channels {
        let raw = unit[0];
        Channels {
            r: raw >> 5,
            g: (raw >> 2) & 0x07,
            b: raw & 0x03,
            ..Channels::default()
        }
    }

    fn encode(unit: &mut [u8], _slot: usize, channels: Channels) {
        unit[0] = (channels.r & 0x07) << 5 | (channels.g & 0x07) << 2 | (channels.b & 0x03);
    }
}

#[inline]
fn decode_565(value: u16) -> Channels {
    Channels {
        r: (value >> 11) as u8,
        g: ((value >> 5) & 0x3F) as u8,
        b: (value & 0x1F) as u8,
        ..Channels::default()
    }
}

#[inline]
fn encode_565(channels: Channels) -> u16 {
    (channels.r as u16 & 0x1F) << 11 | (channels.g as u16 & 0x3F) << 5 | (channels.b as u16 & 0x1F)
}

impl Pixel for Rgb565 {
    const FORMAT: PixelFormat = PixelFormat::Rgb565;

    fn decode(unit: &[u8], _slot: usize) -> Channels {
        decode_565(u16::from_le_bytes([unit[0], unit[1]]))
    }

    fn encode(unit: &mut [u8], _slot: usize, channels: Channels) {
        unit[..2].copy_from_slice(&encode_565(channels).to_le_bytes());
    }
}

impl Pixel for Rgb565Be {
    const FORMAT: PixelFormat = PixelFormat::Rgb565Be;

    fn decode(unit: &[u8], _slot: usize) -> Channels {
        decode_565(u16::from_be_bytes([unit[0], unit[1]]))
    }

    fn encode(unit: &mut [u8], _slot: usize, channels: Channels) {
        unit[..2].copy_from_slice(&encode_565(channels).to_be_bytes());
    }
}

impl Pixel for Rgb888 {
    const FORMAT: PixelFormat = PixelFormat::Rgb888;

    fn decode(unit: &[u8], _slot: usize) -> Channels {
        Channels {
            r: unit[0],
            g: unit[1],
            b: unit[2],
            ..Channels::default()
        }
    }

    fn encode(unit: &mut [u8], _slot: usize, channels: Channels) {
        unit[0] = channels.r;
        unit[1] = channels.g;
        unit[2] = channels.b;
    }
}

impl Pixel for Rgba4444 {
    const FORMAT: PixelFormat = PixelFormat::Rgba4444;
    const TRANSPARENCY: bool = true;

    fn decode(unit: &[u8], _slot: usize) -> Channels {
        Channels {
            r: unit[0] >> 4,
            g: unit[0] & 0x0F,
            b: unit[1] >> 4,
            a: unit[1] & 0x0F,
            w: 0,
        }
    }

    fn encode(unit: &mut [u8], _slot: usize, channels: Channels) {
        unit[0] = (channels.r & 0x0F) << 4 | (channels.g & 0x0F);
        unit[1] = (channels.b & 0x0F) << 4 | (channels.a & 0x0F);
    }

    fn is_transparent(unit: &[u8], _slot: usize) -> bool {
        unit[1] & 0x0F < 0x08
    }
}

impl Pixel for Rgba8888 {
    const FORMAT: PixelFormat = PixelFormat::Rgba8888;
    const TRANSPARENCY: bool = true;

    fn decode(unit: &[u8], _slot: usize) -> Channels {
        Channels {
            r: unit[0],
            g: unit[1],
            b: unit[2],
            a: unit[3],
            w: 0,
        }
    }

    fn encode(unit: &mut [u8], _slot: usize, channels: Channels) {
        unit[0] = channels.r;
        unit[1] = channels.g;
        unit[2] = channels.b;
        unit[3] = channels.a;
    }

    fn is_transparent(unit: &[u8], _slot: usize) -> bool {
        unit[3] < 0x80
    }
}

/// Expands `$body` once per format with `$p` bound to that format's codec type.
macro_rules! with_pixel {
    ($format:expr, $p:ident => $body:expr) => {
        match $format {
            $crate::PixelFormat::A1 => {
                type $p = $crate::pixel::A1;
                $body
            }
            $crate::PixelFormat::W1 => {
                type $p = $crate::pixel::W1;
                $body
            }
            $crate::PixelFormat::W4 => {
                type $p = $crate::pixel::W4;
                $body
            }
            $crate::PixelFormat::W8 => {
                type $p = $crate::pixel::W8;
                $body
            }
            $crate::PixelFormat::W8Key => {
                type $p = $crate::pixel::W8Key;
                $body
            }
            $crate::PixelFormat::Rgb332 => {
                type $p = $crate::pixel::Rgb332;
                $body
            }
            $crate::PixelFormat::Rgb565 => {
                type $p = $crate::pixel::Rgb565;
                $body
            }
            $crate::PixelFormat::Rgb565Be => {
                type $p = $crate::pixel::Rgb565Be;
                $body
            }
            $crate::PixelFormat::Rgb888 => {
                type $p = $crate::pixel::Rgb888;
                $body
            }
            $crate::PixelFormat::Rgba4444 => {
                type $p = $crate::pixel::Rgba4444;
                $body
            }
            $crate::PixelFormat::Rgba8888 => {
                type $p = $crate::pixel::Rgba8888;
                $body
            }
        }
    };
}

pub(crate) use with_pixel;

/// Decodes `slot` of a storage unit in `format`.
pub fn decode(format: PixelFormat, unit: &[u8], slot: usize) -> Channels {
    with_pixel!(format, P => P::decode(unit, slot))
}

/// Encodes `channels` into `slot` of a storage unit in `format`.
pub fn encode(format: PixelFormat, unit: &mut [u8], slot: usize, channels: Channels) {
    with_pixel!(format, P => P::encode(unit, slot, channels))
}

pub fn is_transparent(format: PixelFormat, unit: &[u8], slot: usize) -> bool {
    with_pixel!(format, P => P::is_transparent(unit, slot))
}

pub fn is_on(format: PixelFormat, unit: &[u8], slot: usize) -> bool {
    with_pixel!(format, P => P::is_on(unit, slot))
}

/// One storage unit of a specific format, held inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelValue {
    format: PixelFormat,
    raw: [u8; PixelValue::MAX_BYTES],
}

impl PixelValue {
    pub const MAX_BYTES: usize = 4;

    pub const fn zeroed(format: PixelFormat) -> Self {
        Self {
            format,
            raw: [0; Self::MAX_BYTES],
        }
    }

    pub fn from_bytes(format: PixelFormat, bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            format.bytes_per_unit(),
            "pixel value size must match the format's storage unit"
        );
        let mut value = Self::zeroed(format);
        value.as_bytes_mut().copy_from_slice(bytes);
        value
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw[..self.format.bytes_per_unit()]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.raw[..self.format.bytes_per_unit()]
    }

    pub fn decode(&self, slot: usize) -> Channels {
        decode(self.format, self.as_bytes(), slot)
    }
}

/// Read-only run of storage units in one format.
#[derive(Clone, Copy, Debug)]
pub struct PixelSlice<'a> {
    pub format: PixelFormat,
    pub data: &'a [u8],
}

impl<'a> PixelSlice<'a> {
    pub fn new(format: PixelFormat, data: &'a [u8]) -> Self {
        Self { format, data }
    }

    /// Storage unit holding logical pixel `x`.
    pub fn unit(&self, x: usize) -> &'a [u8] {
        let d = self.format.descriptor();
        let start = d.unit_index(x) * d.bytes;
        &self.data[start..start + d.bytes]
    }

    pub fn decode(&self, x: usize) -> Channels {
        decode(self.format, self.unit(x), self.format.pixel_slot(x))
    }

    pub fn is_transparent(&self, x: usize) -> bool {
        is_transparent(self.format, self.unit(x), self.format.pixel_slot(x))
    }
}

/// Mutable run of storage units in one format.
#[derive(Debug)]
pub struct PixelSliceMut<'a> {
    pub format: PixelFormat,
    pub data: &'a mut [u8],
}

impl<'a> PixelSliceMut<'a> {
    pub fn new(format: PixelFormat, data: &'a mut [u8]) -> Self {
        Self { format, data }
    }

    pub fn as_slice(&self) -> PixelSlice<'_> {
        PixelSlice::new(self.format, self.data)
    }

    pub fn unit_mut(&mut self, x: usize) -> &mut [u8] {
        let d = self.format.descriptor();
        let start = d.unit_index(x) * d.bytes;
        &mut self.data[start..start + d.bytes]
    }

    pub fn encode(&mut self, x: usize, channels: Channels) {
        let (format, slot) = (self.format, self.format.pixel_slot(x));
        encode(format, self.unit_mut(x), slot, channels)
    }
}

/// Row-major source image: `height` rows of `row_stride_bytes(width)` bytes.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    pub format: PixelFormat,
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

impl<'a> ImageView<'a> {
    pub fn new(format: PixelFormat, width: usize, height: usize, data: &'a [u8]) -> Self {
        assert!(
            data.len() >= format.buffer_size(width, height),
            "image data is shorter than its dimensions require"
        );
        Self {
            format,
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.format.row_stride_bytes(self.width)
    }

    pub fn row(&self, y: usize) -> PixelSlice<'a> {
        let stride = self.stride();
        PixelSlice::new(self.format, &self.data[y * stride..(y + 1) * stride])
    }
}
