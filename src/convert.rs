use once_cell::sync::Lazy;

use crate::color::approx_white;
use crate::pixel::{with_pixel, Channels, Pixel};
use crate::{Color, PixelFormat, PixelValue};

/// Moves a channel sample from an `in_bits` domain to an `out_bits` domain.
///
/// Widening replicates the sample's bits until the wider field is full, so an
/// all-ones input stays all-ones. Narrowing keeps the top `out_bits` bits. A
/// zero width on either side means the channel is absent and yields 0.
#[inline]
pub const fn rescale(value: u8, in_bits: u8, out_bits: u8) -> u8 {
    debug_assert!(in_bits <= 8 && out_bits <= 8);

    if in_bits == 0 || out_bits == 0 {
        return 0;
    }

    let value = value as u16 & ((1u16 << in_bits) - 1);
    if in_bits == out_bits {
        value as u8
    } else if in_bits > out_bits {
        (value >> (in_bits - out_bits)) as u8
    } else {
        let step = in_bits as i32;
        let mut shift = out_bits as i32 - step;
        let mut out = 0u16;
        while shift > -step {
            out |= if shift >= 0 {
                value << shift
            } else {
                value >> -shift
            };
            shift -= step;
        }
        out as u8
    }
}

/// Converts `src_slot` of a unit in `S` into `dst_slot` of a unit in `D`.
///
/// Absent color channels are filled from W, then from A. An absent W is
/// derived from the color channels (or from A for alpha-only sources), and an
/// absent A on the source is treated as fully opaque.
#[inline]
pub(crate) fn convert_between<S: Pixel, D: Pixel>(
    src: &[u8],
    src_slot: usize,
    dst: &mut [u8],
    dst_slot: usize,
) {
    let c = S::decode(src, src_slot);
    let s = S::DESCRIPTOR;
    let d = D::DESCRIPTOR;

    let color = |own: u8, own_bits: u8, out_bits: u8| {
        if own_bits > 0 {
            rescale(own, own_bits, out_bits)
        } else if s.w > 0 {
            rescale(c.w, s.w, out_bits)
        } else {
            rescale(c.a, s.a, out_bits)
        }
    };

    let w = if s.w > 0 {
        rescale(c.w, s.w, d.w)
    } else if s.has_rgb() {
        let luma = approx_white(
            rescale(c.r, s.r, 8),
            rescale(c.g, s.g, 8),
            rescale(c.b, s.b, 8),
        );
        rescale(luma, 8, d.w)
    } else {
        rescale(c.a, s.a, d.w)
    };

    let a = if s.a > 0 {
        rescale(c.a, s.a, d.a)
    } else {
        rescale(0xFF, 8, d.a)
    };

    D::encode(
        dst,
        dst_slot,
        Channels {
            r: color(c.r, s.r, d.r),
            g: color(c.g, s.g, d.g),
            b: color(c.b, s.b, d.b),
            a,
            w,
        },
    );
}

pub(crate) fn color_to_pixel_as<P: Pixel>(color: Color) -> PixelValue {
    let d = P::DESCRIPTOR;
    let channels = Channels {
        r: rescale(color.r, 8, d.r),
        g: rescale(color.g, 8, d.g),
        b: rescale(color.b, 8, d.b),
        a: rescale(color.a, 8, d.a),
        w: rescale(color.w, 8, d.w),
    };

    let mut value = PixelValue::zeroed(P::FORMAT);
    for slot in 0..d.pixels {
        P::encode(value.as_bytes_mut(), slot, channels);
    }
    value
}

pub(crate) fn pixel_to_color_as<P: Pixel>(unit: &[u8], slot: usize) -> Color {
    let c = P::decode(unit, slot);
    let d = P::DESCRIPTOR;

    let color = |own: u8, own_bits: u8| {
        if own_bits > 0 {
            rescale(own, own_bits, 8)
        } else if d.w > 0 {
            rescale(c.w, d.w, 8)
        } else {
            rescale(c.a, d.a, 8)
        }
    };
    let (r, g, b) = (color(c.r, d.r), color(c.g, d.g), color(c.b, d.b));

    let w = if d.w > 0 {
        rescale(c.w, d.w, 8)
    } else if d.has_rgb() {
        approx_white(r, g, b)
    } else {
        rescale(c.a, d.a, 8)
    };
    let a = if d.a > 0 { rescale(c.a, d.a, 8) } else { 0xFF };

    Color { r, g, b, w, a }
}

/// Encodes `color` in `format`, setting every slot of a packed unit.
pub fn color_to_pixel(color: Color, format: PixelFormat) -> PixelValue {
    with_pixel!(format, P => color_to_pixel_as::<P>(color))
}

/// Decodes `slot` of `pixel` into a full-precision [`Color`].
pub fn pixel_to_color(pixel: &PixelValue, slot: usize) -> Color {
    with_pixel!(pixel.format(), P => pixel_to_color_as::<P>(pixel.as_bytes(), slot))
}

pub(crate) type ConvertFn = fn(&[u8], usize, &mut [u8], usize);

/// Function pointers for every `(source, destination)` format pair.
pub(crate) struct PairTable<F> {
    entries: Vec<F>,
}

impl<F: Copy> PairTable<F> {
    pub(crate) fn build(resolve: impl Fn(PixelFormat, PixelFormat) -> F) -> Self {
        let entries = PixelFormat::ALL
            .into_iter()
            .flat_map(|src| PixelFormat::ALL.into_iter().map(move |dst| (src, dst)))
            .map(|(src, dst)| resolve(src, dst))
            .collect();
        Self { entries }
    }

    #[inline]
    pub(crate) fn get(&self, src: PixelFormat, dst: PixelFormat) -> F {
        self.entries[src.index() * PixelFormat::ALL.len() + dst.index()]
    }
}

fn resolve_convert(src: PixelFormat, dst: PixelFormat) -> ConvertFn {
    with_pixel!(src, S => with_pixel!(dst, D => convert_between::<S, D> as ConvertFn))
}

static CONVERT_TABLE: Lazy<PairTable<ConvertFn>> = Lazy::new(|| PairTable::build(resolve_convert));

/// Converts one pixel between formats without going through a [`Color`].
///
/// Only `dst_slot` of the destination unit is written.
pub fn convert_pixel(
    src_format: PixelFormat,
    src: &[u8],
    src_slot: usize,
    dst_format: PixelFormat,
    dst: &mut [u8],
    dst_slot: usize,
) {
    CONVERT_TABLE.get(src_format, dst_format)(src, src_slot, dst, dst_slot)
}
