//! Horizontal run copy ("bitblt") and run fill between format-tagged buffers.
//!
//! Every `(source, destination, transparency)` combination is monomorphized
//! once and looked up by runtime format tags. Within a pair the run is handled
//! by one of five paths:
//!
//! 1. same format and same sub-pixel phase: raw copy of whole units, with the
//!    partial first and last units merged slot by slot;
//! 2. neither side packed: one conversion per unit;
//! 3. packed source: one destination unit per source slot;
//! 4. packed destination: one source unit per destination slot;
//! 5. both packed: independent slot counters on both sides.

use std::ops::Range;

use once_cell::sync::Lazy;

use crate::convert::{color_to_pixel, convert_between, PairTable};
use crate::pixel::{with_pixel, Pixel, PixelSlice, PixelSliceMut};
use crate::{Color, FormatDescriptor, PixelFormat, PixelValue};

/// Per-run options: transparency skipping and color-key substitution colors.
///
/// `color_on` and `color_off` are pre-encoded in the destination format and
/// replace the pixels of color-key sources (`A1`, `W1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlitMode {
    pub transparency: bool,
    pub color_on: PixelValue,
    pub color_off: PixelValue,
}

impl BlitMode {
    pub fn new(dst_format: PixelFormat, transparency: bool, color_on: Color, color_off: Color) -> Self {
        Self {
            transparency,
            color_on: color_to_pixel(color_on, dst_format),
            color_off: color_to_pixel(color_off, dst_format),
        }
    }

    /// No transparency; color keys map to white and black.
    pub fn opaque(dst_format: PixelFormat) -> Self {
        Self::new(dst_format, false, Color::WHITE, Color::BLACK)
    }

    pub fn with_transparency(mut self, transparency: bool) -> Self {
        self.transparency = transparency;
        self
    }
}

pub(crate) type BlitFn = fn(&mut [u8], usize, &[u8], usize, usize, &PixelValue, &PixelValue);
pub(crate) type FillFn = fn(&mut [u8], usize, usize, &PixelValue);

#[inline]
fn unit(buf: &[u8], index: usize, bytes: usize) -> &[u8] {
    &buf[index * bytes..(index + 1) * bytes]
}

#[inline]
fn unit_mut(buf: &mut [u8], index: usize, bytes: usize) -> &mut [u8] {
    &mut buf[index * bytes..(index + 1) * bytes]
}

/// Leading partial unit, whole units and trailing partial unit of a run.
#[derive(Debug, PartialEq, Eq)]
struct RunSplit {
    head: Option<Range<usize>>,
    whole: usize,
    tail: usize,
}

fn split_run(d: FormatDescriptor, x: usize, width: usize) -> RunSplit {
    let lead = d.pixel_slot(x);
    let mut remaining = width;
    let head = if lead > 0 {
        let end = (lead + width).min(d.pixels);
        remaining -= end - lead;
        Some(lead..end)
    } else {
        None
    };

    RunSplit {
        head,
        whole: remaining / d.pixels,
        tail: remaining % d.pixels,
    }
}

#[inline]
fn merge_slots<P: Pixel>(dst: &mut [u8], src: &[u8], slots: Range<usize>) {
    for slot in slots {
        P::encode(dst, slot, P::decode(src, slot));
    }
}

#[inline(always)]
fn transfer<S: Pixel, D: Pixel, const TRANSPARENCY: bool>(
    dst: &mut [u8],
    dst_slot: usize,
    src: &[u8],
    src_slot: usize,
    color_on: &PixelValue,
    color_off: &PixelValue,
) {
    if TRANSPARENCY && S::is_transparent(src, src_slot) {
        return;
    }

    if S::DESCRIPTOR.color_key {
        let key = if S::is_on(src, src_slot) { color_on } else { color_off };
        D::encode(dst, dst_slot, D::decode(key.as_bytes(), 0));
    } else {
        convert_between::<S, D>(src, src_slot, dst, dst_slot);
    }
}

fn copy_run<P: Pixel>(dst: &mut [u8], dst_x: usize, src: &[u8], src_x: usize, width: usize) {
    let d = P::DESCRIPTOR;
    let bytes = d.bytes;
    let split = split_run(d, dst_x, width);
    let mut du = d.unit_index(dst_x);
    let mut su = d.unit_index(src_x);

    if let Some(slots) = split.head {
        merge_slots::<P>(unit_mut(dst, du, bytes), unit(src, su, bytes), slots);
        du += 1;
        su += 1;
    }

    if split.whole > 0 {
        dst[du * bytes..(du + split.whole) * bytes]
            .copy_from_slice(&src[su * bytes..(su + split.whole) * bytes]);
        du += split.whole;
        su += split.whole;
    }

    if split.tail > 0 {
        merge_slots::<P>(unit_mut(dst, du, bytes), unit(src, su, bytes), 0..split.tail);
    }
}

fn blit_unpacked<S: Pixel, D: Pixel, const TRANSPARENCY: bool>(
    dst: &mut [u8],
    dst_x: usize,
    src: &[u8],
    src_x: usize,
    width: usize,
    color_on: &PixelValue,
    color_off: &PixelValue,
) {
    let (sb, db) = (S::DESCRIPTOR.bytes, D::DESCRIPTOR.bytes);
    let src_units = src[src_x * sb..(src_x + width) * sb].chunks_exact(sb);
    let dst_units = dst[dst_x * db..(dst_x + width) * db].chunks_exact_mut(db);

    for (d_unit, s_unit) in dst_units.zip(src_units) {
        transfer::<S, D, TRANSPARENCY>(d_unit, 0, s_unit, 0, color_on, color_off);
    }
}

fn blit_packed_src<S: Pixel, D: Pixel, const TRANSPARENCY: bool>(
    dst: &mut [u8],
    dst_x: usize,
    src: &[u8],
    src_x: usize,
    width: usize,
    color_on: &PixelValue,
    color_off: &PixelValue,
) {
    let s = S::DESCRIPTOR;
    let db = D::DESCRIPTOR.bytes;
    let mut su = s.unit_index(src_x);
    let mut slot = s.pixel_slot(src_x);

    for d_unit in dst[dst_x * db..(dst_x + width) * db].chunks_exact_mut(db) {
        transfer::<S, D, TRANSPARENCY>(d_unit, 0, unit(src, su, s.bytes), slot, color_on, color_off);
        slot += 1;
        if slot == s.pixels {
            slot = 0;
            su += 1;
        }
    }
}

fn blit_packed_dst<S: Pixel, D: Pixel, const TRANSPARENCY: bool>(
    dst: &mut [u8],
    dst_x: usize,
    src: &[u8],
    src_x: usize,
    width: usize,
    color_on: &PixelValue,
    color_off: &PixelValue,
) {
    let d = D::DESCRIPTOR;
    let sb = S::DESCRIPTOR.bytes;
    let mut du = d.unit_index(dst_x);
    let mut slot = d.pixel_slot(dst_x);

    for s_unit in src[src_x * sb..(src_x + width) * sb].chunks_exact(sb) {
        transfer::<S, D, TRANSPARENCY>(unit_mut(dst, du, d.bytes), slot, s_unit, 0, color_on, color_off);
        slot += 1;
        if slot == d.pixels {
            slot = 0;
            du += 1;
        }
    }
}

/// General per-pixel path; correct for any pair of formats and alignments.
pub(crate) fn blit_pixelwise<S: Pixel, D: Pixel, const TRANSPARENCY: bool>(
    dst: &mut [u8],
    dst_x: usize,
    src: &[u8],
    src_x: usize,
    width: usize,
    color_on: &PixelValue,
    color_off: &PixelValue,
) {
    let (s, d) = (S::DESCRIPTOR, D::DESCRIPTOR);
    let (mut su, mut s_slot) = (s.unit_index(src_x), s.pixel_slot(src_x));
    let (mut du, mut d_slot) = (d.unit_index(dst_x), d.pixel_slot(dst_x));

    for _ in 0..width {
        transfer::<S, D, TRANSPARENCY>(
            unit_mut(dst, du, d.bytes),
            d_slot,
            unit(src, su, s.bytes),
            s_slot,
            color_on,
            color_off,
        );

        s_slot += 1;
        if s_slot == s.pixels {
            s_slot = 0;
            su += 1;
        }
        d_slot += 1;
        if d_slot == d.pixels {
            d_slot = 0;
            du += 1;
        }
    }
}

pub(crate) fn blit<S: Pixel, D: Pixel, const TRANSPARENCY: bool>(
    dst: &mut [u8],
    dst_x: usize,
    src: &[u8],
    src_x: usize,
    width: usize,
    color_on: &PixelValue,
    color_off: &PixelValue,
) {
    if width == 0 {
        return;
    }

    let (s, d) = (S::DESCRIPTOR, D::DESCRIPTOR);
    // Raw copies would bypass transparency skipping and key substitution.
    let per_pixel = (TRANSPARENCY && S::TRANSPARENCY) || s.color_key;

    if S::FORMAT == D::FORMAT && s.pixel_slot(src_x) == d.pixel_slot(dst_x) && !per_pixel {
        copy_run::<D>(dst, dst_x, src, src_x, width);
    } else if !s.is_packed() && !d.is_packed() {
        blit_unpacked::<S, D, TRANSPARENCY>(dst, dst_x, src, src_x, width, color_on, color_off);
    } else if !d.is_packed() {
        blit_packed_src::<S, D, TRANSPARENCY>(dst, dst_x, src, src_x, width, color_on, color_off);
    } else if !s.is_packed() {
        blit_packed_dst::<S, D, TRANSPARENCY>(dst, dst_x, src, src_x, width, color_on, color_off);
    } else {
        blit_pixelwise::<S, D, TRANSPARENCY>(dst, dst_x, src, src_x, width, color_on, color_off);
    }
}

pub(crate) fn fill_run<P: Pixel>(dst: &mut [u8], x: usize, width: usize, color: &PixelValue) {
    if width == 0 {
        return;
    }

    let d = P::DESCRIPTOR;
    let bytes = d.bytes;
    let color = color.as_bytes();
    let split = split_run(d, x, width);
    let mut du = d.unit_index(x);

    if let Some(slots) = split.head {
        merge_slots::<P>(unit_mut(dst, du, bytes), color, slots);
        du += 1;
    }

    for d_unit in dst[du * bytes..(du + split.whole) * bytes].chunks_exact_mut(bytes) {
        d_unit.copy_from_slice(color);
    }
    du += split.whole;

    if split.tail > 0 {
        merge_slots::<P>(unit_mut(dst, du, bytes), color, 0..split.tail);
    }
}

fn resolve_blit<const TRANSPARENCY: bool>(src: PixelFormat, dst: PixelFormat) -> BlitFn {
    with_pixel!(src, S => with_pixel!(dst, D => blit::<S, D, TRANSPARENCY> as BlitFn))
}

fn resolve_fill(format: PixelFormat) -> FillFn {
    with_pixel!(format, P => fill_run::<P> as FillFn)
}

/// Blit functions indexed by `[transparency as usize]`.
static BLIT_TABLE: Lazy<[PairTable<BlitFn>; 2]> = Lazy::new(|| {
    [
        PairTable::build(resolve_blit::<false>),
        PairTable::build(resolve_blit::<true>),
    ]
});

static FILL_TABLE: Lazy<Vec<FillFn>> =
    Lazy::new(|| PixelFormat::ALL.into_iter().map(resolve_fill).collect());

/// Copies `width` pixels starting at `src_x` into `dst` starting at `dst_x`,
/// converting between the two formats.
///
/// Pixels of `dst` outside the run are never modified, including the other
/// slots of partially covered packed units.
///
/// # Panics
///
/// Panics if the key colors in `mode` are not encoded in the destination
/// format, or if the run extends past either buffer.
pub fn bitblt(
    dst: PixelSliceMut<'_>,
    dst_x: usize,
    src: PixelSlice<'_>,
    src_x: usize,
    width: usize,
    mode: &BlitMode,
) {
    assert!(
        mode.color_on.format() == dst.format && mode.color_off.format() == dst.format,
        "key colors must be encoded in the destination format"
    );

    let run = BLIT_TABLE[mode.transparency as usize].get(src.format, dst.format);
    run(
        dst.data,
        dst_x,
        src.data,
        src_x,
        width,
        &mode.color_on,
        &mode.color_off,
    );
}

/// Writes `color` across `width` pixels of `dst` starting at `x`.
///
/// # Panics
///
/// Panics if `color` is not encoded in the destination format.
pub fn fill(dst: PixelSliceMut<'_>, x: usize, width: usize, color: &PixelValue) {
    assert_eq!(
        color.format(),
        dst.format,
        "fill color must be encoded in the destination format"
    );

    FILL_TABLE[dst.format.index()](dst.data, x, width, color);
}
