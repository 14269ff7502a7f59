//! Format-free color used to exchange pixels between drawing code and buffers.

/// Full-precision color with a separate white (gray intensity) channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
    pub a: u8,
}

/// Luma-like gray approximation: a quarter red, half green, a quarter blue.
///
/// Full white stays full white.
#[inline]
pub const fn approx_white(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 + 2 * g as u16 + b as u16) >> 2) as u8
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Opaque color; `w` is derived from the RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            w: approx_white(r, g, b),
            a,
        }
    }

    /// Opaque gray with every color channel set to `w`.
    pub const fn gray(w: u8) -> Self {
        Self {
            r: w,
            g: w,
            b: w,
            w,
            a: 0xFF,
        }
    }

    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 0xFF
    }
}
