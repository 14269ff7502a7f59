use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DisplayError;

/// The closed set of pixel layouts a buffer or a source image can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PixelFormat {
    /// 1-bit alpha mask, 8 pixels per byte, MSB first.
    A1,
    /// 1-bit monochrome, 8 pixels per byte, MSB first.
    W1,
    /// 4-bit grayscale, 2 pixels per byte, low nibble first.
    W4,
    /// 8-bit grayscale.
    W8,
    /// 8-bit grayscale where the value 1 marks a transparent pixel.
    W8Key,
    /// 3-3-2 bit color in one byte.
    Rgb332,
    /// 5-6-5 bit color, little-endian.
    Rgb565,
    /// 5-6-5 bit color, big-endian.
    Rgb565Be,
    /// 8-bit channels in R, G, B order.
    Rgb888,
    /// 4-bit channels, `RG` then `BA` nibble pairs.
    Rgba4444,
    /// 8-bit channels in R, G, B, A order.
    Rgba8888,
}

/// Static layout metadata for one [`PixelFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub w: u8,
    /// Bytes in one storage unit.
    pub bytes: usize,
    /// Logical pixels packed into one storage unit.
    pub pixels: usize,
    /// Stores on/off only; real colors are supplied at conversion time.
    pub color_key: bool,
}

const fn descriptor(
    (r, g, b, a, w): (u8, u8, u8, u8, u8),
    bytes: usize,
    pixels: usize,
    color_key: bool,
) -> FormatDescriptor {
    FormatDescriptor {
        r,
        g,
        b,
        a,
        w,
        bytes,
        pixels,
        color_key,
    }
}

impl FormatDescriptor {
    /// Sub-pixel slot that `x` occupies inside its storage unit.
    #[inline]
    pub const fn pixel_slot(&self, x: usize) -> usize {
        x % self.pixels
    }

    /// Storage unit that `x` belongs to.
    #[inline]
    pub const fn unit_index(&self, x: usize) -> usize {
        x / self.pixels
    }

    /// Storage units needed for `width` logical pixels.
    #[inline]
    pub const fn row_stride_units(&self, width: usize) -> usize {
        width.div_ceil(self.pixels)
    }

    #[inline]
    pub const fn row_stride_bytes(&self, width: usize) -> usize {
        self.row_stride_units(width) * self.bytes
    }

    #[inline]
    pub const fn is_packed(&self) -> bool {
        self.pixels > 1
    }

    #[inline]
    pub const fn has_rgb(&self) -> bool {
        self.r > 0 || self.g > 0 || self.b > 0
    }
}

/// Coarse capability class of a display's native format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayType {
    Binary,
    Grayscale,
    Color,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 11] = [
        PixelFormat::A1,
        PixelFormat::W1,
        PixelFormat::W4,
        PixelFormat::W8,
        PixelFormat::W8Key,
        PixelFormat::Rgb332,
        PixelFormat::Rgb565,
        PixelFormat::Rgb565Be,
        PixelFormat::Rgb888,
        PixelFormat::Rgba4444,
        PixelFormat::Rgba8888,
    ];

    /// Formats a display or framebuffer may use as its native format.
    pub const DESTINATIONS: [PixelFormat; 8] = [
        PixelFormat::W4,
        PixelFormat::W8,
        PixelFormat::Rgb332,
        PixelFormat::Rgb565,
        PixelFormat::Rgb565Be,
        PixelFormat::Rgb888,
        PixelFormat::Rgba4444,
        PixelFormat::Rgba8888,
    ];

    pub const fn descriptor(self) -> FormatDescriptor {
        match self {
            PixelFormat::A1 => descriptor((0, 0, 0, 1, 0), 1, 8, true),
            PixelFormat::W1 => descriptor((0, 0, 0, 0, 1), 1, 8, true),
            PixelFormat::W4 => descriptor((0, 0, 0, 0, 4), 1, 2, false),
            PixelFormat::W8 | PixelFormat::W8Key => descriptor((0, 0, 0, 0, 8), 1, 1, false),
            PixelFormat::Rgb332 => descriptor((3, 3, 2, 0, 0), 1, 1, false),
            PixelFormat::Rgb565 | PixelFormat::Rgb565Be => {
                descriptor((5, 6, 5, 0, 0), 2, 1, false)
            }
            PixelFormat::Rgb888 => descriptor((8, 8, 8, 0, 0), 3, 1, false),
            PixelFormat::Rgba4444 => descriptor((4, 4, 4, 4, 0), 2, 1, false),
            PixelFormat::Rgba8888 => descriptor((8, 8, 8, 8, 0), 4, 1, false),
        }
    }

    /// Position of this format in [`PixelFormat::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the number of bytes in one storage unit of this format.
    #[inline]
    pub const fn bytes_per_unit(self) -> usize {
        self.descriptor().bytes
    }

    #[inline]
    pub const fn pixels_per_unit(self) -> usize {
        self.descriptor().pixels
    }

    #[inline]
    pub const fn is_packed(self) -> bool {
        self.descriptor().is_packed()
    }

    #[inline]
    pub const fn is_color_key(self) -> bool {
        self.descriptor().color_key
    }

    #[inline]
    pub const fn is_destination(self) -> bool {
        !matches!(self, PixelFormat::A1 | PixelFormat::W1 | PixelFormat::W8Key)
    }

    #[inline]
    pub const fn pixel_slot(self, x: usize) -> usize {
        self.descriptor().pixel_slot(x)
    }

    #[inline]
    pub const fn unit_index(self, x: usize) -> usize {
        self.descriptor().unit_index(x)
    }

    #[inline]
    pub const fn row_stride_units(self, width: usize) -> usize {
        self.descriptor().row_stride_units(width)
    }

    /// Calculates the stride (bytes per row) for the given width.
    #[inline]
    pub const fn row_stride_bytes(self, width: usize) -> usize {
        self.descriptor().row_stride_bytes(width)
    }

    /// Calculates the total buffer size needed for the given dimensions.
    #[inline]
    pub const fn buffer_size(self, width: usize, height: usize) -> usize {
        self.row_stride_bytes(width) * height
    }

    pub const fn display_type(self) -> DisplayType {
        let d = self.descriptor();
        if d.has_rgb() {
            DisplayType::Color
        } else if d.w > 1 {
            DisplayType::Grayscale
        } else {
            DisplayType::Binary
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::A1 => "A1",
            PixelFormat::W1 => "W1",
            PixelFormat::W4 => "W4",
            PixelFormat::W8 => "W8",
            PixelFormat::W8Key => "W8_KEY",
            PixelFormat::Rgb332 => "RGB332",
            PixelFormat::Rgb565 => "RGB565",
            PixelFormat::Rgb565Be => "RGB565_BE",
            PixelFormat::Rgb888 => "RGB888",
            PixelFormat::Rgba4444 => "RGBA4444",
            PixelFormat::Rgba8888 => "RGBA8888",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PixelFormat::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DisplayError::UnknownFormat(s.to_string()))
    }
}

impl TryFrom<String> for PixelFormat {
    type Error = DisplayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PixelFormat> for String {
    fn from(format: PixelFormat) -> Self {
        format.name().to_string()
    }
}
