use log::debug;

use crate::bitblt::{bitblt, BlitMode};
use crate::pixel::{ImageView, PixelSlice, PixelSliceMut};
use crate::{Color, Display, DisplayBackend, DisplayError, PixelFormat};

/// In-memory framebuffer in one native format.
///
/// Geometry is fixed at construction; the backing store is allocated by
/// [`DisplayBackend::init`] and never reallocated afterwards.
pub struct FrameBuffer {
    data: Option<Vec<u8>>,
    width: usize,
    height: usize,
    format: PixelFormat,
}

fn allocation_size(format: PixelFormat, width: usize, height: usize) -> Option<usize> {
    format
        .row_stride_units(width)
        .checked_mul(format.bytes_per_unit())?
        .checked_mul(height)
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self, DisplayError> {
        if !format.is_destination() {
            return Err(DisplayError::UnsupportedFormat(format));
        }

        Ok(Self {
            data: None,
            width,
            height,
            format,
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn is_allocated(&self) -> bool {
        self.data.is_some()
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.format.row_stride_bytes(self.width)
    }

    /// The whole backing store; empty until allocated.
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.stride();
        self.data
            .as_deref()
            .map(|data| &data[y * stride..(y + 1) * stride])
    }

    pub fn as_image(&self) -> Option<ImageView<'_>> {
        let data = self.data.as_deref()?;
        Some(ImageView::new(self.format, self.width, self.height, data))
    }

    /// Blits the whole buffer onto `display` at its origin.
    pub fn draw_into<B: DisplayBackend>(&self, display: &mut Display<B>) -> Result<(), DisplayError> {
        let image = self.as_image().ok_or(DisplayError::NotInitialized)?;
        display.draw_pixels_at(0, 0, image, Color::WHITE, Color::BLACK)
    }
}

impl DisplayBackend for FrameBuffer {
    fn native_format(&self) -> PixelFormat {
        self.format
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        if self.data.is_some() {
            return Ok(());
        }

        let bytes = allocation_size(self.format, self.width, self.height)
            .ok_or(DisplayError::AllocationFailed { bytes: usize::MAX })?;

        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| DisplayError::AllocationFailed { bytes })?;
        data.resize(bytes, 0);

        debug!(
            "Allocated {bytes} bytes for {}x{} {} framebuffer",
            self.width, self.height, self.format
        );
        self.data = Some(data);
        Ok(())
    }

    fn native_row(&mut self, y: usize) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.stride();
        self.data
            .as_mut()
            .map(|data| &mut data[y * stride..(y + 1) * stride])
    }

    fn draw_pixels(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        data: &[u8],
    ) -> Result<(), DisplayError> {
        if w == 0 || h == 0 {
            return Ok(());
        }

        let format = self.format;
        assert!(
            data.len() >= format.buffer_size(w, h),
            "pixel data is shorter than the rectangle requires"
        );

        let mode = BlitMode::opaque(format);
        for (j, src) in data.chunks(format.row_stride_bytes(w)).take(h).enumerate() {
            let dst = self
                .native_row(y + j)
                .ok_or(DisplayError::BufferUnavailable { y: y + j })?;
            bitblt(
                PixelSliceMut::new(format, dst),
                x,
                PixelSlice::new(format, src),
                0,
                w,
                &mode,
            );
        }
        Ok(())
    }
}
