use log::debug;
use pixels::{Pixels, SurfaceTexture};
use winit::window::Window;

use crate::{DisplayBackend, DisplayError, PixelFormat};

/// Window backend drawing into a `pixels` RGBA surface.
///
/// Rows are exposed directly, so a [`crate::Display`] never needs scanlines
/// here. Call [`PixelsBackend::present`] to show the frame.
pub struct PixelsBackend<'win> {
    pixels: Option<Pixels<'win>>,
    width: usize,
    height: usize,
}

impl<'win> PixelsBackend<'win> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: None,
            width,
            height,
        }
    }

    pub fn init_with_window(&mut self, window: &'win Window) -> Result<(), DisplayError> {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, window);

        let pixels = Pixels::new(self.width as u32, self.height as u32, surface_texture)
            .map_err(|e| DisplayError::Backend(format!("Failed to create Pixels: {}", e)))?;

        debug!(
            "Pixels surface {}x{} in a {}x{} window",
            self.width, self.height, window_size.width, window_size.height
        );
        self.pixels = Some(pixels);
        Ok(())
    }

    /// Renders the current frame to the window.
    pub fn present(&mut self) -> Result<(), DisplayError> {
        self.pixels
            .as_mut()
            .ok_or(DisplayError::NotInitialized)?
            .render()
            .map_err(|e| DisplayError::Backend(format!("Render failed: {}", e)))
    }
}

impl<'win> DisplayBackend for PixelsBackend<'win> {
    fn native_format(&self) -> PixelFormat {
        PixelFormat::Rgba8888
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        // Already initialized via init_with_window()
        if self.pixels.is_some() {
            return Ok(());
        }

        Err(DisplayError::Backend(
            "PixelsBackend requires init_with_window() to be called before use".to_string(),
        ))
    }

    fn native_row(&mut self, y: usize) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let stride = PixelFormat::Rgba8888.row_stride_bytes(self.width);
        let frame = self.pixels.as_mut()?.frame_mut();
        frame.get_mut(y * stride..(y + 1) * stride)
    }

    fn draw_pixels(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        data: &[u8],
    ) -> Result<(), DisplayError> {
        if self.pixels.is_none() {
            return Err(DisplayError::NotInitialized);
        }

        let stride = PixelFormat::Rgba8888.row_stride_bytes(w);
        let offset = PixelFormat::Rgba8888.row_stride_bytes(x);
        for (j, src) in data.chunks(stride).take(h).enumerate() {
            let row = self
                .native_row(y + j)
                .ok_or(DisplayError::BufferUnavailable { y: y + j })?;
            row.get_mut(offset..offset + src.len())
                .ok_or(DisplayError::BufferUnavailable { y: y + j })?
                .copy_from_slice(src);
        }
        Ok(())
    }
}
