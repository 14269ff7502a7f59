use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, ImageData};

use crate::{DisplayBackend, DisplayError, PixelFormat};

/// Display backend for WASM using HTML Canvas 2D context
///
/// The canvas keeps its own pixels, so every write goes through
/// `putImageData` with RGBA8888 rows.
pub struct WasmCanvasBackend {
    ctx: CanvasRenderingContext2d,
    width: usize,
    height: usize,
}

impl WasmCanvasBackend {
    pub fn new(ctx: CanvasRenderingContext2d, width: usize, height: usize) -> Self {
        Self { ctx, width, height }
    }
}

impl DisplayBackend for WasmCanvasBackend {
    fn native_format(&self) -> PixelFormat {
        PixelFormat::Rgba8888
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
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

        let len = PixelFormat::Rgba8888.buffer_size(w, h);
        let image_data =
            ImageData::new_with_u8_clamped_array_and_sh(Clamped(&data[..len]), w as u32, h as u32)
                .map_err(|e| {
                    DisplayError::Backend(format!("Failed to create ImageData: {:?}", e))
                })?;

        self.ctx
            .put_image_data(&image_data, x as f64, y as f64)
            .map_err(|e| DisplayError::Backend(format!("Failed to put ImageData: {:?}", e)))
    }
}
