#[cfg(feature = "pixels-backend")]
pub mod pixels;

#[cfg(feature = "pixels-backend")]
pub use pixels::PixelsBackend;

#[cfg(feature = "wasm-canvas-backend")]
pub mod wasm_canvas;

#[cfg(feature = "wasm-canvas-backend")]
pub use wasm_canvas::WasmCanvasBackend;
