use thiserror::Error;

use crate::PixelFormat;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Could not allocate {bytes} bytes for framebuffer")]
    AllocationFailed { bytes: usize },
    #[error("Display is marked failed")]
    Failed,
    #[error("Backend not initialized")]
    NotInitialized,
    #[error("Buffer unavailable at row {y}")]
    BufferUnavailable { y: usize },
    #[error("Pixel format {0} cannot be used as a display format")]
    UnsupportedFormat(PixelFormat),
    #[error("Unknown pixel format: {0}")]
    UnknownFormat(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "wasm-canvas-backend")]
impl From<DisplayError> for wasm_bindgen::JsValue {
    fn from(err: DisplayError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
