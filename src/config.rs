//! Serializable framebuffer settings.
//!
//! Every field has a default, so a partial document such as
//! `{"format": "w4"}` describes a complete configuration.

use serde::{Deserialize, Serialize};

use crate::{Display, DisplayError, FrameBuffer, PixelFormat};

/// Geometry and native format of an in-memory framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameBufferConfig {
    pub width: usize,
    pub height: usize,
    /// Canonical format name, matched case-insensitively.
    pub format: PixelFormat,
}

impl Default for FrameBufferConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 240,
            format: PixelFormat::Rgb565,
        }
    }
}

impl FrameBufferConfig {
    /// Creates the framebuffer without allocating it.
    pub fn build(&self) -> Result<FrameBuffer, DisplayError> {
        FrameBuffer::new(self.width, self.height, self.format)
    }

    /// Creates the framebuffer and a set-up display in front of it.
    pub fn build_display(&self) -> Result<Display<FrameBuffer>, DisplayError> {
        let mut display = Display::new(self.build()?);
        display.setup()?;
        Ok(display)
    }
}
