mod bitblt;
mod buffer;
mod color;
mod config;
mod convert;
mod display;
mod error;
mod format;
pub mod pixel;
mod traits;

pub mod backends;

pub use bitblt::{bitblt, fill, BlitMode};
pub use buffer::FrameBuffer;
pub use color::{approx_white, Color};
pub use config::FrameBufferConfig;
pub use convert::{color_to_pixel, convert_pixel, pixel_to_color, rescale};
pub use display::{Display, Region};
pub use error::DisplayError;
pub use format::{DisplayType, FormatDescriptor, PixelFormat};
pub use pixel::{Channels, ImageView, Pixel, PixelSlice, PixelSliceMut, PixelValue};
pub use traits::DisplayBackend;
