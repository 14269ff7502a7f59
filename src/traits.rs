use crate::{DisplayError, PixelFormat};

/// Destination side of a [`crate::Display`]: something that stores or shows
/// pixels in one native format.
pub trait DisplayBackend {
    fn native_format(&self) -> PixelFormat;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Acquires whatever the backend needs before the first draw.
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Backing storage of row `y`, if the backend exposes it.
    ///
    /// `None` is not an error; callers fall back to [`DisplayBackend::draw_pixels`].
    fn native_row(&mut self, _y: usize) -> Option<&mut [u8]> {
        None
    }

    /// Writes a `w` x `h` rectangle at (`x`, `y`).
    ///
    /// `data` holds `h` rows in the native format, each
    /// `native_format().row_stride_bytes(w)` bytes long and starting at slot 0.
    fn draw_pixels(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        data: &[u8],
    ) -> Result<(), DisplayError>;
}
