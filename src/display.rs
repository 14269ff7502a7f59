use log::{debug, error, info, trace};

use crate::bitblt::{bitblt, fill, BlitMode};
use crate::convert::color_to_pixel;
use crate::pixel::{ImageView, PixelSliceMut};
use crate::{Color, DisplayBackend, DisplayError, DisplayType, PixelFormat};

/// Rectangle in pixel coordinates, already clipped to the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// A clipped destination region and where it starts inside the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Clipped {
    region: Region,
    src_x: usize,
    src_y: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// Writing into the backend's own row storage.
    Direct,
    /// Writing into a scratch scanline handed to `draw_pixels`.
    Allocate,
}

fn clamp_axis(start: i32, len: usize, limit: usize) -> Option<(usize, usize, usize)> {
    let start = i64::from(start);
    let end = start.saturating_add(i64::try_from(len).unwrap_or(i64::MAX));
    let lo = start.max(0);
    let hi = end.min(i64::try_from(limit).unwrap_or(i64::MAX));
    if hi <= lo {
        return None;
    }
    Some((lo as usize, (hi - lo) as usize, (lo - start) as usize))
}

/// Region dispatcher in front of a [`DisplayBackend`].
///
/// Converts colors and source images to the backend's native format and writes
/// them row by row, directly into the backend's rows when it exposes them and
/// through converted scanlines otherwise.
pub struct Display<B: DisplayBackend> {
    backend: B,
    failed: bool,
    watchdog: Option<Box<dyn FnMut()>>,
}

impl<B: DisplayBackend> Display<B> {
    /// # Panics
    ///
    /// Panics if the backend's native format is not a destination format.
    pub fn new(backend: B) -> Self {
        let format = backend.native_format();
        assert!(
            format.is_destination(),
            "pixel format {format} cannot be a display's native format"
        );

        Self {
            backend,
            failed: false,
            watchdog: None,
        }
    }

    /// Initializes the backend. On failure the display is marked failed and
    /// refuses every later draw call.
    pub fn setup(&mut self) -> Result<(), DisplayError> {
        if let Err(err) = self.backend.init() {
            error!("Display setup failed: {err}");
            self.failed = true;
            return Err(err);
        }

        info!(
            "Display: {}x{}, format {}, type {:?}",
            self.width(),
            self.height(),
            self.native_format(),
            self.display_type()
        );
        Ok(())
    }

    /// Installs a hook called between rows of long operations.
    pub fn set_watchdog(&mut self, hook: impl FnMut() + 'static) {
        self.watchdog = Some(Box::new(hook));
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn native_format(&self) -> PixelFormat {
        self.backend.native_format()
    }

    pub fn display_type(&self) -> DisplayType {
        self.native_format().display_type()
    }

    pub fn width(&self) -> usize {
        self.backend.width()
    }

    pub fn height(&self) -> usize {
        self.backend.height()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Whether (`x`, `y`) lies on the display.
    pub fn clip(&self, x: i32, y: i32) -> bool {
        clamp_axis(x, 1, self.width()).is_some() && clamp_axis(y, 1, self.height()).is_some()
    }

    /// The part of a `width` x `height` rectangle at (`x`, `y`) that lies on
    /// the display, or `None` if nothing does.
    pub fn clip_rect(&self, x: i32, y: i32, width: usize, height: usize) -> Option<Region> {
        self.clamp(x, y, width, height).map(|clipped| clipped.region)
    }

    fn clamp(&self, x: i32, y: i32, width: usize, height: usize) -> Option<Clipped> {
        let (x, width, src_x) = clamp_axis(x, width, self.width())?;
        let (y, height, src_y) = clamp_axis(y, height, self.height())?;
        Some(Clipped {
            region: Region {
                x,
                y,
                width,
                height,
            },
            src_x,
            src_y,
        })
    }

    fn ensure_ready(&self) -> Result<(), DisplayError> {
        if self.failed {
            return Err(DisplayError::Failed);
        }
        Ok(())
    }

    fn feed_watchdog(&mut self) {
        if let Some(hook) = self.watchdog.as_mut() {
            hook();
        }
    }

    /// Hands `data` to the backend. Any backend error means no strategy is
    /// left for these rows and is reported as [`DisplayError::BufferUnavailable`].
    fn write_pixels(&mut self, region: Region, data: &[u8]) -> Result<(), DisplayError> {
        self.backend
            .draw_pixels(region.x, region.y, region.width, region.height, data)
            .map_err(|err| {
                error!(
                    "Writing {}x{} at ({}, {}) failed: {err}",
                    region.width, region.height, region.x, region.y
                );
                DisplayError::BufferUnavailable { y: region.y }
            })
    }

    /// Runs `render` for every row of `region`, first against the backend's
    /// rows and, from the first row the backend cannot expose, against a
    /// scratch scanline that is then written with `draw_pixels`.
    ///
    /// `render` receives the row buffer, the x at which the region starts in
    /// it, the row index inside the region and the strategy in use.
    fn draw_rows<F>(&mut self, region: Region, mut render: F) -> Result<(), DisplayError>
    where
        F: FnMut(PixelSliceMut<'_>, usize, usize, Strategy),
    {
        let format = self.native_format();
        let mut row = 0;

        while row < region.height {
            let Some(dst) = self.backend.native_row(region.y + row) else {
                break;
            };
            render(PixelSliceMut::new(format, dst), region.x, row, Strategy::Direct);
            row += 1;
            self.feed_watchdog();
        }

        if row == region.height {
            return Ok(());
        }

        debug!(
            "Direct access unavailable at row {}, writing {} remaining rows as scanlines",
            region.y + row,
            region.height - row
        );

        let mut scanline = vec![0u8; format.row_stride_bytes(region.width)];
        while row < region.height {
            render(PixelSliceMut::new(format, &mut scanline), 0, row, Strategy::Allocate);
            let line = Region {
                y: region.y + row,
                height: 1,
                ..region
            };
            self.write_pixels(line, &scanline)?;
            row += 1;
            self.feed_watchdog();
        }
        Ok(())
    }

    /// Draws `image` with its top-left corner at (`x`, `y`).
    ///
    /// Color-key sources (`A1`, `W1`) take `color_on` / `color_off` for set
    /// and clear bits. Transparent pixels of a source in another format leave
    /// the display untouched where the backend exposes its rows; a source in
    /// the native format is copied as is.
    pub fn draw_pixels_at(
        &mut self,
        x: i32,
        y: i32,
        image: ImageView<'_>,
        color_on: Color,
        color_off: Color,
    ) -> Result<(), DisplayError> {
        self.ensure_ready()?;

        let format = self.native_format();
        trace!(
            "draw_pixels_at: {}x{} at ({x}, {y}), format {} => {format}",
            image.width,
            image.height,
            image.format
        );

        let Some(Clipped {
            region,
            src_x,
            src_y,
        }) = self.clamp(x, y, image.width, image.height)
        else {
            return Ok(());
        };

        if image.format == format && src_x == 0 && region.width == image.width {
            let stride = image.stride();
            let rows = &image.data[src_y * stride..(src_y + region.height) * stride];
            self.write_pixels(region, rows)?;
            self.feed_watchdog();
            return Ok(());
        }

        // Same-format images are copied as is, whether delegated or clipped.
        let direct = BlitMode::new(format, image.format != format, color_on, color_off);
        let scanline = direct.with_transparency(false);
        self.draw_rows(region, |dst, dst_x, row, strategy| {
            let mode = match strategy {
                Strategy::Direct => &direct,
                Strategy::Allocate => &scanline,
            };
            bitblt(dst, dst_x, image.row(src_y + row), src_x, region.width, mode);
        })
    }

    /// Fills a `width` x `height` rectangle at (`x`, `y`) with `color`.
    pub fn filled_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
        color: Color,
    ) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        trace!("filled_rectangle: {width}x{height} at ({x}, {y}), {color:?}");

        let Some(Clipped { region, .. }) = self.clamp(x, y, width, height) else {
            return Ok(());
        };

        let pixel = color_to_pixel(color, self.native_format());
        self.draw_rows(region, |dst, dst_x, _, _| {
            fill(dst, dst_x, region.width, &pixel)
        })
    }

    /// Sets a single pixel; coordinates off the display are ignored.
    pub fn draw_pixel_at(&mut self, x: i32, y: i32, color: Color) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        let Some(Clipped { region, .. }) = self.clamp(x, y, 1, 1) else {
            return Ok(());
        };

        let format = self.native_format();
        let pixel = color_to_pixel(color, format);
        if let Some(row) = self.backend.native_row(region.y) {
            fill(PixelSliceMut::new(format, row), region.x, 1, &pixel);
        } else {
            self.write_pixels(region, pixel.as_bytes())?;
        }

        self.feed_watchdog();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::pixel::PixelSlice;
    use crate::FrameBuffer;

    /// Backend with configurable row exposure and write failures.
    struct MockBackend {
        format: PixelFormat,
        width: usize,
        height: usize,
        rows: Vec<u8>,
        direct_rows: usize,
        fail_writes: bool,
        fail_init: bool,
        writes: Vec<(usize, usize, usize, usize)>,
    }

    impl MockBackend {
        fn new(format: PixelFormat, width: usize, height: usize) -> Self {
            Self {
                format,
                width,
                height,
                rows: vec![0; format.buffer_size(width, height)],
                direct_rows: usize::MAX,
                fail_writes: false,
                fail_init: false,
                writes: Vec::new(),
            }
        }

        fn without_direct(mut self) -> Self {
            self.direct_rows = 0;
            self
        }

        fn stride(&self) -> usize {
            self.format.row_stride_bytes(self.width)
        }

        fn row(&self, y: usize) -> &[u8] {
            let stride = self.stride();
            &self.rows[y * stride..(y + 1) * stride]
        }
    }

    impl DisplayBackend for MockBackend {
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
            if self.fail_init {
                return Err(DisplayError::Backend("no panel".to_string()));
            }
            Ok(())
        }

        fn native_row(&mut self, y: usize) -> Option<&mut [u8]> {
            if y >= self.direct_rows {
                return None;
            }
            let stride = self.stride();
            Some(&mut self.rows[y * stride..(y + 1) * stride])
        }

        fn draw_pixels(
            &mut self,
            x: usize,
            y: usize,
            w: usize,
            h: usize,
            data: &[u8],
        ) -> Result<(), DisplayError> {
            if self.fail_writes {
                return Err(DisplayError::Backend(format!("bus error at row {y}")));
            }
            self.writes.push((x, y, w, h));

            let (format, stride) = (self.format, self.format.row_stride_bytes(w));
            for j in 0..h {
                let dst_stride = self.stride();
                let dst = &mut self.rows[(y + j) * dst_stride..(y + j + 1) * dst_stride];
                bitblt(
                    PixelSliceMut::new(format, dst),
                    x,
                    PixelSlice::new(format, &data[j * stride..(j + 1) * stride]),
                    0,
                    w,
                    &BlitMode::opaque(format),
                );
            }
            Ok(())
        }
    }

    fn display(backend: MockBackend) -> Display<MockBackend> {
        let mut display = Display::new(backend);
        display.setup().unwrap();
        display
    }

    #[test]
    fn test_display_creation() {
        let d = display(MockBackend::new(PixelFormat::Rgb565, 320, 200));
        assert_eq!(d.width(), 320);
        assert_eq!(d.height(), 200);
        assert_eq!(d.native_format(), PixelFormat::Rgb565);
        assert_eq!(d.display_type(), DisplayType::Color);
        assert!(!d.is_failed());
    }

    #[test]
    #[should_panic(expected = "cannot be a display's native format")]
    fn test_color_key_native_format_rejected() {
        Display::new(MockBackend::new(PixelFormat::W1, 8, 8));
    }

    #[test_log::test]
    fn test_failed_setup_refuses_draws() {
        let mut backend = MockBackend::new(PixelFormat::W8, 4, 4);
        backend.fail_init = true;
        let mut d = Display::new(backend);

        assert!(matches!(d.setup(), Err(DisplayError::Backend(_))));
        assert!(d.is_failed());
        assert!(matches!(
            d.filled_rectangle(0, 0, 4, 4, Color::WHITE),
            Err(DisplayError::Failed)
        ));
        assert!(matches!(
            d.draw_pixel_at(0, 0, Color::WHITE),
            Err(DisplayError::Failed)
        ));
        assert!(d.backend().rows.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_filled_rectangle_direct() {
        let mut d = display(MockBackend::new(PixelFormat::W8, 4, 3));
        d.filled_rectangle(1, 1, 2, 2, Color::gray(9)).unwrap();

        let b = d.backend();
        assert_eq!(b.row(0), &[0, 0, 0, 0]);
        assert_eq!(b.row(1), &[0, 9, 9, 0]);
        assert_eq!(b.row(2), &[0, 9, 9, 0]);
        assert!(b.writes.is_empty());
    }

    #[test]
    fn test_filled_rectangle_scanlines_match_direct() {
        for format in PixelFormat::DESTINATIONS {
            let mut direct = display(MockBackend::new(format, 7, 4));
            let mut scanline = display(MockBackend::new(format, 7, 4).without_direct());

            for d in [&mut direct, &mut scanline] {
                d.filled_rectangle(1, 1, 5, 2, Color::rgb(0xC0, 0x80, 0x40))
                    .unwrap();
            }

            assert_eq!(direct.backend().rows, scanline.backend().rows, "{format}");
            assert_eq!(scanline.backend().writes, vec![(1, 1, 5, 1), (1, 2, 5, 1)]);
        }
    }

    #[test]
    fn test_filled_rectangle_packed_partial_units() {
        let mut d = display(MockBackend::new(PixelFormat::W4, 6, 1));
        d.backend_mut().rows.copy_from_slice(&[0x11, 0x11, 0x11]);
        d.filled_rectangle(1, 0, 4, 1, Color::WHITE).unwrap();
        assert_eq!(d.backend().row(0), &[0xF1, 0xFF, 0x1F]);
    }

    #[test_log::test]
    fn test_direct_failure_partway_resumes_with_scanlines() {
        let mut backend = MockBackend::new(PixelFormat::Rgb888, 3, 5);
        backend.direct_rows = 2;
        let mut d = display(backend);

        d.filled_rectangle(0, 0, 3, 5, Color::rgb(1, 2, 3)).unwrap();

        let b = d.backend();
        assert_eq!(b.writes, vec![(0, 2, 3, 1), (0, 3, 3, 1), (0, 4, 3, 1)]);
        for y in 0..5 {
            assert_eq!(b.row(y), &[1, 2, 3, 1, 2, 3, 1, 2, 3], "row {y}");
        }
    }

    #[test]
    fn test_both_strategies_fail() {
        let mut backend = MockBackend::new(PixelFormat::W8, 2, 4);
        backend.direct_rows = 1;
        backend.fail_writes = true;
        let mut d = display(backend);

        let result = d.filled_rectangle(0, 0, 2, 4, Color::gray(5));
        assert!(matches!(result, Err(DisplayError::BufferUnavailable { y: 1 })));
        assert_eq!(d.backend().row(0), &[5, 5]);
        assert_eq!(d.backend().row(1), &[0, 0]);
    }

    #[test]
    fn test_failed_writes_report_buffer_unavailable() {
        let mut backend = MockBackend::new(PixelFormat::Rgb565, 4, 4).without_direct();
        backend.fail_writes = true;
        let mut d = display(backend);

        assert!(matches!(
            d.filled_rectangle(0, 2, 2, 2, Color::WHITE),
            Err(DisplayError::BufferUnavailable { y: 2 })
        ));
        assert!(matches!(
            d.draw_pixel_at(1, 3, Color::WHITE),
            Err(DisplayError::BufferUnavailable { y: 3 })
        ));

        let src = [0u8; 8];
        let image = ImageView::new(PixelFormat::Rgb565, 2, 2, &src);
        assert!(matches!(
            d.draw_pixels_at(0, 1, image, Color::WHITE, Color::BLACK),
            Err(DisplayError::BufferUnavailable { y: 1 })
        ));
    }

    #[test]
    fn test_same_format_transparency_independent_of_clipping() {
        let src = [
            1u8, 2, 3, 0xFF, // opaque
            4, 5, 6, 0x00, // transparent
            7, 8, 9, 0x10, // transparent
        ];
        let image = ImageView::new(PixelFormat::Rgba8888, 3, 1, &src);

        let mut whole = display(MockBackend::new(PixelFormat::Rgba8888, 3, 1));
        whole.draw_pixels_at(0, 0, image, Color::WHITE, Color::BLACK).unwrap();
        assert_eq!(whole.backend().row(0), &src);

        let mut clipped = display(MockBackend::new(PixelFormat::Rgba8888, 2, 1));
        clipped.backend_mut().rows.fill(0xAA);
        clipped.draw_pixels_at(-1, 0, image, Color::WHITE, Color::BLACK).unwrap();
        assert_eq!(clipped.backend().row(0), &src[4..]);
        assert!(clipped.backend().writes.is_empty());
    }

    #[test]
    fn test_zero_area_and_offscreen_are_noops() {
        let mut d = display(MockBackend::new(PixelFormat::W8, 4, 4).without_direct());
        d.filled_rectangle(0, 0, 0, 4, Color::WHITE).unwrap();
        d.filled_rectangle(0, 0, 4, 0, Color::WHITE).unwrap();
        d.filled_rectangle(4, 0, 2, 2, Color::WHITE).unwrap();
        d.filled_rectangle(-3, 0, 3, 2, Color::WHITE).unwrap();
        d.draw_pixel_at(-1, 2, Color::WHITE).unwrap();

        let image = ImageView::new(PixelFormat::W8, 0, 0, &[]);
        d.draw_pixels_at(0, 0, image, Color::WHITE, Color::BLACK).unwrap();

        assert!(d.backend().writes.is_empty());
        assert!(d.backend().rows.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_clip() {
        let d = display(MockBackend::new(PixelFormat::W8, 4, 2));
        assert!(d.clip(0, 0));
        assert!(d.clip(3, 1));
        assert!(!d.clip(4, 1));
        assert!(!d.clip(0, -1));
    }

    #[test]
    fn test_clamp_offsets_source() {
        let d = display(MockBackend::new(PixelFormat::W8, 4, 4));
        assert_eq!(
            d.clamp(-1, 2, 3, 5),
            Some(Clipped {
                region: Region {
                    x: 0,
                    y: 2,
                    width: 2,
                    height: 2
                },
                src_x: 1,
                src_y: 0,
            })
        );
        assert_eq!(d.clamp(-5, 0, 3, 3), None);
        assert_eq!(
            d.clip_rect(3, 3, 10, 10),
            Some(Region {
                x: 3,
                y: 3,
                width: 1,
                height: 1
            })
        );
    }

    #[test]
    fn test_gray_image_into_rgb565() {
        let mut d = display(MockBackend::new(PixelFormat::Rgb565, 6, 1));
        d.backend_mut().rows.fill(0xEE);

        let src = [200u8, 150, 0, 255];
        let image = ImageView::new(PixelFormat::W8, 4, 1, &src);
        d.draw_pixels_at(1, 0, image, Color::WHITE, Color::BLACK).unwrap();

        let row = d.backend().row(0);
        assert_eq!(&row[..2], &[0xEE, 0xEE]);
        assert_eq!(&row[10..], &[0xEE, 0xEE]);
        let expected = color_to_pixel(Color::gray(150), PixelFormat::Rgb565);
        assert_eq!(&row[4..6], expected.as_bytes());
    }

    #[test]
    fn test_same_format_delegates_to_backend() {
        let mut d = display(MockBackend::new(PixelFormat::Rgb565, 4, 4));
        let src = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let image = ImageView::new(PixelFormat::Rgb565, 2, 2, &src);
        d.draw_pixels_at(1, 2, image, Color::WHITE, Color::BLACK).unwrap();

        let b = d.backend();
        assert_eq!(b.writes, vec![(1, 2, 2, 2)]);
        assert_eq!(b.row(2), &[0, 0, 1, 2, 3, 4, 0, 0]);
        assert_eq!(b.row(3), &[0, 0, 5, 6, 7, 8, 0, 0]);
    }

    #[test]
    fn test_same_format_clipped_horizontally_uses_rows() {
        let mut d = display(MockBackend::new(PixelFormat::W8, 3, 1));
        let src = [1u8, 2, 3, 4];
        let image = ImageView::new(PixelFormat::W8, 4, 1, &src);
        d.draw_pixels_at(-1, 0, image, Color::WHITE, Color::BLACK).unwrap();

        assert!(d.backend().writes.is_empty());
        assert_eq!(d.backend().row(0), &[2, 3, 4]);
    }

    #[test]
    fn test_color_key_image() {
        let mut d = display(MockBackend::new(PixelFormat::Rgb888, 4, 1).without_direct());
        let src = [0b1001_0000u8];
        let image = ImageView::new(PixelFormat::W1, 4, 1, &src);
        d.draw_pixels_at(0, 0, image, Color::rgb(9, 8, 7), Color::rgb(1, 2, 3))
            .unwrap();
        assert_eq!(
            d.backend().row(0),
            &[9, 8, 7, 1, 2, 3, 1, 2, 3, 9, 8, 7]
        );
    }

    #[test]
    fn test_alpha_mask_direct_keeps_background() {
        let mut d = display(MockBackend::new(PixelFormat::W8, 4, 1));
        d.backend_mut().rows.fill(0x40);

        let image = ImageView::new(PixelFormat::A1, 4, 1, &[0b0110_0000]);
        d.draw_pixels_at(0, 0, image, Color::WHITE, Color::BLACK).unwrap();
        assert_eq!(d.backend().row(0), &[0x40, 0xFF, 0xFF, 0x40]);
    }

    #[test]
    fn test_transparent_pixels_skipped_directly() {
        let mut d = display(MockBackend::new(PixelFormat::Rgb565, 2, 1));
        d.backend_mut().rows.fill(0x33);

        let src = [0xFFu8, 0xFF, 0xFF, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let image = ImageView::new(PixelFormat::Rgba8888, 2, 1, &src);
        d.draw_pixels_at(0, 0, image, Color::WHITE, Color::BLACK).unwrap();
        assert_eq!(d.backend().row(0), &[0x33, 0x33, 0xFF, 0xFF]);
    }

    #[test]
    fn test_image_rows_offset_when_clipped_vertically() {
        let mut d = display(MockBackend::new(PixelFormat::Rgb888, 1, 2).without_direct());
        let src = [10u8, 20, 30, 40];
        let image = ImageView::new(PixelFormat::W8, 1, 4, &src);
        d.draw_pixels_at(0, -2, image, Color::WHITE, Color::BLACK).unwrap();

        assert_eq!(d.backend().row(0), &[30, 30, 30]);
        assert_eq!(d.backend().row(1), &[40, 40, 40]);
    }

    #[test]
    fn test_draw_pixel_at_both_paths() {
        for backend in [
            MockBackend::new(PixelFormat::W4, 4, 2),
            MockBackend::new(PixelFormat::W4, 4, 2).without_direct(),
        ] {
            let mut d = display(backend);
            d.draw_pixel_at(3, 1, Color::WHITE).unwrap();
            assert_eq!(d.backend().row(0), &[0, 0]);
            assert_eq!(d.backend().row(1), &[0, 0xF0]);
        }
    }

    #[test]
    fn test_watchdog_fed_per_row() {
        let fed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fed);

        let mut backend = MockBackend::new(PixelFormat::W8, 4, 6);
        backend.direct_rows = 3;
        let mut d = display(backend);
        d.set_watchdog(move || counter.set(counter.get() + 1));

        d.filled_rectangle(0, 0, 4, 6, Color::WHITE).unwrap();
        assert_eq!(fed.get(), 6);

        d.draw_pixel_at(0, 0, Color::BLACK).unwrap();
        assert_eq!(fed.get(), 7);
    }

    #[test]
    fn test_frame_buffer_as_backend() {
        let fb = FrameBuffer::new(3, 2, PixelFormat::Rgb332).unwrap();
        let mut d = Display::new(fb);
        d.setup().unwrap();
        d.filled_rectangle(0, 0, 3, 2, Color::rgb(0xFF, 0, 0xFF)).unwrap();
        assert_eq!(d.backend().data(), &[0b111_000_11; 6]);
    }

    #[test]
    fn test_frame_buffer_draws_into_other_display() {
        let mut source = Display::new(FrameBuffer::new(2, 2, PixelFormat::W4).unwrap());
        source.setup().unwrap();
        source.filled_rectangle(0, 0, 2, 2, Color::gray(0x88)).unwrap();
        source.draw_pixel_at(1, 1, Color::WHITE).unwrap();

        let mut target = display(MockBackend::new(PixelFormat::Rgb888, 2, 2));
        source.backend().draw_into(&mut target).unwrap();

        assert_eq!(target.backend().row(0), &[0x88; 6]);
        assert_eq!(target.backend().row(1), &[0x88, 0x88, 0x88, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_unallocated_frame_buffer_cannot_be_drawn() {
        let fb = FrameBuffer::new(2, 2, PixelFormat::W8).unwrap();
        let mut target = display(MockBackend::new(PixelFormat::W8, 2, 2));
        assert!(matches!(
            fb.draw_into(&mut target),
            Err(DisplayError::NotInitialized)
        ));
    }
}
