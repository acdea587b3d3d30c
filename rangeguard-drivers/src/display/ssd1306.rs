//! SSD1306 OLED display driver
//!
//! Driver for 128x64 SSD1306-based OLED displays via I2C.
//! Renders the three-line monitor frame with the 6x10 font, one line every
//! 16 pixels (21 chars per line).
//!
//! Drawing only touches the local frame buffer; [`DisplayRenderer::flush`]
//! sends the whole buffer page by page.

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;
use rangeguard_core::format::Frame;
use rangeguard_core::traits::{DisplayError, DisplayRenderer};

/// SSD1306 I2C address (typically 0x3C or 0x3D)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Display dimensions
const WIDTH: usize = 128;
const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Vertical distance between frame lines (pixels)
const LINE_PITCH: i32 = 16;

/// Control byte: command follows
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte: display data follows
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Power-up command sequence
const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80, // Default clock
    cmd::SET_MUX_RATIO,
    0x3F, // 64 lines
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14, // Enable charge pump
    cmd::SET_MEMORY_MODE,
    0x02,                  // Page addressing
    cmd::SET_SEG_REMAP,    // Flip horizontally
    cmd::SET_COM_SCAN_DEC, // Flip vertically
    cmd::SET_COM_PINS,
    0x12, // Alternative COM config
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::DISPLAY_RAM,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// 1-bit frame buffer organized as pages of 8 vertical pixels
pub struct FrameBuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    /// Clear every pixel
    pub fn clear(&mut self) {
        for page in self.pages.iter_mut() {
            page.fill(0);
        }
    }

    /// Check if a pixel is lit (out-of-bounds pixels are dark)
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }

    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let byte = &mut self.pages[y / 8][x];
        if on {
            *byte |= 1 << (y % 8);
        } else {
            *byte &= !(1 << (y % 8));
        }
    }

    /// Raw page data
    pub fn page(&self, page: usize) -> &[u8; WIDTH] {
        &self.pages[page]
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x < WIDTH && y < HEIGHT {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    buffer: FrameBuffer,
    initialized: bool,
}

impl<I2C: I2c> Ssd1306<I2C> {
    /// Create a new SSD1306 driver
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            buffer: FrameBuffer::new(),
            initialized: false,
        }
    }

    /// Initialize the display
    ///
    /// Also called from `flush` if the panel has not come up yet.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        for &c in INIT_SEQUENCE {
            self.command(c)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Send a command to the display
    fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[CONTROL_COMMAND, cmd])
    }

    /// Send the frame buffer to the display
    fn write_buffer(&mut self) -> Result<(), I2C::Error> {
        for page in 0..PAGES {
            self.command(cmd::SET_PAGE_ADDR | page as u8)?;
            self.command(cmd::SET_LOW_COLUMN)?;
            self.command(cmd::SET_HIGH_COLUMN)?;

            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(self.buffer.page(page));
            self.i2c.write(self.address, &data)?;
        }
        Ok(())
    }

    /// Check if the init sequence has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), I2C::Error> {
        self.command(cmd::SET_CONTRAST)?;
        self.command(contrast)
    }
}

impl<I2C: I2c> DisplayRenderer for Ssd1306<I2C> {
    fn draw(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

        self.buffer.clear();
        for (row, line) in frame.lines().iter().enumerate() {
            let origin = Point::new(0, row as i32 * LINE_PITCH);
            // Infallible target
            let _ = Text::with_baseline(line, origin, style, Baseline::Top).draw(&mut self.buffer);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            self.init().map_err(|_| DisplayError::Bus)?;
        }
        self.write_buffer().map_err(|_| DisplayError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
    use rangeguard_core::reading::{classify, OperatingStatus, Thresholds};

    #[derive(Default)]
    struct MockI2c {
        writes: Vec<Vec<u8>>,
        fail: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            assert_eq!(address, DEFAULT_ADDRESS);
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push(bytes.to_vec());
                }
            }
            Ok(())
        }
    }

    fn frame(cm: Option<u16>) -> Frame {
        let classification = classify(cm, &Thresholds::default());
        Frame::for_classification("DISTANCE MONITOR", &classification, OperatingStatus::Close)
    }

    fn lit_in_rows(buffer: &FrameBuffer, rows: core::ops::Range<usize>) -> usize {
        rows.flat_map(|y| (0..WIDTH).map(move |x| (x, y)))
            .filter(|&(x, y)| buffer.pixel(x, y))
            .count()
    }

    #[test]
    fn test_draw_three_lines() {
        let mut display = Ssd1306::new(MockI2c::default(), DEFAULT_ADDRESS);
        display.draw(&frame(Some(42))).unwrap();

        let buffer = display.buffer();
        assert!(lit_in_rows(buffer, 0..10) > 0);
        assert!(lit_in_rows(buffer, 16..26) > 0);
        assert!(lit_in_rows(buffer, 32..42) > 0);
        assert_eq!(lit_in_rows(buffer, 48..64), 0);

        // Nothing sent until flush
        assert!(display.i2c.writes.is_empty());
    }

    #[test]
    fn test_draw_replaces_previous_frame() {
        let mut display = Ssd1306::new(MockI2c::default(), DEFAULT_ADDRESS);
        display.draw(&frame(Some(150))).unwrap();
        let before = *display.buffer().page(2);

        display.draw(&frame(None)).unwrap();
        assert_ne!(*display.buffer().page(2), before);
        // Title line unchanged
        assert!(lit_in_rows(display.buffer(), 0..10) > 0);
    }

    #[test]
    fn test_first_flush_initializes() {
        let mut display = Ssd1306::new(MockI2c::default(), DEFAULT_ADDRESS);
        display.show(&frame(Some(5))).unwrap();
        assert!(display.is_initialized());

        let writes = &display.i2c.writes;
        assert_eq!(writes[0], vec![CONTROL_COMMAND, cmd::DISPLAY_OFF]);
        assert_eq!(writes.len(), INIT_SEQUENCE.len() + PAGES * 4);

        // Each page: three address commands then 128 data bytes
        let page0 = INIT_SEQUENCE.len();
        assert_eq!(writes[page0], vec![CONTROL_COMMAND, cmd::SET_PAGE_ADDR]);
        assert_eq!(writes[page0 + 3].len(), WIDTH + 1);
        assert_eq!(writes[page0 + 3][0], CONTROL_DATA);
    }

    #[test]
    fn test_second_flush_skips_init() {
        let mut display = Ssd1306::new(MockI2c::default(), DEFAULT_ADDRESS);
        display.show(&frame(Some(5))).unwrap();
        display.i2c.writes.clear();

        display.flush().unwrap();
        assert_eq!(display.i2c.writes.len(), PAGES * 4);
    }

    #[test]
    fn test_bus_error() {
        let mut display = Ssd1306::new(MockI2c::default(), DEFAULT_ADDRESS);
        display.i2c.fail = true;
        assert_eq!(display.show(&frame(Some(5))), Err(DisplayError::Bus));
        assert!(!display.is_initialized());

        // Panel comes back: next flush retries init
        display.i2c.fail = false;
        assert_eq!(display.flush(), Ok(()));
        assert!(display.is_initialized());
    }

    #[test]
    fn test_out_of_bounds_pixels_ignored() {
        let mut buffer = FrameBuffer::new();
        let pixels = [
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(128, 0), BinaryColor::On),
            Pixel(Point::new(0, 64), BinaryColor::On),
            Pixel(Point::new(3, 9), BinaryColor::On),
        ];
        buffer.draw_iter(pixels).unwrap();
        assert!(buffer.pixel(3, 9));
        assert_eq!(buffer.page(1)[3], 0b10);
        assert_eq!(lit_in_rows(&buffer, 0..64), 1);
    }
}
