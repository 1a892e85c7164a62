use crate::error::AppError;
use bitglyph_core::framebuffer::{FrameBuffer, DISPLAY_WIDTH, PAGE_COUNT};
use esp_idf_svc::hal::i2c::I2cDriver;

/// Initialization sequence.
const INIT_SEQUENCE: &[u8] = &[
  0xae, // display off
  0xd5, // set display clock
  0x80, //
  0xa8, // set multiplex ratio
  0x3f, //
  0xd3, // set display offset
  0x00, // no offset
  0x40, // set start line
  0x8d, // charge pump
  0x14, // enable charge pump
  0x20, // memory mode
  0x00, // horizontal addressing
  0xa1, // segment remap
  0xc8, // com scan direction
  0xda, // set com pins
  0x12, //
  0x81, // set contrast
  0xcf, //
  0xd9, // set precharge
  0xf1, //
  0xdb, // set vcom detect
  0x40, //
  0xa4, // display all on resume
  0xa6, // normal display
  0xaf, // display on
];

/// SSD1306 I2C address.
const SSD1306_ADDRESS: u8 = 0x3c;

/// SSD1306 display interface.
pub struct Ssd1306Display<'a> {
  /// The I2C driver.
  i2c: I2cDriver<'a>,
}

/// The SSD1306 display implementation.
impl<'a> Ssd1306Display<'a> {
  /// Create a new SSD1306 display.
  ///
  /// # Parameters
  /// - `i2c`: The I2C driver. The display is the bus's only device and owns
  ///   it outright.
  ///
  /// # Returns
  /// The SSD1306 display.
  pub fn new(i2c: I2cDriver<'a>) -> Self {
    Self { i2c }
  }

  /// Check that a display answers on the bus.
  ///
  /// A missing display is a startup precondition failure; the caller is
  /// expected to terminate on it.
  ///
  /// # Returns
  /// The result of the operation.
  pub fn probe(&mut self) -> Result<(), AppError> {
    let mut status = [0u8; 1];

    self.i2c.read(SSD1306_ADDRESS, &mut status, 100)
      .map_err(|e| AppError::DisplayError(format!(
        "SSD1306 OLED display not detected at address 0x{:02x}: {:?}",
        SSD1306_ADDRESS, e
      )))?;

    Ok(())
  }

  /// Initialize the display.
  ///
  /// # Returns
  /// The result of the operation.
  pub fn init(&mut self) -> Result<(), AppError> {
    for &cmd in INIT_SEQUENCE {
      self.write_command(cmd)?;
    }

    Ok(())
  }

  /// Push the framebuffer's contents to the physical display.
  ///
  /// # Parameters
  /// - `frame`: The framebuffer to flush.
  ///
  /// # Returns
  /// The result of the operation.
  pub fn flush(&mut self, frame: &FrameBuffer) -> Result<(), AppError> {
    for page in 0..PAGE_COUNT {
      self.set_cursor(0, page as u8)?;
      self.write_page(frame.page(page))?;
    }

    Ok(())
  }

  /// Write a command to the display.
  ///
  /// # Parameters
  /// - `cmd`: The command.
  ///
  /// # Returns
  /// The result of the operation.
  fn write_command(&mut self, cmd: u8) -> Result<(), AppError> {
    self.i2c.write(SSD1306_ADDRESS, &[0x00, cmd], 100)
      .map_err(|e| AppError::DisplayError(format!(
        "Failed to write command 0x{:02x} to display at address 0x{:02x}: {:?}",
        cmd, SSD1306_ADDRESS, e
      )))
  }

  /// Write one page row of pixel data to the display.
  ///
  /// # Parameters
  /// - `page`: The page bytes, one byte per column.
  ///
  /// # Returns
  /// The result of the operation.
  fn write_page(&mut self, page: &[u8]) -> Result<(), AppError> {
    let mut burst = [0u8; DISPLAY_WIDTH + 1];
    burst[0] = 0x40;
    burst[1..].copy_from_slice(page);

    self.i2c.write(SSD1306_ADDRESS, &burst, 100)
      .map_err(|e| AppError::DisplayError(format!(
        "Failed to write page data to display at address 0x{:02x}: {:?}",
        SSD1306_ADDRESS, e
      )))
  }

  /// Set the cursor position.
  ///
  /// # Parameters
  /// - `x`: The X position.
  /// - `page`: The page.
  ///
  /// # Returns
  /// The result of the operation.
  fn set_cursor(&mut self, x: u8, page: u8) -> Result<(), AppError> {
    self.write_command(0xb0 | page)?; // Set page
    self.write_command(x & 0xf)?; // Set lower column start address
    self.write_command(0x10 | (x >> 4))?; // Set higher column start address

    Ok(())
  }
}
