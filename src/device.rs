use crate::display::Ssd1306Display;
use crate::error::AppError;
use crate::glyphs;
use crate::sensor::{Dht22Sensor, FreeRtosDelay};
use bitglyph_core::framebuffer::FrameBuffer;
use bitglyph_core::typeset::{TypesetConfig, Typesetter};
use dht22_core::acquire::{acquire, Acquired, RetryPolicy};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::IOPin;
use esp_idf_svc::hal::i2c::I2cConfig;
use esp_idf_svc::hal::i2c::I2cDriver;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use log::{error, info};
use std::fmt::Write;
use std::time::{Duration, Instant};

/// Time between samples.
const SAMPLE_INTERVAL: Duration = Duration::from_secs(60);

/// Retry policy for one acquisition cycle.
const RETRY_POLICY: RetryPolicy = RetryPolicy {
  max_attempts: 10,
  retry_delay_ms: 250,
};

/// Decimal places shown on the display.
const DISPLAY_DECIMALS: u32 = 1;

/// Progress bar height in pixels.
const PROGRESS_BAR_HEIGHT: i32 = 4;

/// Time between progress bar redraws during the idle wait.
const PROGRESS_REDRAW_MS: u32 = 100;

/// The device manager interface.
pub struct DeviceManager<'a> {
  /// The SSD1306 display.
  display: Ssd1306Display<'a>,

  /// The DHT-22 sensor.
  sensor: Dht22Sensor<'a>,

  /// The framebuffer every frame is composed in.
  frame: FrameBuffer,

  /// The glyph typesetter.
  typesetter: Typesetter,
}

/// The device manager implementation.
impl<'a> DeviceManager<'a> {
  /// Create a new device manager.
  ///
  /// # Parameters
  /// - `peripherals`: The ESP32 peripherals.
  ///
  /// # Returns
  /// The device manager.
  pub fn new(peripherals: Peripherals) -> Result<Self, AppError> {
    let config = I2cConfig::default().baudrate(100.kHz().into());

    let sda = peripherals.pins.gpio8;

    let scl = peripherals.pins.gpio9;

    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &config)
      .map_err(|e| AppError::I2cError(format!("Failed to initialize I2C: {:?}", e)))?;

    // Initialize display; a missing display is fatal at startup
    let mut display = Ssd1306Display::new(i2c);
    display.probe()?;
    display.init()?;

    // Blank the panel before the first reading arrives
    let frame = FrameBuffer::new();
    display.flush(&frame)?;

    // Initialize sensor
    let sensor = Dht22Sensor::new(peripherals.pins.gpio6.downgrade())?;

    // Load glyphs
    let glyph_set = glyphs::load_glyph_set()?;
    let typesetter = Typesetter::new(glyph_set, TypesetConfig::default());

    Ok(Self {
      display,
      sensor,
      frame,
      typesetter,
    })
  }

  /// Run one full loop iteration: acquire, render, then idle-wait with the
  /// progress bar until the next sample is due.
  ///
  /// # Returns
  /// The result of the operation.
  pub fn update(&mut self) -> Result<(), AppError> {
    let cycle_start = Instant::now();

    let mut delay = FreeRtosDelay;

    match acquire(&mut self.sensor, &mut delay, RETRY_POLICY, DISPLAY_DECIMALS) {
      Acquired::Reading { reading, attempts } => {
        info!(
          "Acquired {:.1} degrees F after {} attempt(s)",
          reading.temperature_f, attempts
        );

        self.show_reading(reading.temperature_f)?;
      }
      Acquired::NoReading { attempts } => {
        // Keep the previous frame rather than invent a value.
        error!("No reading after {} attempts; skipping this frame", attempts);
      }
    }

    // Idle-wait, showing elapsed time toward the next sample.
    loop {
      let elapsed = cycle_start.elapsed();

      if elapsed >= SAMPLE_INTERVAL {
        break;
      }

      let fraction = elapsed.as_secs_f32() / SAMPLE_INTERVAL.as_secs_f32();

      self.typesetter
        .progress_bar(fraction, PROGRESS_BAR_HEIGHT, &mut self.frame);
      self.display.flush(&self.frame)?;

      FreeRtos::delay_ms(PROGRESS_REDRAW_MS);
    }

    Ok(())
  }

  /// Render one temperature reading and flush it to the display.
  ///
  /// # Parameters
  /// - `temperature_f`: The rounded temperature in degrees Fahrenheit.
  ///
  /// # Returns
  /// The result of the operation.
  fn show_reading(&mut self, temperature_f: f32) -> Result<(), AppError> {
    let mut text: heapless::String<16> = heapless::String::new();

    write!(text, "{:.*}", DISPLAY_DECIMALS as usize, temperature_f)
      .map_err(|_| AppError::RenderError(format!(
        "Formatted reading for {:?} does not fit the text buffer",
        temperature_f
      )))?;

    self.frame.clear();

    match self.typesetter.render(&text, &mut self.frame) {
      Ok(()) => self.display.flush(&self.frame)?,
      Err(e) => {
        // A rejected string leaves the framebuffer unflushed, so the
        // previous frame stays on screen.
        error!("Refusing to render \"{}\": {}", text, e);
      }
    }

    Ok(())
  }
}
