use crate::error::AppError;
use dht22_core::acquire::{Delay, Sample};
use dht22_core::dht22::{parse_frame, Measurement, ParseError};
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, InputOutput, PinDriver, Pull};
use esp_idf_svc::sys::EspError;
use std::fmt;
use std::time::{Duration, Instant};

/// Host start pulse width in microseconds. The datasheet asks for at least
/// one millisecond of low time to wake the sensor.
const START_PULSE_US: u32 = 1200;

/// Timeout for the bus to settle high after the start pulse.
const RELEASE_TIMEOUT: Duration = Duration::from_micros(60);

/// Timeout for each phase of the sensor's 80 us presence response.
const RESPONSE_TIMEOUT: Duration = Duration::from_micros(120);

/// Timeout for the 50 us low gap before each data bit.
const BIT_GAP_TIMEOUT: Duration = Duration::from_micros(80);

/// Timeout for each data bit's high pulse.
const BIT_PULSE_TIMEOUT: Duration = Duration::from_micros(110);

/// High pulses longer than this are ones; shorter ones are zeros.
const BIT_ONE_THRESHOLD: Duration = Duration::from_micros(50);

/// A single failed DHT-22 transaction.
#[derive(Debug)]
pub enum SensorFault {
  /// The wire did not reach the expected level in time.
  Timeout { phase: &'static str },

  /// The GPIO driver rejected a level change.
  Gpio(EspError),

  /// The received frame failed validation.
  Frame(ParseError),
}

/// Implement the `Display` trait for `SensorFault`.
impl fmt::Display for SensorFault {
  /// Format the fault message.
  ///
  /// # Parameters
  /// - `f`: The formatter.
  ///
  /// # Returns
  /// The result of the operation.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SensorFault::Timeout { phase } => write!(f, "Timed out waiting for {}", phase),
      SensorFault::Gpio(e) => write!(f, "GPIO error on the sensor wire: {:?}", e),
      SensorFault::Frame(e) => write!(f, "Frame rejected: {}", e),
    }
  }
}

/// DHT-22 sensor interface.
///
/// The sensor speaks a single-wire protocol on one open-drain GPIO: the host
/// holds the wire low to request a measurement, then the sensor answers with
/// a presence pulse and 40 pulse-width-coded data bits.
pub struct Dht22Sensor<'a> {
  /// The open-drain data pin.
  pin: PinDriver<'a, AnyIOPin, InputOutput>,
}

/// The DHT-22 sensor implementation.
impl<'a> Dht22Sensor<'a> {
  /// Create a new DHT-22 sensor.
  ///
  /// # Parameters
  /// - `pin`: The data pin the sensor is wired to.
  ///
  /// # Returns
  /// The DHT-22 sensor.
  pub fn new(pin: AnyIOPin) -> Result<Self, AppError> {
    let mut pin = PinDriver::input_output_od(pin)?;
    pin.set_pull(Pull::Up)?;
    pin.set_high()?;

    Ok(Self { pin })
  }

  /// Read one raw 5-byte frame off the wire.
  ///
  /// # Returns
  /// The frame bytes, or the first fault on the wire.
  fn read_frame(&mut self) -> Result<[u8; 5], SensorFault> {
    // Wake the sensor, then release the wire to the pull-up.
    self.pin.set_low().map_err(SensorFault::Gpio)?;
    Ets::delay_us(START_PULSE_US);
    self.pin.set_high().map_err(SensorFault::Gpio)?;

    // Presence response: the sensor takes the wire low for ~80 us, then
    // high for ~80 us, before the first bit.
    self.wait_while(true, RELEASE_TIMEOUT, "bus release")?;
    self.wait_while(false, RESPONSE_TIMEOUT, "presence low pulse")?;
    self.wait_while(true, RESPONSE_TIMEOUT, "presence high pulse")?;

    let mut frame = [0u8; 5];

    for bit in 0..40 {
      self.wait_while(false, BIT_GAP_TIMEOUT, "bit gap")?;

      // The high pulse width encodes the bit value.
      let pulse = self.wait_while(true, BIT_PULSE_TIMEOUT, "bit pulse")?;

      if pulse > BIT_ONE_THRESHOLD {
        frame[bit / 8] |= 0x80 >> (bit % 8);
      }
    }

    Ok(frame)
  }

  /// Busy-wait while the wire holds a level, returning how long it held.
  ///
  /// # Parameters
  /// - `high`: The level to wait out.
  /// - `timeout`: How long the level may legally last.
  /// - `phase`: The protocol phase, reported on timeout.
  ///
  /// # Returns
  /// How long the level was held.
  fn wait_while(
    &self,
    high: bool,
    timeout: Duration,
    phase: &'static str
  ) -> Result<Duration, SensorFault> {
    let start = Instant::now();

    loop {
      let held = if high { self.pin.is_high() } else { self.pin.is_low() };

      if !held {
        return Ok(start.elapsed());
      }

      if start.elapsed() > timeout {
        return Err(SensorFault::Timeout { phase });
      }
    }
  }
}

/// Implement the `Sample` trait for `Dht22Sensor`.
impl Sample for Dht22Sensor<'_> {
  type Fault = SensorFault;

  /// Perform one complete measurement transaction.
  ///
  /// # Returns
  /// The decoded measurement, or the first fault.
  fn sample(&mut self) -> Result<Measurement, SensorFault> {
    let frame = self.read_frame()?;

    parse_frame(&frame).map_err(SensorFault::Frame)
  }
}

/// FreeRTOS-backed delay source for the retry engine.
pub struct FreeRtosDelay;

/// Implement the `Delay` trait for `FreeRtosDelay`.
impl Delay for FreeRtosDelay {
  /// Block the calling task.
  ///
  /// # Parameters
  /// - `ms`: The number of milliseconds to block.
  fn delay_ms(&mut self, ms: u32) {
    FreeRtos::delay_ms(ms);
  }
}
