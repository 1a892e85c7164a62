/// Measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Relative humidity in percent.
    pub humidity_percent: f32,

    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
}

/// Parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid buffer length.
    InvalidLength { expected: usize, actual: usize },

    /// Checksum mismatch.
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Frame contains only zero bytes.
    AllZeros,

    /// Humidity outside the sensor's measurable range.
    HumidityOutOfRange { tenths: u16 },

    /// Temperature outside the sensor's measurable range.
    TemperatureOutOfRange { tenths: i16 },
}

/// Implementation of the `Display` trait for `ParseError`.
impl core::fmt::Display for ParseError {
    /// Format the error message.
    ///
    /// # Arguments
    /// * `f` - The formatter to write the error message to.
    ///
    /// # Returns
    /// * `core::fmt::Result` - The result of the formatting operation.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::InvalidLength { expected, actual } => {
                write!(
                    f,
                    "Invalid frame length: expected {expected}, got {actual}"
                )
            }
            ParseError::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "Checksum mismatch: expected 0x{expected:02x}, got 0x{actual:02x}"
                )
            }
            ParseError::AllZeros => write!(f, "Frame contains only zero bytes"),
            ParseError::HumidityOutOfRange { tenths } => {
                write!(f, "Humidity reading out of range: {tenths} tenths %RH")
            }
            ParseError::TemperatureOutOfRange { tenths } => {
                write!(f, "Temperature reading out of range: {tenths} tenths degrees C")
            }
        }
    }
}

/// Implementation of the `Error` trait for `ParseError`.
impl std::error::Error for ParseError {}

/// Maximum humidity the sensor can report, in tenths of %RH.
const HUMIDITY_MAX_TENTHS: u16 = 1000;

/// Temperature limits of the sensor, in tenths of degrees Celsius.
const TEMPERATURE_MIN_TENTHS: i16 = -400;
const TEMPERATURE_MAX_TENTHS: i16 = 800;

/// Additive checksum over the four data bytes of a frame.
///
/// # Arguments
/// * `data` - The data bytes to sum.
///
/// # Returns
/// * `u8` - The checksum value.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// The DHT-22 transmits measurements as 5 bytes:
/// `RH(2) + T(2) + CHECKSUM(1)`.
///
/// Humidity and temperature are big-endian integers scaled by ten. The
/// temperature word is sign-magnitude: bit 15 set means below zero.
///
/// # Arguments
/// * `buffer` - The buffer containing the frame data.
///
/// # Returns
/// * `Result<Measurement, ParseError>` - The parsed measurement or an error.
pub fn parse_frame(buffer: &[u8]) -> Result<Measurement, ParseError> {
    if buffer.len() != 5 {
        return Err(ParseError::InvalidLength {
            expected: 5,
            actual: buffer.len(),
        });
    }

    let expected = buffer[4];

    let actual = checksum(&buffer[0..4]);

    if expected != actual {
        return Err(ParseError::ChecksumMismatch { expected, actual });
    }

    if buffer.iter().all(|&byte| byte == 0) {
        return Err(ParseError::AllZeros);
    }

    let humidity_tenths = u16::from_be_bytes([buffer[0], buffer[1]]);

    let temperature_raw = u16::from_be_bytes([buffer[2], buffer[3]]);

    // Sign-magnitude encoding for sub-zero temperatures.
    let magnitude = (temperature_raw & 0x7fff) as i16;
    let temperature_tenths = if temperature_raw & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    };

    if humidity_tenths > HUMIDITY_MAX_TENTHS {
        return Err(ParseError::HumidityOutOfRange {
            tenths: humidity_tenths,
        });
    }

    if !(TEMPERATURE_MIN_TENTHS..=TEMPERATURE_MAX_TENTHS).contains(&temperature_tenths) {
        return Err(ParseError::TemperatureOutOfRange {
            tenths: temperature_tenths,
        });
    }

    Ok(Measurement {
        humidity_percent: humidity_tenths as f32 / 10.0,
        temperature_c: temperature_tenths as f32 / 10.0,
    })
}

/// Convert a Celsius temperature to Fahrenheit.
///
/// # Arguments
/// * `celsius` - The temperature in degrees Celsius.
///
/// # Returns
/// * `f32` - The temperature in degrees Fahrenheit, unrounded.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Round a value to a fixed number of fractional digits, ties away from zero.
///
/// # Arguments
/// * `value` - The value to round.
/// * `decimals` - The number of fractional digits to keep.
///
/// # Returns
/// * `f32` - The rounded value.
pub fn round_to(value: f32, decimals: u32) -> f32 {
    let factor = 10f32.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Tests.
#[cfg(test)]
mod tests {
    use super::*;

    fn frame(humidity_tenths: u16, temperature_raw: u16) -> [u8; 5] {
        let rh = humidity_tenths.to_be_bytes();
        let t = temperature_raw.to_be_bytes();
        let sum = checksum(&[rh[0], rh[1], t[0], t[1]]);
        [rh[0], rh[1], t[0], t[1], sum]
    }

    #[test]
    fn checksum_wraps_at_byte_boundary() {
        assert_eq!(checksum(&[0xff, 0x02]), 0x01);
        assert_eq!(checksum(&[0x02, 0x8c, 0x01, 0x11]), 0xa0);
    }

    #[test]
    fn parse_frame_ok() {
        // 65.2 %RH, 27.3 degrees C
        let m = parse_frame(&frame(652, 273)).unwrap();
        assert!((m.humidity_percent - 65.2).abs() < 1e-5);
        assert!((m.temperature_c - 27.3).abs() < 1e-5);
    }

    #[test]
    fn parse_frame_negative_temperature() {
        // Bit 15 set: -10.1 degrees C
        let m = parse_frame(&frame(331, 0x8000 | 101)).unwrap();
        assert!((m.temperature_c - (-10.1)).abs() < 1e-5);
    }

    #[test]
    fn parse_frame_checksum_error() {
        let mut buffer = frame(652, 273);
        buffer[4] ^= 0xff;

        assert_eq!(
            parse_frame(&buffer),
            Err(ParseError::ChecksumMismatch {
                expected: 0xa0 ^ 0xff,
                actual: 0xa0
            })
        );
    }

    #[test]
    fn parse_frame_all_zeros() {
        // The zero frame carries a valid checksum, so it needs its own check.
        assert_eq!(parse_frame(&[0u8; 5]), Err(ParseError::AllZeros));
    }

    #[test]
    fn parse_frame_humidity_out_of_range() {
        assert_eq!(
            parse_frame(&frame(1001, 200)),
            Err(ParseError::HumidityOutOfRange { tenths: 1001 })
        );
    }

    #[test]
    fn parse_frame_temperature_out_of_range() {
        assert_eq!(
            parse_frame(&frame(500, 801)),
            Err(ParseError::TemperatureOutOfRange { tenths: 801 })
        );

        assert_eq!(
            parse_frame(&frame(500, 0x8000 | 401)),
            Err(ParseError::TemperatureOutOfRange { tenths: -401 })
        );

        // Both limits are themselves valid.
        assert!(parse_frame(&frame(500, 800)).is_ok());
        assert!(parse_frame(&frame(500, 0x8000 | 400)).is_ok());
    }

    #[test]
    fn parse_frame_invalid_length() {
        assert_eq!(
            parse_frame(&[]),
            Err(ParseError::InvalidLength {
                expected: 5,
                actual: 0
            })
        );

        assert_eq!(
            parse_frame(&[0u8; 4]),
            Err(ParseError::InvalidLength {
                expected: 5,
                actual: 4
            })
        );

        assert_eq!(
            parse_frame(&[0u8; 6]),
            Err(ParseError::InvalidLength {
                expected: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn conversion_exact_values() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 1e-5);
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 1e-5);
        assert!((celsius_to_fahrenheit(-40.0) - (-40.0)).abs() < 1e-5);
    }

    #[test]
    fn rounding_ties_away_from_zero() {
        // 22.5 C converts to exactly 72.5 F; the tie rounds up.
        assert!((round_to(celsius_to_fahrenheit(22.5), 0) - 73.0).abs() < 1e-5);

        // 21.25 C converts to exactly 70.25 F; the tie rounds to 70.3.
        assert!((round_to(celsius_to_fahrenheit(21.25), 1) - 70.3).abs() < 1e-4);

        // Negative ties move away from zero as well.
        assert!((round_to(celsius_to_fahrenheit(-22.5), 0) - (-9.0)).abs() < 1e-5);
    }

    #[test]
    fn rounding_keeps_configured_precision() {
        assert!((round_to(72.44, 1) - 72.4).abs() < 1e-4);
        assert!((round_to(72.44, 0) - 72.0).abs() < 1e-5);
    }

    #[test]
    fn parse_error_display_messages() {
        let msg = ParseError::InvalidLength {
            expected: 5,
            actual: 4,
        }
        .to_string();
        assert!(msg.contains("expected 5"));
        assert!(msg.contains("got 4"));

        assert_eq!(
            ParseError::ChecksumMismatch {
                expected: 0xa0,
                actual: 0x5f
            }
            .to_string(),
            "Checksum mismatch: expected 0xa0, got 0x5f"
        );

        assert_eq!(
            ParseError::AllZeros.to_string(),
            "Frame contains only zero bytes"
        );
    }
}
