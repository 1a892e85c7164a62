mod device;
mod display;
mod error;
mod glyphs;
mod sensor;

use crate::device::DeviceManager;
use crate::error::AppError;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::sys::link_patches;
use log::info;

/// This function initializes the system and starts the main loop.
///
/// # Returns
/// The result of the operation.
fn main() -> Result<(), AppError> {
  // Initialize system
  link_patches();
  EspLogger::initialize_default();
  info!("Starting the DHT-22 temperature display...");

  let peripherals = Peripherals::take()
    .map_err(|_| AppError::PeripheralsError("Failed to acquire ESP32 peripherals".into()))?;

  // Initialize device manager
  let mut manager = DeviceManager::new(peripherals)?;

  // Main loop; each update samples, renders and idle-waits one interval
  loop {
    manager.update()?;
  }
}
