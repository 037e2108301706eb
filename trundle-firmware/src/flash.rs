//! Flash-backed calibration store
//!
//! The three calibration scalars live in a sequential-storage map in the
//! last flash sectors, stored as 2-byte little-endian records. The store
//! trait is synchronous; the blocking flash is wrapped with the
//! BlockingAsync adapter to satisfy sequential-storage's async NorFlash
//! bound, and its always-ready futures are driven with block_on.

use defmt::*;
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_futures::block_on;
use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use trundle_core::config::{CalKey, CalibrationStore};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const CAL_PARTITION_SIZE: usize = 2 * ERASE_SIZE; // two sectors for wear leveling
pub const CAL_PARTITION_START: usize = FLASH_SIZE - CAL_PARTITION_SIZE;

/// Flash range for the calibration partition
pub const CAL_RANGE: core::ops::Range<u32> = (CAL_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Calibration storage in RP2040 flash.
pub struct FlashCalibration<'d> {
    flash: BlockingAsync<Flash<'d, FLASH, Blocking, FLASH_SIZE>>,
}

impl<'d> FlashCalibration<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: BlockingAsync::new(Flash::new_blocking(flash)),
        }
    }
}

impl CalibrationStore for FlashCalibration<'_> {
    fn read(&mut self, key: CalKey) -> Option<u16> {
        let mut data_buffer = [0u8; 32];

        let result = block_on(map::fetch_item::<CalKey, &[u8], _>(
            &mut self.flash,
            CAL_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        ));

        match result {
            Ok(Some(data)) if data.len() == 2 => Some(u16::from_le_bytes([data[0], data[1]])),
            Ok(_) => None,
            Err(_) => {
                warn!("calibration read failed for {}", key);
                None
            }
        }
    }

    fn write(&mut self, key: CalKey, value: u16) {
        let mut data_buffer = [0u8; 32];
        let bytes = value.to_le_bytes();

        let result = block_on(map::store_item(
            &mut self.flash,
            CAL_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &bytes.as_slice(),
        ));

        if result.is_err() {
            // the live value keeps working for this session
            warn!("calibration write failed for {}", key);
        }
    }
}
