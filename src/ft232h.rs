//! FT232H USB-to-I2C bridge as an `embedded-hal` I2C bus, via libMPSSE

use std::ptr;

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use log::debug;

use crate::error::FtdiError;
use crate::ffi::*;

/// Channel settings for the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Index of the MPSSE channel (usually 0)
    pub channel_index: u32,
    /// SCL frequency in Hz
    pub clock_rate: u32,
    /// USB latency timer in ms
    pub latency_timer: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_index: 0,
            clock_rate: I2C_CLOCK_STANDARD_MODE, // 100 kHz
            latency_timer: 1,
        }
    }
}

/// Open libMPSSE I2C channel. Closed on drop.
pub struct Ft232hBus {
    handle: FT_HANDLE,
}

impl Ft232hBus {
    /// Open and initialize a channel
    ///
    /// # Returns
    /// * `Ok(Ft232hBus)` - Channel ready for transfers
    /// * `Err(FtdiError)` - No bridge found, bad index, or driver failure
    pub fn open(config: BusConfig) -> Result<Self, FtdiError> {
        let mut num_channels: DWORD = 0;
        FtdiError::check(unsafe { I2C_GetNumChannels(&mut num_channels) })?;

        if num_channels == 0 {
            return Err(FtdiError::NoChannelsFound);
        }

        if config.channel_index >= num_channels {
            return Err(FtdiError::InvalidChannel(config.channel_index));
        }

        let mut handle: FT_HANDLE = ptr::null_mut();
        FtdiError::check(unsafe { I2C_OpenChannel(config.channel_index, &mut handle) })?;

        let mut channel = ChannelConfig {
            ClockRate: config.clock_rate,
            LatencyTimer: config.latency_timer,
            Options: 0,
            Pin: 0,
            currentPinState: 0,
        };

        if let Err(e) = FtdiError::check(unsafe { I2C_InitChannel(handle, &mut channel) }) {
            unsafe { I2C_CloseChannel(handle) };
            return Err(e);
        }

        debug!(
            "Opened FT232H channel {} at {} Hz",
            config.channel_index, config.clock_rate
        );
        Ok(Self { handle })
    }

    fn device_write(&mut self, address: u8, bytes: &[u8], stop: bool) -> Result<(), FtdiError> {
        let mut transferred: DWORD = 0;
        let mut options = I2C_TRANSFER_OPTIONS_START_BIT | I2C_TRANSFER_OPTIONS_BREAK_ON_NACK;
        if stop {
            options |= I2C_TRANSFER_OPTIONS_STOP_BIT;
        }

        FtdiError::check(unsafe {
            I2C_DeviceWrite(
                self.handle,
                address,
                bytes.len() as DWORD,
                bytes.as_ptr(),
                &mut transferred,
                options,
            )
        })?;

        if transferred != bytes.len() as DWORD {
            return Err(FtdiError::TransferError {
                expected: bytes.len() as u32,
                actual: transferred,
            });
        }
        Ok(())
    }

    fn device_read(&mut self, address: u8, buffer: &mut [u8], stop: bool) -> Result<(), FtdiError> {
        let mut transferred: DWORD = 0;
        let mut options = I2C_TRANSFER_OPTIONS_START_BIT | I2C_TRANSFER_OPTIONS_NACK_LAST_BYTE;
        if stop {
            options |= I2C_TRANSFER_OPTIONS_STOP_BIT;
        }

        FtdiError::check(unsafe {
            I2C_DeviceRead(
                self.handle,
                address,
                buffer.len() as DWORD,
                buffer.as_mut_ptr(),
                &mut transferred,
                options,
            )
        })?;

        if transferred != buffer.len() as DWORD {
            return Err(FtdiError::TransferError {
                expected: buffer.len() as u32,
                actual: transferred,
            });
        }
        Ok(())
    }
}

impl ErrorType for Ft232hBus {
    type Error = FtdiError;
}

impl I2c<SevenBitAddress> for Ft232hBus {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        // Every operation starts with a (repeated) START; only the last one releases the bus
        let last = operations.len().saturating_sub(1);
        for (i, op) in operations.iter_mut().enumerate() {
            let stop = i == last;
            match op {
                Operation::Write(bytes) => self.device_write(address, bytes, stop)?,
                Operation::Read(buffer) => self.device_read(address, buffer, stop)?,
            }
        }
        Ok(())
    }
}

impl Drop for Ft232hBus {
    fn drop(&mut self) {
        unsafe {
            I2C_CloseChannel(self.handle);
        }
    }
}
