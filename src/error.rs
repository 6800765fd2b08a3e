//! Error types for the MAX30102 interface

use std::fmt::Debug;

use thiserror::Error;

#[cfg(feature = "ftdi")]
use crate::ffi::{status_to_string, FT_OK, FT_STATUS};

/// Error type for MAX30102 operations, generic over the bus error
#[derive(Error, Debug)]
pub enum Max30102Error<E: Debug> {
    /// I2C transaction failed
    #[error("I2C bus error: {0:?}")]
    Bus(E),

    /// Invalid PART_ID response
    #[error("Invalid PART_ID response: expected 0x15, got 0x{0:02X}")]
    InvalidPartId(u8),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Polling gave up after repeated bus failures
    #[error("Bus failed {attempts} consecutive times, last error: {last:?}")]
    RetriesExhausted { attempts: u32, last: E },
}

/// Result type for MAX30102 operations
pub type Result<T, E> = std::result::Result<T, Max30102Error<E>>;

/// Error type for the FT232H transport
#[cfg(feature = "ftdi")]
#[derive(Error, Debug)]
pub enum FtdiError {
    /// FTDI driver error
    #[error("FTDI error: {status} ({description})")]
    Status {
        status: FT_STATUS,
        description: &'static str,
    },

    /// No I2C channels found
    #[error("No I2C channels found")]
    NoChannelsFound,

    /// Invalid channel index
    #[error("Invalid channel index: {0}")]
    InvalidChannel(u32),

    /// Short read or write
    #[error("Data transfer error: expected {expected} bytes, transferred {actual}")]
    TransferError { expected: u32, actual: u32 },
}

#[cfg(feature = "ftdi")]
impl FtdiError {
    /// Turn a libMPSSE status code into a `Result`
    pub fn check(status: FT_STATUS) -> std::result::Result<(), FtdiError> {
        if status == FT_OK {
            Ok(())
        } else {
            Err(FtdiError::Status {
                status,
                description: status_to_string(status),
            })
        }
    }
}

#[cfg(feature = "ftdi")]
impl embedded_hal::i2c::Error for FtdiError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        embedded_hal::i2c::ErrorKind::Other
    }
}
