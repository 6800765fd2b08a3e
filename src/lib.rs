//! FT232H-based interface library for the MAX30102 pulse-oximetry sensor
//!
//! This library configures a MAX30102, drains its 32-slot sample FIFO and maps
//! every red-LED reading onto an 8-bit output value. The sensor logic is
//! written against the `embedded-hal` 1.0 I2C and delay traits; the FTDI FT232H
//! transport (via libMPSSE) is available with the `ftdi` feature.
//!
//! # Quick Start
//!
//! ## Configure and Stream
//! ```ignore
//! use ft232_max30102_interface::{
//!     BusConfig, DeviceConfig, Ft232hBus, Max30102, PumpConfig, SamplePump, StdDelay,
//!     StreamControl, WaveformSink,
//! };
//!
//! let bus = Ft232hBus::open(BusConfig::default())?;
//! let mut sensor = Max30102::new(bus);
//! sensor.configure(&DeviceConfig::default(), &mut StdDelay)?;
//!
//! let mut pump = SamplePump::new(sensor, StdDelay, WaveformSink::stdout(), PumpConfig::default());
//! pump.run(|_| StreamControl::Continue)?;
//! ```
//!
//! ## Decoding Without Hardware
//! ```
//! use ft232_max30102_interface::fifo::{actuation_wrapping, decode_channel};
//!
//! let red = decode_channel([0x03, 0x63, 0x30]);
//! assert_eq!(red, 222_000);
//! assert_eq!(actuation_wrapping(red), 0);
//! ```

mod common;
pub mod error;
pub mod fifo;
pub mod max30102;
pub mod pump;
pub mod registers;
pub mod sink;

#[cfg(feature = "ftdi")]
mod ffi;
#[cfg(feature = "ftdi")]
pub mod ft232h;

// Re-export public API
pub use common::{create_level_bar, StdDelay, TimeKeeper};
pub use error::{Max30102Error, Result};
pub use fifo::{FifoPointers, FifoSample, Normalization};
pub use max30102::{Max30102, PointerRead};
pub use pump::{ErrorPolicy, PollOutcome, PollStrategy, PumpConfig, PumpStats, SamplePump, StreamControl};
pub use registers::DeviceConfig;
pub use sink::{NullSink, OutputSink, WaveformSink};

#[cfg(feature = "ftdi")]
pub use error::FtdiError;
#[cfg(feature = "ftdi")]
pub use ft232h::{BusConfig, Ft232hBus};
