//! MAX30102 pulse-oximetry sensor driver over any `embedded-hal` I2C bus

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::error::{Max30102Error, Result};
use crate::fifo::{available_count, FifoPointers};
use crate::registers::{
    DeviceConfig, Register, BYTES_PER_SAMPLE, DEVICE_ADDRESS, FIFO_A_FULL_MASK, FIFO_POINTER_MASK,
    MODE_RESET, PART_ID_VALUE, RESET_SETTLE_MS,
};

/// How the two FIFO pointer registers are fetched each poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerRead {
    /// FIFO_WR_PTR and FIFO_RD_PTR in two separate transactions.
    /// The sensor may advance its write pointer between them.
    #[default]
    Separate,
    /// One 3-byte read of FIFO_WR_PTR, OVF_COUNTER and FIFO_RD_PTR
    Burst,
}

/// MAX30102 sensor handle. Owns the bus for its whole lifetime.
pub struct Max30102<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Max30102<I2C> {
    /// Wrap a bus. Nothing is sent until [`Max30102::configure`].
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEVICE_ADDRESS,
        }
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Run the start-up register sequence.
    ///
    /// Issues exactly six `[register, value]` writes: a reset, a 10 ms settle
    /// delay, the acquisition mode, FIFO config, SpO2/ADC config and the two
    /// LED amplitudes. Nothing is read back. The first failed write aborts the
    /// sequence. An out-of-range FIFO threshold is rejected before anything
    /// is sent.
    pub fn configure<D: DelayNs>(
        &mut self,
        config: &DeviceConfig,
        delay: &mut D,
    ) -> Result<(), I2C::Error> {
        if config.almost_full_threshold > FIFO_A_FULL_MASK {
            return Err(Max30102Error::InvalidParameter(format!(
                "FIFO almost-full threshold {} exceeds {}",
                config.almost_full_threshold, FIFO_A_FULL_MASK
            )));
        }

        self.write_register(Register::ModeConfig, MODE_RESET)?;
        delay.delay_ms(RESET_SETTLE_MS);

        self.write_register(Register::ModeConfig, config.mode_config())?;
        self.write_register(Register::FifoConfig, config.fifo_config())?;
        self.write_register(Register::Spo2Config, config.spo2_config())?;
        self.write_register(Register::Led1PulseAmplitude, config.red_current.0)?;
        self.write_register(Register::Led2PulseAmplitude, config.infrared_current.0)?;

        info!(
            "MAX30102 configured: mode {:?}, red {:.1} mA, IR {:.1} mA",
            config.mode,
            config.red_current.milliamps(),
            config.infrared_current.milliamps()
        );
        Ok(())
    }

    /// Read PART_ID (0x15 on a MAX30102)
    pub fn part_id(&mut self) -> Result<u8, I2C::Error> {
        self.read_register(Register::PartId)
    }

    /// Read REV_ID
    pub fn revision_id(&mut self) -> Result<u8, I2C::Error> {
        self.read_register(Register::RevisionId)
    }

    /// Fail with `InvalidPartId` unless the device answers as a MAX30102
    pub fn verify_part_id(&mut self) -> Result<(), I2C::Error> {
        let id = self.part_id()?;
        if id != PART_ID_VALUE {
            return Err(Max30102Error::InvalidPartId(id));
        }
        Ok(())
    }

    /// Read the FIFO write and read pointers
    pub fn read_pointers(&mut self, mode: PointerRead) -> Result<FifoPointers, I2C::Error> {
        let pointers = match mode {
            PointerRead::Separate => {
                let write = self.read_register(Register::FifoWritePointer)?;
                let read = self.read_register(Register::FifoReadPointer)?;
                FifoPointers::new(write & FIFO_POINTER_MASK, read & FIFO_POINTER_MASK)
            }
            PointerRead::Burst => {
                let mut raw = [0u8; 3];
                self.read_registers(Register::FifoWritePointer, &mut raw)?;
                FifoPointers {
                    write: raw[0] & FIFO_POINTER_MASK,
                    read: raw[2] & FIFO_POINTER_MASK,
                    overflow: Some(raw[1] & FIFO_POINTER_MASK),
                }
            }
        };

        debug!(
            "FIFO pointers: write={} read={} available={}",
            pointers.write,
            pointers.read,
            available_count(pointers.write, pointers.read)
        );
        Ok(pointers)
    }

    /// Read `count` FIFO slots from FIFO_DATA in one transaction
    pub fn read_fifo_block(&mut self, count: u8) -> Result<Vec<u8>, I2C::Error> {
        let mut block = vec![0u8; count as usize * BYTES_PER_SAMPLE];
        if block.is_empty() {
            return Ok(block);
        }

        // FIFO_DATA does not auto-increment, so a long read drains successive slots
        self.read_registers(Register::FifoData, &mut block)?;
        Ok(block)
    }

    /// Write a single byte to a register
    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), I2C::Error> {
        debug!("write 0x{:02X} <- 0x{:02X}", reg.addr(), value);
        self.i2c
            .write(self.address, &[reg.addr(), value])
            .map_err(Max30102Error::Bus)
    }

    /// Read a single byte from a register
    fn read_register(&mut self, reg: Register) -> Result<u8, I2C::Error> {
        let mut data = [0u8];
        self.read_registers(reg, &mut data)?;
        Ok(data[0])
    }

    /// Read consecutive bytes starting at `reg`
    fn read_registers(&mut self, reg: Register, buffer: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c
            .write_read(self.address, &[reg.addr()], buffer)
            .map_err(Max30102Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};
    use embedded_hal::i2c::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    const ADDR: u8 = 0x57;

    #[derive(Debug, PartialEq)]
    enum Event {
        Write(u8, Vec<u8>),
        DelayNs(u64),
    }

    /// Bus and delay sharing one event log, so their interleaving is observable
    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<Event>>>,
        fail_on_write: Option<usize>,
    }

    impl embedded_hal::i2c::ErrorType for Recorder {
        type Error = embedded_hal::i2c::ErrorKind;
    }

    impl I2c for Recorder {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [embedded_hal::i2c::Operation<'_>],
        ) -> std::result::Result<(), Self::Error> {
            for op in operations {
                if let embedded_hal::i2c::Operation::Write(bytes) = op {
                    let writes = self
                        .events
                        .borrow()
                        .iter()
                        .filter(|e| matches!(e, Event::Write(..)))
                        .count();
                    if self.fail_on_write == Some(writes) {
                        return Err(embedded_hal::i2c::ErrorKind::Other);
                    }
                    self.events.borrow_mut().push(Event::Write(address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    impl DelayNs for Recorder {
        fn delay_ns(&mut self, ns: u32) {
            self.events.borrow_mut().push(Event::DelayNs(ns as u64));
        }

        fn delay_ms(&mut self, ms: u32) {
            self.events.borrow_mut().push(Event::DelayNs(ms as u64 * 1_000_000));
        }
    }

    #[test]
    fn test_configure_sequence_and_delay_position() {
        let recorder = Recorder::default();
        let mut delay = recorder.clone();
        let mut sensor = Max30102::new(recorder.clone());

        sensor.configure(&DeviceConfig::default(), &mut delay).unwrap();

        let events = recorder.events.borrow();
        assert_eq!(
            *events,
            vec![
                Event::Write(ADDR, vec![0x09, 0x40]),
                Event::DelayNs(10_000_000),
                Event::Write(ADDR, vec![0x09, 0x02]),
                Event::Write(ADDR, vec![0x08, 0x5F]),
                Event::Write(ADDR, vec![0x0A, 0x4B]),
                Event::Write(ADDR, vec![0x0C, 0x7F]),
                Event::Write(ADDR, vec![0x0D, 0x24]),
            ]
        );
    }

    #[test]
    fn test_configure_aborts_on_first_failure() {
        let recorder = Recorder {
            fail_on_write: Some(2),
            ..Recorder::default()
        };
        let mut delay = recorder.clone();
        let mut sensor = Max30102::new(recorder.clone());

        let result = sensor.configure(&DeviceConfig::default(), &mut delay);
        assert!(matches!(result, Err(Max30102Error::Bus(_))));

        let writes = recorder
            .events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Write(..)))
            .count();
        assert_eq!(writes, 2);
    }

    #[test]
    fn test_configure_rejects_fifo_threshold_over_15() {
        let recorder = Recorder::default();
        let mut delay = recorder.clone();
        let mut sensor = Max30102::new(recorder.clone());
        let config = DeviceConfig {
            almost_full_threshold: 16,
            ..DeviceConfig::default()
        };

        let result = sensor.configure(&config, &mut delay);
        assert!(matches!(result, Err(Max30102Error::InvalidParameter(_))));
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn test_configure_with_mock_bus() {
        let expectations = [
            Transaction::write(ADDR, vec![0x09, 0x40]),
            Transaction::write(ADDR, vec![0x09, 0x03]),
            Transaction::write(ADDR, vec![0x08, 0x5F]),
            Transaction::write(ADDR, vec![0x0A, 0x4B]),
            Transaction::write(ADDR, vec![0x0C, 0x7F]),
            Transaction::write(ADDR, vec![0x0D, 0x24]),
        ];
        let mut sensor = Max30102::new(I2cMock::new(&expectations));
        let config = DeviceConfig {
            mode: crate::registers::Mode::Spo2,
            ..DeviceConfig::default()
        };

        sensor.configure(&config, &mut NoopDelay::new()).unwrap();
        sensor.release().done();
    }

    #[test]
    fn test_read_pointers_separate() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0x04], vec![0x05]),
            Transaction::write_read(ADDR, vec![0x06], vec![0x02]),
        ];
        let mut sensor = Max30102::new(I2cMock::new(&expectations));

        let pointers = sensor.read_pointers(PointerRead::Separate).unwrap();
        assert_eq!(pointers, FifoPointers::new(5, 2));
        assert_eq!(pointers.available(), 3);
        sensor.release().done();
    }

    #[test]
    fn test_read_pointers_burst() {
        let expectations = [Transaction::write_read(ADDR, vec![0x04], vec![0x03, 0x01, 0x1E])];
        let mut sensor = Max30102::new(I2cMock::new(&expectations));

        let pointers = sensor.read_pointers(PointerRead::Burst).unwrap();
        assert_eq!(pointers.write, 3);
        assert_eq!(pointers.read, 30);
        assert_eq!(pointers.overflow, Some(1));
        assert_eq!(pointers.available(), 5);
        sensor.release().done();
    }

    #[test]
    fn test_read_fifo_block_size() {
        let data: Vec<u8> = (0..18).collect();
        let expectations = [Transaction::write_read(ADDR, vec![0x07], data.clone())];
        let mut sensor = Max30102::new(I2cMock::new(&expectations));

        assert_eq!(sensor.read_fifo_block(3).unwrap(), data);
        assert!(sensor.read_fifo_block(0).unwrap().is_empty());
        sensor.release().done();
    }

    #[test]
    fn test_verify_part_id() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0xFF], vec![0x15]),
            Transaction::write_read(ADDR, vec![0xFF], vec![0x11]),
        ];
        let mut sensor = Max30102::new(I2cMock::new(&expectations));

        assert!(sensor.verify_part_id().is_ok());
        assert!(matches!(
            sensor.verify_part_id(),
            Err(Max30102Error::InvalidPartId(0x11))
        ));
        sensor.release().done();
    }

    #[test]
    fn test_bus_error_is_wrapped() {
        let expectations = [Transaction::write_read(ADDR, vec![0xFE], vec![0x00])
            .with_error(ErrorKind::Other)];
        let mut sensor = Max30102::new(I2cMock::new(&expectations));

        assert!(matches!(sensor.revision_id(), Err(Max30102Error::Bus(_))));
        sensor.release().done();
    }
}
