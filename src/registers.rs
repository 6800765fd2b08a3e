//! MAX30102 register map and configuration fields
//!
//! Every register write issued by the driver goes through these types, so the
//! byte values on the wire can be audited against the datasheet tables.

/// 7-bit I2C address of the MAX30102
pub const DEVICE_ADDRESS: u8 = 0x57;

/// Expected PART_ID value
pub const PART_ID_VALUE: u8 = 0x15;

/// Depth of the on-chip sample FIFO
pub const FIFO_DEPTH: u8 = 32;

/// Pointer registers are 5 bits wide
pub const FIFO_POINTER_MASK: u8 = 0x1F;

/// Bytes per channel reading in the FIFO
pub const BYTES_PER_CHANNEL: usize = 3;

/// Bytes per FIFO slot (red + infrared)
pub const BYTES_PER_SAMPLE: usize = 2 * BYTES_PER_CHANNEL;

/// Settle time after a MODE_CONFIG reset, in milliseconds
pub const RESET_SETTLE_MS: u32 = 10;

/// Register addresses
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    InterruptStatus1 = 0x00,
    InterruptStatus2 = 0x01,
    InterruptEnable1 = 0x02,
    InterruptEnable2 = 0x03,
    FifoWritePointer = 0x04,
    OverflowCounter = 0x05,
    FifoReadPointer = 0x06,
    FifoData = 0x07,
    FifoConfig = 0x08,
    ModeConfig = 0x09,
    Spo2Config = 0x0A,
    Led1PulseAmplitude = 0x0C,
    Led2PulseAmplitude = 0x0D,
    RevisionId = 0xFE,
    PartId = 0xFF,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

// MODE_CONFIG bits
pub const MODE_RESET: u8 = 1 << 6;

// FIFO_CONFIG bits
pub const FIFO_ROLLOVER_EN: u8 = 1 << 4;
pub const FIFO_A_FULL_MASK: u8 = 0x0F;

/// Acquisition mode (MODE_CONFIG[2:0])
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Red LED only
    HeartRate = 0x02,
    /// Red and infrared LEDs
    Spo2 = 0x03,
    /// Slot-programmed LEDs
    MultiLed = 0x07,
}

/// Samples averaged per FIFO entry (FIFO_CONFIG[7:5])
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleAveraging {
    None = 0b000,
    Avg2 = 0b001,
    Avg4 = 0b010,
    Avg8 = 0b011,
    Avg16 = 0b100,
    Avg32 = 0b101,
}

/// ADC full-scale range (SPO2_CONFIG[6:5])
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcRange {
    Na2048 = 0b00,
    Na4096 = 0b01,
    Na8192 = 0b10,
    Na16384 = 0b11,
}

/// Sample rate (SPO2_CONFIG[4:2])
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Hz50 = 0b000,
    Hz100 = 0b001,
    Hz200 = 0b010,
    Hz400 = 0b011,
    Hz800 = 0b100,
    Hz1000 = 0b101,
    Hz1600 = 0b110,
    Hz3200 = 0b111,
}

/// LED pulse width and the matching ADC resolution (SPO2_CONFIG[1:0])
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseWidth {
    Us69Bits15 = 0b00,
    Us118Bits16 = 0b01,
    Us215Bits17 = 0b10,
    Us411Bits18 = 0b11,
}

/// LED drive current, 0.2 mA per step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCurrent(pub u8);

impl LedCurrent {
    /// Approximate current in milliamps
    pub fn milliamps(self) -> f32 {
        self.0 as f32 * 0.2
    }
}

/// Register values written by the configurator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub mode: Mode,
    pub averaging: SampleAveraging,
    pub fifo_rollover: bool,
    /// Samples remaining in the FIFO when A_FULL is raised (0-15)
    pub almost_full_threshold: u8,
    pub adc_range: AdcRange,
    pub sample_rate: SampleRate,
    pub pulse_width: PulseWidth,
    pub red_current: LedCurrent,
    pub infrared_current: LedCurrent,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mode: Mode::HeartRate,
            averaging: SampleAveraging::Avg4,
            fifo_rollover: true,
            almost_full_threshold: 0x0F,
            adc_range: AdcRange::Na8192,
            sample_rate: SampleRate::Hz200,
            pulse_width: PulseWidth::Us411Bits18,
            red_current: LedCurrent(0x7F),
            infrared_current: LedCurrent(0x24),
        }
    }
}

impl DeviceConfig {
    /// MODE_CONFIG value selecting the acquisition mode
    pub fn mode_config(&self) -> u8 {
        self.mode as u8
    }

    /// FIFO_CONFIG value
    pub fn fifo_config(&self) -> u8 {
        let rollover = if self.fifo_rollover { FIFO_ROLLOVER_EN } else { 0 };
        ((self.averaging as u8) << 5) | rollover | (self.almost_full_threshold & FIFO_A_FULL_MASK)
    }

    /// SPO2_CONFIG value
    pub fn spo2_config(&self) -> u8 {
        ((self.adc_range as u8) << 5) | ((self.sample_rate as u8) << 2) | self.pulse_width as u8
    }
}
