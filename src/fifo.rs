//! FIFO pointer arithmetic, sample decoding and output normalization

use crate::registers::{BYTES_PER_CHANNEL, BYTES_PER_SAMPLE, FIFO_DEPTH, FIFO_POINTER_MASK};

/// Largest value an 18-bit ADC word can hold
pub const ADC_MAX: u32 = (1 << 18) - 1;

/// Decoded reading mapped to actuation value 0
pub const ACTUATION_OFFSET: u32 = 222_000;

/// Width of the decoded window mapped onto 0..=255
pub const ACTUATION_SPAN: u32 = 2_000;

/// Snapshot of the sensor's FIFO cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoPointers {
    /// FIFO_WR_PTR, next slot the sensor will write
    pub write: u8,
    /// FIFO_RD_PTR, next slot the host will read
    pub read: u8,
    /// OVF_COUNTER, only filled in by a burst pointer read
    pub overflow: Option<u8>,
}

impl FifoPointers {
    pub fn new(write: u8, read: u8) -> Self {
        Self {
            write,
            read,
            overflow: None,
        }
    }

    /// Unread samples between the two cursors
    pub fn available(&self) -> u8 {
        available_count(self.write, self.read)
    }
}

/// `(write - read) mod 32`
pub fn available_count(write: u8, read: u8) -> u8 {
    write.wrapping_sub(read) & FIFO_POINTER_MASK
}

/// True when a poll should be abandoned without reading data.
///
/// A count of 32 cannot come out of the 5-bit mask; a full 32-deep backlog
/// is never acted on.
pub fn should_skip(count: u8) -> bool {
    count == 0 || count >= FIFO_DEPTH
}

/// Decode one 3-byte big-endian channel reading into an 18-bit value
pub fn decode_channel(bytes: [u8; 3]) -> u32 {
    ((bytes[0] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[2] as u32) & ADC_MAX
}

/// Both channels of one FIFO slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoSample {
    pub red: u32,
    pub infrared: u32,
}

/// Split a raw FIFO block into samples. A trailing partial slot is ignored.
pub fn parse_fifo_block(block: &[u8]) -> Vec<FifoSample> {
    block
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|chunk| FifoSample {
            red: decode_channel([chunk[0], chunk[1], chunk[2]]),
            infrared: decode_channel([
                chunk[BYTES_PER_CHANNEL],
                chunk[BYTES_PER_CHANNEL + 1],
                chunk[BYTES_PER_CHANNEL + 2],
            ]),
        })
        .collect()
}

/// How a decoded reading is turned into an 8-bit output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// 32-bit unsigned wrapping arithmetic truncated to 8 bits.
    /// Readings outside the 222000..224000 window wrap around.
    #[default]
    Wrapping,
    /// Signed arithmetic clamped to 0..=255
    Saturating,
}

impl Normalization {
    pub fn apply(self, decoded: u32) -> u8 {
        match self {
            Normalization::Wrapping => actuation_wrapping(decoded),
            Normalization::Saturating => actuation_saturating(decoded),
        }
    }
}

/// `((decoded - 222000) * 255) / 2000` in `u32` wrapping arithmetic, then `mod 256`.
///
/// 262143 maps to 5118, which truncates to 254.
pub fn actuation_wrapping(decoded: u32) -> u8 {
    let decoded = decoded.min(ADC_MAX);
    let scaled = decoded.wrapping_sub(ACTUATION_OFFSET).wrapping_mul(255) / ACTUATION_SPAN;
    scaled as u8
}

/// Same window as [`actuation_wrapping`], floored and clamped to 0..=255
pub fn actuation_saturating(decoded: u32) -> u8 {
    let decoded = decoded.min(ADC_MAX) as i64;
    let scaled = ((decoded - ACTUATION_OFFSET as i64) * 255).div_euclid(ACTUATION_SPAN as i64);
    scaled.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_count_range_and_skip() {
        for write in 0..32u8 {
            for read in 0..32u8 {
                let count = available_count(write, read);
                assert!(count <= 31);
                assert_eq!(should_skip(count), write == read);
            }
        }
    }

    #[test]
    fn test_available_count_wraps() {
        assert_eq!(available_count(5, 2), 3);
        assert_eq!(available_count(1, 30), 3);
        assert_eq!(FifoPointers::new(0, 31).available(), 1);
    }

    #[test]
    fn test_over_depth_branch_is_dead_after_mask() {
        // 32 is only reachable if the mask is bypassed
        assert!(should_skip(32));
        assert!((0..=u8::MAX).all(|w| available_count(w, 0) != 32));
        assert!(!should_skip(31));
    }

    #[test]
    fn test_decode_extremes() {
        assert_eq!(decode_channel([0xFF, 0xFF, 0xFF]), 262_143);
        assert_eq!(decode_channel([0x00, 0x00, 0x00]), 0);
    }

    #[test]
    fn test_decode_masks_padding_bits() {
        let bytes = [0xC3, 0x65, 0x9A];
        let expected = ((0xC3u32 << 16) | (0x65 << 8) | 0x9A) & 0x3FFFF;
        assert_eq!(decode_channel(bytes), expected);
        assert_eq!(decode_channel([0xFC, 0x00, 0x01]), 1);
    }

    #[test]
    fn test_parse_block_channel_order() {
        let block = [0x03, 0x61, 0xB0, 0x00, 0x10, 0x00, 0x03, 0x62, 0x00, 0x00, 0x20, 0x00];
        let samples = parse_fifo_block(&block);
        assert_eq!(
            samples,
            vec![
                FifoSample { red: 0x361B0, infrared: 0x1000 },
                FifoSample { red: 0x36200, infrared: 0x2000 },
            ]
        );
    }

    #[test]
    fn test_parse_block_ignores_partial_slot() {
        assert_eq!(parse_fifo_block(&[0xFF; 8]).len(), 1);
        assert!(parse_fifo_block(&[]).is_empty());
    }

    #[test]
    fn test_wrapping_top_of_range() {
        // 40143 * 255 / 2000 = 5118, 5118 mod 256 = 254
        assert_eq!(actuation_wrapping(262_143), 254);
    }

    #[test]
    fn test_wrapping_window() {
        assert_eq!(actuation_wrapping(222_000), 0);
        assert_eq!(actuation_wrapping(223_000), 127);
        assert_eq!(actuation_wrapping(224_000), 255);
    }

    #[test]
    fn test_wrapping_underflow_wraps() {
        assert_eq!(actuation_wrapping(100_000), 216);
        assert_eq!(actuation_wrapping(221_999), 155);
    }

    #[test]
    fn test_saturating_clamps_both_ends() {
        assert_eq!(actuation_saturating(100_000), 0);
        assert_eq!(actuation_saturating(221_999), 0);
        assert_eq!(actuation_saturating(223_000), 127);
        assert_eq!(actuation_saturating(262_143), 255);
    }

    #[test]
    fn test_out_of_range_input_clamped_first() {
        assert_eq!(actuation_wrapping(u32::MAX), actuation_wrapping(ADC_MAX));
        assert_eq!(actuation_saturating(u32::MAX), 255);
    }

    #[test]
    fn test_normalization_dispatch() {
        assert_eq!(Normalization::default(), Normalization::Wrapping);
        assert_eq!(Normalization::Wrapping.apply(100_000), 216);
        assert_eq!(Normalization::Saturating.apply(100_000), 0);
    }
}
