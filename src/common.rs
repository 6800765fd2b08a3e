//! Common utilities shared across programs

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// `DelayNs` backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Tracks elapsed time since creation
pub struct TimeKeeper {
    start: Instant,
}

impl TimeKeeper {
    /// Create a new TimeKeeper starting now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for TimeKeeper {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a left-anchored bar for an unsigned level
///
/// # Arguments
/// * `value` - The value to display
/// * `max_value` - Value drawn as a full bar
/// * `width` - Total width of the bar in characters
///
/// # Example
/// ```
/// use ft232_max30102_interface::create_level_bar;
///
/// let bar = create_level_bar(128, 255, 40);
/// println!("[{}]", bar);
/// ```
pub fn create_level_bar(value: u32, max_value: u32, width: usize) -> String {
    let filled = if max_value == 0 {
        0
    } else {
        ((value.min(max_value) as u64 * width as u64 / max_value as u64) as usize).min(width)
    };

    let mut bar = String::with_capacity(width * 3);
    bar.push_str(&"█".repeat(filled));
    bar.push_str(&" ".repeat(width - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bar_empty() {
        let bar = create_level_bar(0, 255, 40);
        assert_eq!(bar.chars().count(), 40);
        assert!(!bar.contains('█'));
    }

    #[test]
    fn test_level_bar_full() {
        let bar = create_level_bar(255, 255, 40);
        assert_eq!(bar.chars().filter(|&c| c == '█').count(), 40);
    }

    #[test]
    fn test_level_bar_half() {
        let bar = create_level_bar(128, 256, 40);
        assert_eq!(bar.chars().filter(|&c| c == '█').count(), 20);
        assert_eq!(bar.chars().count(), 40);
    }

    #[test]
    fn test_level_bar_zero_scale() {
        assert_eq!(create_level_bar(10, 0, 8), " ".repeat(8));
    }

    #[test]
    fn test_std_delay_sleeps() {
        let keeper = TimeKeeper::new();
        StdDelay.delay_ms(10);
        let elapsed = keeper.elapsed_secs();
        assert!(elapsed >= 0.01); // At least 10ms
        assert!(elapsed < 0.5);
    }
}
