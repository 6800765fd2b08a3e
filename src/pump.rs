//! FIFO sample pump: polls the sensor and forwards actuation values to a sink

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};

use crate::error::{Max30102Error, Result};
use crate::fifo::{parse_fifo_block, should_skip, Normalization};
use crate::max30102::{Max30102, PointerRead};
use crate::sink::OutputSink;

/// Control flow for streaming operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    /// Continue streaming
    Continue,
    /// Stop streaming
    Break,
}

/// Result of one polling iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// FIFO empty, nothing read
    Skipped,
    /// This many samples were decoded and written to the sink
    Delivered(usize),
    /// A bus transaction failed and the error policy chose to retry
    BusError,
}

/// Idle time applied after a skipped poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollStrategy {
    /// Re-poll immediately
    #[default]
    Busy,
    /// Sleep a fixed interval after every skip
    Fixed(Duration),
    /// Double the sleep on each consecutive skip, starting at `initial`, capped at `max`
    Exponential { initial: Duration, max: Duration },
}

impl PollStrategy {
    /// Delay after the `consecutive_skips`-th skip in a row (1-based)
    pub fn delay_for(&self, consecutive_skips: u32) -> Option<Duration> {
        match *self {
            PollStrategy::Busy => None,
            PollStrategy::Fixed(interval) => Some(interval),
            PollStrategy::Exponential { initial, max } => {
                let shift = consecutive_skips.saturating_sub(1).min(31);
                let delay = initial.saturating_mul(1u32 << shift);
                Some(delay.min(max))
            }
        }
    }
}

/// What to do when a bus transaction fails while polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Return the first error
    #[default]
    Fatal,
    /// Log, sleep `backoff` and try again. Up to `max_consecutive` failures in a
    /// row are tolerated; the next one is returned as `RetriesExhausted`.
    Retry { max_consecutive: u32, backoff: Duration },
}

/// Pump settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpConfig {
    pub normalization: Normalization,
    pub poll: PollStrategy,
    pub errors: ErrorPolicy,
    pub pointer_read: PointerRead,
}

/// Counters accumulated by the pump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpStats {
    pub polls: u64,
    pub skipped: u64,
    pub samples: u64,
    pub bus_errors: u64,
}

/// Owns the sensor, a delay source and the output sink for the whole acquisition
pub struct SamplePump<I2C, D, S> {
    sensor: Max30102<I2C>,
    delay: D,
    sink: S,
    config: PumpConfig,
    stats: PumpStats,
    consecutive_skips: u32,
    consecutive_errors: u32,
}

impl<I2C, D, S> SamplePump<I2C, D, S>
where
    I2C: I2c,
    D: DelayNs,
    S: OutputSink,
{
    /// Create a pump over an already configured sensor
    pub fn new(sensor: Max30102<I2C>, delay: D, sink: S, config: PumpConfig) -> Self {
        Self {
            sensor,
            delay,
            sink,
            config,
            stats: PumpStats::default(),
            consecutive_skips: 0,
            consecutive_errors: 0,
        }
    }

    pub fn stats(&self) -> PumpStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Tear the pump apart, returning sensor, delay and sink
    pub fn into_parts(self) -> (Max30102<I2C>, D, S) {
        (self.sensor, self.delay, self.sink)
    }

    /// Run a single polling iteration.
    ///
    /// Reads both FIFO pointers, returns `Skipped` when nothing is pending,
    /// otherwise drains the pending slots in one transfer and writes one
    /// actuation value per slot to the sink, in FIFO order. No delays are
    /// applied here.
    pub fn poll_once(&mut self) -> Result<PollOutcome, I2C::Error> {
        self.stats.polls += 1;

        let pointers = self.sensor.read_pointers(self.config.pointer_read)?;
        if let Some(overflow) = pointers.overflow.filter(|&n| n > 0) {
            debug!("FIFO overflowed, {} samples lost", overflow);
        }

        let count = pointers.available();
        if should_skip(count) {
            self.stats.skipped += 1;
            return Ok(PollOutcome::Skipped);
        }

        let block = self.sensor.read_fifo_block(count)?;
        let samples = parse_fifo_block(&block);

        for sample in &samples {
            let value = self.config.normalization.apply(sample.red);
            info!("Here is the red LED Data: {}", value);
            self.sink.write(value);
        }

        self.stats.samples += samples.len() as u64;
        Ok(PollOutcome::Delivered(samples.len()))
    }

    /// Poll until `callback` returns [`StreamControl::Break`].
    ///
    /// Skipped polls are paced by the configured [`PollStrategy`]; bus errors
    /// are handled by the [`ErrorPolicy`]. The callback sees every outcome,
    /// skips and retried bus errors included, so a caller can stop an
    /// otherwise idle or failing loop.
    ///
    /// # Example
    /// ```no_run
    /// # use ft232_max30102_interface::{SamplePump, StreamControl, PollOutcome};
    /// # fn demo<I: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs>(
    /// #     mut pump: SamplePump<I, D, Vec<u8>>,
    /// # ) -> Result<(), ft232_max30102_interface::Max30102Error<I::Error>> {
    /// // Stop once 1000 values have been written
    /// let mut delivered = 0usize;
    /// pump.run(|outcome| {
    ///     if let PollOutcome::Delivered(n) = outcome {
    ///         delivered += *n;
    ///     }
    ///     if delivered >= 1000 {
    ///         StreamControl::Break
    ///     } else {
    ///         StreamControl::Continue
    ///     }
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn run<F>(&mut self, mut callback: F) -> Result<PumpStats, I2C::Error>
    where
        F: FnMut(&PollOutcome) -> StreamControl,
    {
        loop {
            let outcome = match self.poll_once() {
                Ok(outcome) => {
                    self.consecutive_errors = 0;
                    outcome
                }
                Err(Max30102Error::Bus(err)) => {
                    self.stats.bus_errors += 1;
                    self.consecutive_skips = 0;
                    self.handle_bus_error(err)?;
                    PollOutcome::BusError
                }
                Err(other) => return Err(other),
            };

            match outcome {
                PollOutcome::Skipped => {
                    self.consecutive_skips = self.consecutive_skips.saturating_add(1);
                    if let Some(idle) = self.config.poll.delay_for(self.consecutive_skips) {
                        sleep(&mut self.delay, idle);
                    }
                }
                PollOutcome::Delivered(_) => self.consecutive_skips = 0,
                PollOutcome::BusError => {}
            }

            if callback(&outcome) == StreamControl::Break {
                break;
            }
        }

        Ok(self.stats)
    }

    /// Apply the error policy; `Ok` means the caller should poll again
    fn handle_bus_error(&mut self, err: I2C::Error) -> Result<(), I2C::Error> {
        match self.config.errors {
            ErrorPolicy::Fatal => Err(Max30102Error::Bus(err)),
            ErrorPolicy::Retry {
                max_consecutive,
                backoff,
            } => {
                self.consecutive_errors += 1;
                if self.consecutive_errors > max_consecutive {
                    return Err(Max30102Error::RetriesExhausted {
                        attempts: self.consecutive_errors,
                        last: err,
                    });
                }

                warn!(
                    "Bus error while polling ({}/{}): {:?}, retrying in {:?}",
                    self.consecutive_errors, max_consecutive, err, backoff
                );
                sleep(&mut self.delay, backoff);
                Ok(())
            }
        }
    }
}

fn sleep<D: DelayNs>(delay: &mut D, duration: Duration) {
    let micros = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
    if micros > 0 {
        delay.delay_us(micros);
    }
}
