//! MAX30102 reader - Continuous FIFO acquisition and waveform output
//!
//! Configures the MAX30102 over an FT232H bridge, then drains its FIFO forever,
//! writing one 8-bit actuation value per red-LED sample to the output sink.
//!
//! Usage:
//!   max30102-reader --channel 0 --sink waveform

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use ft232_max30102_interface::{
    BusConfig, DeviceConfig, ErrorPolicy, FtdiError, Ft232hBus, Max30102, Max30102Error,
    Normalization, NullSink, OutputSink, PointerRead, PollStrategy, PumpConfig, SamplePump,
    StdDelay, StreamControl, TimeKeeper, WaveformSink,
};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SinkKind {
    /// Terminal bar graph, one line per sample
    Waveform,
    /// Log output only
    Log,
}

#[derive(Parser, Debug)]
#[command(name = "max30102-reader")]
#[command(about = "Stream MAX30102 red-LED samples as 8-bit output values", long_about = None)]
struct Args {
    /// FT232H I2C channel index
    #[arg(short, long, default_value = "0")]
    channel: u32,

    /// Idle time after an empty poll in microseconds (0 = busy-poll)
    #[arg(short, long, default_value = "0")]
    poll_interval_us: u64,

    /// Clamp out-of-window readings to 0/255 instead of wrapping
    #[arg(long)]
    saturate: bool,

    /// Read both FIFO pointers in a single transaction
    #[arg(long)]
    burst_pointers: bool,

    /// Consecutive bus errors tolerated while polling (0 = stop on first error)
    #[arg(short, long, default_value = "0")]
    retries: u32,

    /// Where actuation values go
    #[arg(long, value_enum, default_value = "waveform")]
    sink: SinkKind,
}

impl Args {
    fn pump_config(&self) -> PumpConfig {
        PumpConfig {
            normalization: if self.saturate {
                Normalization::Saturating
            } else {
                Normalization::Wrapping
            },
            poll: match self.poll_interval_us {
                0 => PollStrategy::Busy,
                us => PollStrategy::Fixed(Duration::from_micros(us)),
            },
            errors: match self.retries {
                0 => ErrorPolicy::Fatal,
                n => ErrorPolicy::Retry {
                    max_consecutive: n,
                    backoff: Duration::from_millis(500),
                },
            },
            pointer_read: if self.burst_pointers {
                PointerRead::Burst
            } else {
                PointerRead::Separate
            },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("MAX30102 Reader");
    println!("===============");
    println!("Initializing FT232H I2C interface...");

    let bus = match Ft232hBus::open(BusConfig {
        channel_index: args.channel,
        ..BusConfig::default()
    }) {
        Ok(bus) => bus,
        Err(FtdiError::NoChannelsFound) => {
            eprintln!("Error: No FT232H devices found.");
            eprintln!("Please check:");
            eprintln!("  1. FT232H is connected via USB");
            eprintln!("  2. FTDI drivers are installed");
            eprintln!("  3. No other application is using the device");
            return Err(Box::new(FtdiError::NoChannelsFound));
        }
        Err(e) => {
            eprintln!("Error opening FT232H: {}", e);
            return Err(Box::new(e));
        }
    };

    let mut sensor = Max30102::new(bus);
    let mut delay = StdDelay;

    match sensor.verify_part_id() {
        Ok(()) => {}
        Err(Max30102Error::InvalidPartId(id)) => {
            eprintln!("Error: Invalid MAX30102 part ID: 0x{:02X}", id);
            eprintln!("Please check:");
            eprintln!("  1. MAX30102 is properly connected to FT232H I2C pins");
            eprintln!("  2. Power supply to the sensor board is correct");
            eprintln!("  3. Pull-up resistors are present on SDA/SCL lines");
            return Err(Box::new(Max30102Error::<FtdiError>::InvalidPartId(id)));
        }
        Err(e) => return Err(Box::new(e)),
    }

    // Configuration failures are fatal: there is no valid operating mode without it
    if let Err(e) = sensor.configure(&DeviceConfig::default(), &mut delay) {
        eprintln!("Error configuring sensor: {}", e);
        return Err(Box::new(e));
    }
    println!("Sensor configured!");
    println!("Press Ctrl+C to exit\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let sink: Box<dyn OutputSink> = match args.sink {
        SinkKind::Waveform => Box::new(WaveformSink::stdout()),
        SinkKind::Log => Box::new(NullSink),
    };

    let timer = TimeKeeper::new();
    let mut pump = SamplePump::new(sensor, delay, sink, args.pump_config());

    let stats = pump.run(|_| {
        if running.load(Ordering::SeqCst) {
            StreamControl::Continue
        } else {
            StreamControl::Break
        }
    })?;

    let elapsed = timer.elapsed_secs();
    println!("\nStopped.");
    println!("Polls: {} ({} empty)", stats.polls, stats.skipped);
    println!("Samples: {}", stats.samples);
    println!("Bus errors: {}", stats.bus_errors);
    if elapsed > 0.0 {
        println!("Average rate: {:.1} Hz", stats.samples as f64 / elapsed);
    }

    Ok(())
}
