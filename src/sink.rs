//! Output sinks for actuation values

use std::io::Write;

use crate::common::create_level_bar;

/// Receives one actuation value per decoded sample. Writes are not acknowledged.
pub trait OutputSink {
    fn write(&mut self, value: u8);
}

impl OutputSink for Vec<u8> {
    fn write(&mut self, value: u8) {
        self.push(value);
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write(&mut self, value: u8) {
        (**self).write(value);
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn write(&mut self, value: u8) {
        (**self).write(value);
    }
}

/// Discards every value
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write(&mut self, _value: u8) {}
}

/// Draws the waveform as one horizontal bar per sample
pub struct WaveformSink<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> WaveformSink<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self { out, width }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl WaveformSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), 64)
    }
}

impl<W: Write> OutputSink for WaveformSink<W> {
    fn write(&mut self, value: u8) {
        let bar = create_level_bar(value as u32, u8::MAX as u32, self.width);
        // A closed terminal must not stop acquisition
        let _ = writeln!(self.out, "{:3} |{}|", value, bar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_records_in_order() {
        let mut sink: Vec<u8> = Vec::new();
        OutputSink::write(&mut sink, 3);
        OutputSink::write(&mut sink, 1);
        let mut borrowed = &mut sink;
        OutputSink::write(&mut borrowed, 2);
        assert_eq!(sink, vec![3, 1, 2]);
    }

    #[test]
    fn test_waveform_lines() {
        let mut sink = WaveformSink::new(Vec::new(), 4);
        OutputSink::write(&mut sink, 0);
        OutputSink::write(&mut sink, 255);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "  0 |    |\n255 |████|\n");
    }
}
