//! Per-cycle trace records and the line-oriented trace writer.
//!
//! Each retired instruction produces one line:
//!
//! ```text
//! PPPP IIIIIIIIIIIIIIII W R VVVV N Z D AAAA DDDD
//! ```
//!
//! `PPPP` is the `PC` in hex, followed by the instruction word in binary (MSB first),
//! the register write enable, destination index and value, the `NZP` write enable and
//! value, the data-memory write enable, then the data-memory address and value.

use std::fmt;
use std::io::{self, Write};

use crate::{ControlSignals, TraceSink};

/// One retired cycle: where it ran, what it was, and the signals it drove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleRecord {
    /// `PC` of the retired instruction.
    pub pc: u16,
    /// Raw instruction word.
    pub word: u16,
    /// Control signals produced by the handler.
    pub signals: ControlSignals,
}

impl fmt::Display for CycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.signals;
        write!(
            f,
            "{:04X} {:016b} {} {} {:04X} {} {} {} {:04X} {:04X}",
            self.pc,
            self.word,
            u8::from(s.reg_file_we),
            s.reported_rd(),
            s.reported_reg_value(),
            u8::from(s.nzp_we()),
            s.nzp_val(),
            u8::from(s.data_we),
            s.dmem_addr,
            s.dmem_value,
        )
    }
}

/// Trace sink that renders each record as a text line into `W`.
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    out: W,
}

impl<W: Write> TraceWriter<W> {
    /// Wraps an output stream.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns the underlying stream's flush error.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for TraceWriter<W> {
    fn on_cycle(&mut self, record: &CycleRecord) -> io::Result<()> {
        writeln!(self.out, "{record}")
    }
}
