//! Trace sinks for simulation runs.
//!
//! A [`WaveformRecorder`] receives signal declarations once, then a stream
//! of timestamped value changes. It never feeds anything back into the
//! simulation. [`VcdRecorder`] writes IEEE 1364 Value Change Dump text that
//! GTKWave, Surfer and similar viewers can open.

use std::collections::HashMap;
use std::io::Write;

use relay_common::Bits;

use crate::error::SimError;
use crate::signal::SignalId;

/// Destination for recorded signal activity.
pub trait WaveformRecorder {
    /// Declares a signal in the current scope.
    fn register_signal(&mut self, id: SignalId, name: &str, width: u32) -> Result<(), SimError>;

    /// Opens a hierarchy level.
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError>;

    /// Closes the innermost hierarchy level.
    fn end_scope(&mut self) -> Result<(), SimError>;

    /// Records that `id` took `value` at `time_fs`. Times must not decrease.
    fn record_change(&mut self, time_fs: u64, id: SignalId, value: &Bits) -> Result<(), SimError>;

    /// Flushes any buffered output.
    fn finalize(&mut self) -> Result<(), SimError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Nothing written yet.
    Fresh,
    /// Header written, declarations open.
    Declaring,
    /// `$enddefinitions` written; only value changes follow.
    Dumping { time_fs: u64 },
}

struct VcdVar {
    code: String,
    width: u32,
}

/// VCD writer over any [`Write`] sink.
pub struct VcdRecorder<W: Write> {
    writer: W,
    vars: HashMap<SignalId, VcdVar>,
    phase: Phase,
}

impl<W: Write> VcdRecorder<W> {
    /// Wraps `writer`. Nothing is written until the first scope, signal or
    /// change.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            vars: HashMap::new(),
            phase: Phase::Fresh,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    // Short printable identifiers: "!" .. "~", then two characters, and so on.
    fn id_code(mut index: usize) -> String {
        let mut code = String::new();
        loop {
            code.push(char::from(b'!' + (index % 94) as u8));
            index /= 94;
            if index == 0 {
                return code;
            }
            index -= 1;
        }
    }

    fn open(&mut self) -> Result<(), SimError> {
        if self.phase == Phase::Fresh {
            writeln!(self.writer, "$version relay $end")?;
            writeln!(self.writer, "$timescale 1fs $end")?;
            self.phase = Phase::Declaring;
        }
        Ok(())
    }

    fn end_definitions(&mut self) -> Result<(), SimError> {
        self.open()?;
        if self.phase == Phase::Declaring {
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        Ok(())
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn register_signal(&mut self, id: SignalId, name: &str, width: u32) -> Result<(), SimError> {
        self.open()?;
        let code = Self::id_code(self.vars.len());
        writeln!(self.writer, "$var wire {width} {code} {name} $end")?;
        self.vars.insert(id, VcdVar { code, width });
        Ok(())
    }

    fn begin_scope(&mut self, name: &str) -> Result<(), SimError> {
        self.open()?;
        writeln!(self.writer, "$scope module {name} $end")?;
        Ok(())
    }

    fn end_scope(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn record_change(&mut self, time_fs: u64, id: SignalId, value: &Bits) -> Result<(), SimError> {
        match self.phase {
            Phase::Dumping { time_fs: last } if last == time_fs => {}
            Phase::Dumping { .. } => writeln!(self.writer, "#{time_fs}")?,
            _ => {
                self.end_definitions()?;
                writeln!(self.writer, "#{time_fs}")?;
            }
        }
        self.phase = Phase::Dumping { time_fs };

        let var = self.vars.get(&id).ok_or_else(|| SimError::Configuration {
            reason: format!("signal {} was not registered with the recorder", id.as_raw()),
        })?;
        if var.width == 1 {
            writeln!(self.writer, "{}{}", u8::from(value.to_bool()), var.code)?;
        } else {
            writeln!(self.writer, "b{value} {}", var.code)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        if !matches!(self.phase, Phase::Dumping { .. }) {
            self.end_definitions()?;
            self.phase = Phase::Dumping { time_fs: 0 };
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(rec: VcdRecorder<Vec<u8>>) -> String {
        String::from_utf8(rec.into_inner()).unwrap()
    }

    #[test]
    fn id_codes() {
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(0), "!");
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(93), "~");
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(94), "!!");
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(95), "\"!");
    }

    #[test]
    fn declarations_then_changes() {
        let clk = SignalId::from_raw(0);
        let data = SignalId::from_raw(1);
        let mut rec = VcdRecorder::new(Vec::new());
        rec.begin_scope("adder").unwrap();
        rec.register_signal(clk, "clk", 1).unwrap();
        rec.register_signal(data, "r_data", 5).unwrap();
        rec.end_scope().unwrap();
        rec.record_change(0, clk, &Bits::from_bool(false)).unwrap();
        rec.record_change(0, data, &Bits::from_i128(-3, 5)).unwrap();
        rec.record_change(5_000_000, clk, &Bits::from_bool(true))
            .unwrap();
        rec.finalize().unwrap();

        let expected = "\
$version relay $end
$timescale 1fs $end
$scope module adder $end
$var wire 1 ! clk $end
$var wire 5 \" r_data $end
$upscope $end
$enddefinitions $end
#0
0!
b11101 \"
#5000000
1!
";
        assert_eq!(output(rec), expected);
    }

    #[test]
    fn unregistered_signal_is_an_error() {
        let mut rec = VcdRecorder::new(Vec::new());
        let err = rec
            .record_change(0, SignalId::from_raw(9), &Bits::zero(1))
            .unwrap_err();
        assert!(matches!(err, SimError::Configuration { .. }));
    }

    #[test]
    fn finalize_without_changes_closes_definitions() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.begin_scope("top").unwrap();
        rec.end_scope().unwrap();
        rec.finalize().unwrap();
        let out = output(rec);
        assert!(out.ends_with("$enddefinitions $end\n"));
        assert_eq!(out.matches("$enddefinitions").count(), 1);
    }
}
