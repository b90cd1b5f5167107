use std::io::{self, Write};

/// Destination for rendered frames.
///
/// Receives the *entire* current tree rendering once per tick, not a
/// diff; the sink is responsible for replacing whatever it drew last.
/// Writes are at-most-once per tick: the renderer neither retries nor
/// buffers on failure.
pub trait Sink: Send {
    /// Writes one complete frame, replacing the previous one.
    fn write_frame(&mut self, frame: &str) -> io::Result<()>;
}

/// Terminal sink that redraws in place.
///
/// Tracks how many lines the previous frame drew and rewinds over them
/// with ANSI cursor movement (`ESC[nA ESC[2K ESC[J`) before writing the
/// next frame, so successive frames overwrite instead of scrolling.
pub struct OverwriteSink<W: Write> {
    target: W,
    frame_lines: usize,
}

impl OverwriteSink<io::Stdout> {
    /// Overwriting sink on the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> OverwriteSink<W> {
    pub fn new(target: W) -> Self {
        Self {
            target,
            frame_lines: 0,
        }
    }
}

impl<W: Write + Send> Sink for OverwriteSink<W> {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        if self.frame_lines > 0 {
            write!(self.target, "\r\x1b[{}A\x1b[2K\x1b[J", self.frame_lines)?;
            self.target.flush()?;
        }
        writeln!(self.target, "{frame}")?;
        self.target.flush()?;
        // Count the trailing newline too so the rewind lands on line one.
        self.frame_lines = frame.bytes().filter(|&b| b == b'\n').count() + 1;
        Ok(())
    }
}

/// Adapts a closure into a [`Sink`], mostly for tests and custom
/// integrations that capture frames instead of writing to a terminal.
pub struct FnSink<F: FnMut(&str) + Send>(pub F);

impl<F: FnMut(&str) + Send> Sink for FnSink<F> {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        (self.0)(frame);
        Ok(())
    }
}
