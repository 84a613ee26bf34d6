//! Scoped capture of the diagnostic output produced while a report is generated.
//!
//! The textual output of this process is its `tracing` dispatcher. While a
//! [`LogCapture`] runs, a thread-scoped dispatcher writing into a [`LogBuffer`]
//! replaces the current one, and the profiler gets a [`LineForwarder`] to use
//! as its console. The previous dispatcher comes back when the scope guard is
//! dropped, which also happens while unwinding from a panic.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Target used for lines written to the profiler console.
pub const PROFILING_TARGET: &str = "dataprofile::profiling";

/// Shared, growing text sink.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<String>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn contents(&self) -> String {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

pub struct LogBufferWriter {
    inner: Arc<Mutex<String>>,
}

impl Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().push_str(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferWriter {
            inner: self.inner.clone(),
        }
    }
}

/// `Write` adapter turning each non-empty line of text into a log event.
pub struct LineForwarder {
    level: Level,
    pending: Vec<u8>,
}

impl LineForwarder {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            pending: Vec::new(),
        }
    }

    fn emit(&self, raw: &[u8]) {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim_end();
        if line.is_empty() {
            return;
        }
        if self.level == Level::ERROR {
            tracing::error!(target: PROFILING_TARGET, "{}", line);
        } else if self.level == Level::WARN {
            tracing::warn!(target: PROFILING_TARGET, "{}", line);
        } else if self.level == Level::INFO {
            tracing::info!(target: PROFILING_TARGET, "{}", line);
        } else if self.level == Level::DEBUG {
            tracing::debug!(target: PROFILING_TARGET, "{}", line);
        } else {
            tracing::trace!(target: PROFILING_TARGET, "{}", line);
        }
    }
}

impl Write for LineForwarder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&rest);
        }
        Ok(())
    }
}

impl Drop for LineForwarder {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// One capture session. Its buffer is read once, after the capture ends.
pub struct LogCapture {
    buffer: LogBuffer,
    level: Level,
}

impl Default for LogCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl LogCapture {
    pub fn new() -> Self {
        Self::with_level(Level::INFO)
    }

    /// Capture events at `level` and above.
    pub fn with_level(level: Level) -> Self {
        Self {
            buffer: LogBuffer::new(),
            level,
        }
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    /// Run `f` with output redirected into the buffer.
    pub fn run<T>(&self, f: impl FnOnce(&mut LineForwarder) -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.buffer.clone())
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .with_max_level(self.level)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        // Declared after the guard so it is flushed while the capture is still active.
        let mut console = LineForwarder::new(Level::INFO);
        let output = f(&mut console);
        let _ = console.flush();
        output
    }

    pub fn finish(self) -> String {
        self.buffer.contents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn outer_subscriber(buffer: &LogBuffer) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish()
    }

    #[test]
    fn test_console_lines_are_forwarded() {
        let capture = LogCapture::new();
        capture.run(|console| {
            write!(console, "first line\n\n  \nsecond ").unwrap();
            write!(console, "line\nunterminated").unwrap();
        });
        let text = capture.finish();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("first line"));
        assert!(lines[1].ends_with("second line"));
        assert!(lines[2].ends_with("unterminated"));
        assert!(lines[0].contains("INFO"));
    }

    #[test]
    fn test_previous_dispatcher_restored_after_capture() {
        let outer = LogBuffer::new();
        tracing::subscriber::with_default(outer_subscriber(&outer), || {
            let capture = LogCapture::new();
            capture.run(|console| {
                writeln!(console, "inside").unwrap();
                tracing::info!("event inside");
            });
            tracing::info!("after capture");

            let captured = capture.finish();
            assert!(captured.contains("inside"));
            assert!(captured.contains("event inside"));
            assert!(!captured.contains("after capture"));
            assert!(outer.contents().contains("after capture"));
            assert!(!outer.contents().contains("inside"));
        });
    }

    #[test]
    fn test_previous_dispatcher_restored_after_panic() {
        let outer = LogBuffer::new();
        tracing::subscriber::with_default(outer_subscriber(&outer), || {
            let capture = LogCapture::new();
            let result = catch_unwind(AssertUnwindSafe(|| {
                capture.run(|console| {
                    write!(console, "about to fail").unwrap();
                    panic!("boom");
                })
            }));
            assert!(result.is_err());
            tracing::info!("still visible");

            assert!(capture.buffer().contents().contains("about to fail"));
            assert!(outer.contents().contains("still visible"));
        });
    }

    #[test]
    fn test_buffer_grows_monotonically() {
        let capture = LogCapture::new();
        let buffer = capture.buffer().clone();
        let lengths = capture.run(|console| {
            let mut lengths = vec![buffer.len()];
            for i in 0..5 {
                writeln!(console, "step {}", i).unwrap();
                lengths.push(buffer.len());
            }
            lengths
        });
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
        assert!(capture.finish().len() >= *lengths.last().unwrap());
    }

    #[test]
    fn test_level_filter_drops_debug_events() {
        let capture = LogCapture::new();
        capture.run(|_| {
            tracing::debug!("hidden detail");
            tracing::warn!("visible warning");
        });
        let text = capture.finish();
        assert!(!text.contains("hidden detail"));
        assert!(text.contains("visible warning"));
    }
}
