//! Output destinations for encoded entries.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// Destination for encoded log lines.
///
/// Implementations serialize concurrent writes themselves.
pub trait Sink: Send + Sync {
    fn write(&self, line: &[u8]) -> io::Result<()>;

    /// Flushes buffered output.
    fn sync(&self) -> io::Result<()>;
}

/// Locks any [`Write`] so whole lines are written atomically.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&self, line: &[u8]) -> io::Result<()> {
        self.writer.lock().write_all(line)
    }

    fn sync(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

/// In-memory sink. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Parses every line as JSON, skipping lines that are not valid JSON.
    pub fn entries(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, line: &[u8]) -> io::Result<()> {
        self.buffer.lock().extend_from_slice(line);
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write(&self, line: &[u8]) -> io::Result<()> {
        (**self).write(line)
    }

    fn sync(&self) -> io::Result<()> {
        (**self).sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn writer_sink_writes_whole_lines() {
        let sink = WriterSink::new(Vec::new());
        sink.write(b"{\"a\":1}\n").unwrap();
        sink.write(b"{\"b\":2}\n").unwrap();
        sink.sync().unwrap();

        let written = sink.writer.lock().clone();
        assert_eq!(written, b"{\"a\":1}\n{\"b\":2}\n");
    }

    #[test]
    fn writer_sink_surfaces_flush_error() {
        let sink = WriterSink::new(BrokenWriter);
        let err = sink.sync().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn memory_sink_lines_do_not_interleave() {
        let sink = MemorySink::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for j in 0..50 {
                        let line = format!("{{\"worker\":{},\"n\":{}}}\n", i, j);
                        sink.write(line.as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sink.entries().len(), 400);
    }

    #[test]
    fn memory_sink_clear_empties_buffer() {
        let sink = MemorySink::new();
        sink.write(b"x\n").unwrap();
        sink.clear();
        assert!(sink.contents().is_empty());
    }
}
