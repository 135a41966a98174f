use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
}

/// Destination for everything the reporter writes.
///
/// `info` and `log` go to the primary stream, `error` to the secondary one. Each call is one
/// line (or, for `error`, one already-joined block).
pub trait LogSink: Send + Sync {
    /// Secondary informational output, subject to the log level.
    fn info(&self, line: &str) -> std::io::Result<()>;

    /// Protocol output that must always reach the stream.
    fn log(&self, line: &str) -> std::io::Result<()>;

    fn error(&self, text: &str) -> std::io::Result<()>;
}

type SharedWrite = Mutex<Box<dyn Write + Send>>;

pub struct StreamSink {
    level: LogLevel,
    out: SharedWrite,
    err: SharedWrite,
}

impl StreamSink {
    pub fn new(level: LogLevel, out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            level,
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Primary output on stdout, errors on stderr.
    pub fn stdio(level: LogLevel) -> Self {
        Self::new(level, Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }

    /// Both channels appended to a single file, created if missing.
    pub fn file(path: impl AsRef<Path>, level: LogLevel) -> std::io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        let err = file.try_clone()?;

        Ok(Self::new(level, Box::new(file), Box::new(err)))
    }

    fn write_line(stream: &SharedWrite, text: &str) -> std::io::Result<()> {
        let mut stream = lock(stream);
        writeln!(stream, "{text}")?;
        stream.flush()
    }
}

impl LogSink for StreamSink {
    fn info(&self, line: &str) -> std::io::Result<()> {
        if self.level >= LogLevel::Info {
            Self::write_line(&self.out, line)?;
        }
        Ok(())
    }

    fn log(&self, line: &str) -> std::io::Result<()> {
        Self::write_line(&self.out, line)
    }

    fn error(&self, text: &str) -> std::io::Result<()> {
        Self::write_line(&self.err, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Info,
    Log,
    Error,
}

/// Keeps every write in memory, in order. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<(Channel, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(Channel, String)> {
        lock(&self.records).clone()
    }

    pub fn channel(&self, channel: Channel) -> Vec<String> {
        lock(&self.records)
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Everything on the primary stream, one entry per line.
    pub fn primary(&self) -> Vec<String> {
        lock(&self.records)
            .iter()
            .filter(|(c, _)| *c != Channel::Error)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn push(&self, channel: Channel, text: &str) -> std::io::Result<()> {
        lock(&self.records).push((channel, text.to_string()));
        Ok(())
    }
}

impl LogSink for MemorySink {
    fn info(&self, line: &str) -> std::io::Result<()> {
        self.push(Channel::Info, line)
    }

    fn log(&self, line: &str) -> std::io::Result<()> {
        self.push(Channel::Log, line)
    }

    fn error(&self, text: &str) -> std::io::Result<()> {
        self.push(Channel::Error, text)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn error_level_drops_info_only() {
        let (out, err) = (Buffer::default(), Buffer::default());
        let sink = StreamSink::new(LogLevel::Error, Box::new(out.clone()), Box::new(err.clone()));

        sink.info("# comment").unwrap();
        sink.log("ok 1").unwrap();
        sink.error("boom").unwrap();

        assert_eq!(out.text(), "ok 1\n");
        assert_eq!(err.text(), "boom\n");
    }

    #[test]
    fn info_level_writes_everything() {
        let (out, err) = (Buffer::default(), Buffer::default());
        let sink = StreamSink::new(LogLevel::Info, Box::new(out.clone()), Box::new(err.clone()));

        sink.info("# comment").unwrap();
        sink.log("ok 1").unwrap();

        assert_eq!(out.text(), "# comment\nok 1\n");
        assert_eq!(err.text(), "");
    }

    #[test]
    fn memory_sink_clones_share_records() {
        let sink = MemorySink::new();
        let handle = sink.clone();

        sink.log("ok 1").unwrap();
        sink.error("boom").unwrap();

        assert_eq!(
            handle.records(),
            vec![(Channel::Log, "ok 1".to_string()), (Channel::Error, "boom".to_string())]
        );
        assert_eq!(handle.primary(), vec!["ok 1".to_string()]);
    }

    #[test]
    fn file_sink_appends() {
        let path = std::env::temp_dir().join(format!("tap_reporter_sink_{}.tap", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let sink = StreamSink::file(&path, LogLevel::Info).unwrap();
        sink.log("ok 1").unwrap();
        sink.error("boom").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ok 1\nboom\n");
        let _ = std::fs::remove_file(&path);
    }
}
