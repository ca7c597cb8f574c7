//! Rolling Logger
//!
//! Installs a `tracing-subscriber` formatter that writes every line to
//! stderr, to `<log_dir>/<app>.log` (rotated past a size limit) and to a
//! bounded in-memory ring. Records from the `log` facade are bridged in.

use chrono::Local;
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Rotation and buffering limits
#[derive(Debug, Clone)]
pub struct RollingConfig {
    /// Size at which the active file is rotated
    pub max_bytes: u64,
    /// Rotated files kept next to the active one (`app.log.1` ..= `app.log.N`)
    pub max_files: usize,
    /// Lines kept for `recent_logs`
    pub ring_capacity: usize,
    /// Also echo lines to stderr
    pub echo_stderr: bool,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_files: 3,
            ring_capacity: 200,
            echo_stderr: true,
        }
    }
}

struct RollingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_files: usize,
}

fn rotated_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl RollingFile {
    fn open(path: PathBuf, config: &RollingConfig) -> io::Result<Self> {
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            written,
            max_bytes: config.max_bytes,
            max_files: config.max_files,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        if self.max_files == 0 {
            self.file = File::create(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = rotated_path(&self.path, self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = rotated_path(&self.path, index);
            if from.exists() {
                fs::rename(&from, rotated_path(&self.path, index + 1))?;
            }
        }
        fs::rename(&self.path, rotated_path(&self.path, 1))?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        let len = line.len() as u64;
        if self.written > 0 && self.written + len > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(line)?;
        self.written += len;
        Ok(())
    }
}

struct LoggerState {
    file: Mutex<RollingFile>,
    ring: Mutex<VecDeque<String>>,
    ring_capacity: usize,
    echo_stderr: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl LoggerState {
    fn new(path: PathBuf, config: &RollingConfig) -> io::Result<Self> {
        Ok(Self {
            file: Mutex::new(RollingFile::open(path, config)?),
            ring: Mutex::new(VecDeque::with_capacity(config.ring_capacity)),
            ring_capacity: config.ring_capacity,
            echo_stderr: config.echo_stderr,
        })
    }

    fn record(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if self.echo_stderr {
            let _ = io::stderr().write_all(bytes);
        }
        // Nowhere left to report a failing log file
        let _ = lock(&self.file).write_line(bytes);

        if self.ring_capacity == 0 {
            return;
        }
        let mut ring = lock(&self.ring);
        for line in String::from_utf8_lossy(bytes).lines() {
            if ring.len() == self.ring_capacity {
                ring.pop_front();
            }
            ring.push_back(line.to_string());
        }
    }

    fn recent(&self) -> Vec<String> {
        lock(&self.ring).iter().cloned().collect()
    }
}

/// Buffers one formatted event, hands it to the state on drop
struct TeeWriter {
    state: Arc<LoggerState>,
    buf: Vec<u8>,
}

impl Write for TeeWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for TeeWriter {
    fn drop(&mut self) {
        self.state.record(&self.buf);
    }
}

#[derive(Clone)]
struct TeeMakeWriter {
    state: Arc<LoggerState>,
}

impl<'a> MakeWriter<'a> for TeeMakeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            state: self.state.clone(),
            buf: Vec::new(),
        }
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format(TIME_FORMAT))
    }
}

static STATE: OnceLock<Arc<LoggerState>> = OnceLock::new();

/// Initialize the global logger with default limits
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, RollingConfig::default())
}

/// Initialize the global logger. Fails if called twice.
///
/// The level filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logger_with(log_dir: PathBuf, app_name: &str, config: RollingConfig) -> Result<(), String> {
    fs::create_dir_all(&log_dir)
        .map_err(|e| format!("Failed to create log dir {}: {}", log_dir.display(), e))?;
    let path = log_dir.join(format!("{}.log", app_name));
    let state = Arc::new(
        LoggerState::new(path.clone(), &config)
            .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?,
    );
    STATE
        .set(state.clone())
        .map_err(|_| "Logger already initialized".to_string())?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_writer(TeeMakeWriter { state });

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    log::info!("Logging to {}", path.display());
    Ok(())
}

fn write_direct(level: &str, msg: &str) -> Result<(), String> {
    let state = STATE.get().ok_or("Logger not initialized")?;
    let line = format!("{} {:>5} {}\n", Local::now().format(TIME_FORMAT), level, msg);
    state.record(line.as_bytes());
    Ok(())
}

/// Write an INFO line straight to the log, bypassing filters
pub fn info(msg: &str) -> Result<(), String> {
    write_direct("INFO", msg)
}

/// Write an ERROR line straight to the log, bypassing filters
pub fn error(msg: &str) -> Result<(), String> {
    write_direct("ERROR", msg)
}

/// Most recent log lines, oldest first. Empty before initialization.
pub fn recent_logs() -> Vec<String> {
    STATE.get().map(|state| state.recent()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet(max_bytes: u64, max_files: usize, ring_capacity: usize) -> RollingConfig {
        RollingConfig {
            max_bytes,
            max_files,
            ring_capacity,
            echo_stderr: false,
        }
    }

    #[test]
    fn test_rotates_past_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let state = LoggerState::new(path.clone(), &quiet(20, 2, 10)).unwrap();

        state.record(b"first line 123456\n");
        state.record(b"second line 12345\n");
        state.record(b"third line 123456\n");

        assert_eq!(fs::read_to_string(&path).unwrap(), "third line 123456\n");
        assert_eq!(
            fs::read_to_string(rotated_path(&path, 1)).unwrap(),
            "second line 12345\n"
        );
        assert_eq!(
            fs::read_to_string(rotated_path(&path, 2)).unwrap(),
            "first line 123456\n"
        );
    }

    #[test]
    fn test_keeps_at_most_max_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let state = LoggerState::new(path.clone(), &quiet(10, 1, 10)).unwrap();

        for i in 0..5 {
            state.record(format!("line {:05}\n", i).as_bytes());
        }

        assert!(rotated_path(&path, 1).exists());
        assert!(!rotated_path(&path, 2).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "line 00004\n");
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\n").unwrap();

        let state = LoggerState::new(path.clone(), &quiet(1024, 1, 10)).unwrap();
        state.record(b"new\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_ring_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let state = LoggerState::new(dir.path().join("app.log"), &quiet(1024, 1, 2)).unwrap();

        state.record(b"a\n");
        state.record(b"b\nc\n");
        assert_eq!(state.recent(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_writer_records_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let state = Arc::new(LoggerState::new(path.clone(), &quiet(1024, 1, 10)).unwrap());
        let make = TeeMakeWriter { state: state.clone() };

        {
            let mut writer = make.make_writer();
            write!(writer, "hello ").unwrap();
            writeln!(writer, "world").unwrap();
            assert!(state.recent().is_empty());
        }

        assert_eq!(state.recent(), vec!["hello world".to_string()]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world\n");
    }

    #[test]
    fn test_helpers_require_init() {
        // The global logger is never installed in unit tests
        assert!(recent_logs().is_empty());
        assert!(info("nobody listening").is_err());
    }
}
