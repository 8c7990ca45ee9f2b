use std::io::{IsTerminal, Write};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Receives progress while files are verified.
///
/// Calls are advisory: a sink has no way to stop verification, so whatever
/// it does with the numbers (drawing, logging, nothing) cannot fail a batch.
pub trait ProgressSink {
    /// A new file is about to be opened. `index` is 0-based.
    fn file_started(&mut self, _index: usize, _count: usize, _filename: &str) {}

    /// `bytes_read` bytes of `filename` have been hashed so far.
    /// `total_bytes` is `None` when the size could not be determined.
    fn on_progress(&mut self, filename: &str, bytes_read: u64, total_bytes: Option<u64>);
}

impl<F> ProgressSink for F
where
    F: FnMut(&str, u64, Option<u64>),
{
    fn on_progress(&mut self, filename: &str, bytes_read: u64, total_bytes: Option<u64>) {
        self(filename, bytes_read, total_bytes)
    }
}

/// Sink that drops every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _filename: &str, _bytes_read: u64, _total_bytes: Option<u64>) {}
}

const UNKNOWN_TOTAL: u64 = u64::MAX;

/// Shared status for a running verification, optionally drawn on stderr by a
/// background ticker. Clones share state, so one clone can be handed to the
/// verifier while another owns the ticker.
#[derive(Clone)]
pub struct Progress {
    enabled: bool,
    interval: Duration,
    pub current: Arc<Mutex<String>>,
    pub file_index: Arc<AtomicUsize>,
    pub file_count: Arc<AtomicUsize>,
    pub bytes_done: Arc<AtomicU64>,
    pub bytes_total: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            interval: Duration::from_millis(250),
            current: Arc::new(Mutex::new(String::new())),
            file_index: Arc::new(AtomicUsize::new(0)),
            file_count: Arc::new(AtomicUsize::new(0)),
            bytes_done: Arc::new(AtomicU64::new(0)),
            bytes_total: Arc::new(AtomicU64::new(UNKNOWN_TOTAL)),
            running: Arc::new(AtomicBool::new(false)),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn set_current(&self, filename: &str) {
        if let Ok(mut cur) = self.current.lock() {
            cur.clear();
            cur.push_str(filename);
        }
    }

    pub fn reset_bytes(&self, total: Option<u64>) {
        self.bytes_total.store(total.unwrap_or(UNKNOWN_TOTAL), Ordering::Relaxed);
        self.bytes_done.store(0, Ordering::Relaxed);
    }

    /// Current (filename, bytes done, total bytes).
    pub fn snapshot(&self) -> (String, u64, Option<u64>) {
        let name = self.current.lock().map(|s| s.clone()).unwrap_or_default();
        let done = self.bytes_done.load(Ordering::Relaxed);
        let total = match self.bytes_total.load(Ordering::Relaxed) {
            UNKNOWN_TOTAL => None,
            t => Some(t),
        };
        (name, done, total)
    }

    /// One status line for the current state.
    pub fn status_line(&self) -> String {
        let (name, done, total) = self.snapshot();
        let idx = self.file_index.load(Ordering::Relaxed);
        let count = self.file_count.load(Ordering::Relaxed);
        status_line(&name, done, total, idx, count)
    }

    /// Spawn the ticker thread. No-op when disabled or already running.
    pub fn start(&self) {
        if !self.enabled || self.running.swap(true, Ordering::Relaxed) {
            return;
        }
        let me = self.clone();
        let handle = thread::spawn(move || {
            let t0 = Instant::now();
            let tty = std::io::stderr().is_terminal();
            while me.running.load(Ordering::Relaxed) {
                thread::park_timeout(me.interval);
                if !me.running.load(Ordering::Relaxed) {
                    break;
                }
                let line = format!("[{:>4}s] {}", t0.elapsed().as_secs(), me.status_line());
                let mut err = std::io::stderr().lock();
                // Drawing is best effort; a closed or full stderr must not matter.
                let _ = if tty {
                    write!(err, "\r{line}\x1b[K").and_then(|_| err.flush())
                } else {
                    writeln!(err, "{line}")
                };
            }
        });
        if let Ok(mut slot) = self.ticker.lock() {
            *slot = Some(handle);
        }
    }

    /// Stop and join the ticker, clearing the transient line on a terminal.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }
        let handle = self.ticker.lock().ok().and_then(|mut slot| slot.take());
        if let Some(h) = handle {
            h.thread().unpark();
            let _ = h.join();
        }
        if std::io::stderr().is_terminal() {
            let _ = write!(std::io::stderr().lock(), "\r\x1b[K");
        }
    }
}

impl ProgressSink for Progress {
    fn file_started(&mut self, index: usize, count: usize, filename: &str) {
        self.file_index.store(index, Ordering::Relaxed);
        self.file_count.store(count, Ordering::Relaxed);
        self.set_current(filename);
        self.reset_bytes(None);
    }

    fn on_progress(&mut self, _filename: &str, bytes_read: u64, total_bytes: Option<u64>) {
        self.bytes_total.store(total_bytes.unwrap_or(UNKNOWN_TOTAL), Ordering::Relaxed);
        self.bytes_done.store(bytes_read, Ordering::Relaxed);
    }
}

/// `[i/n] Checking <file> NN%`, or a byte count when the total is unknown or zero.
pub fn status_line(filename: &str, done: u64, total: Option<u64>, index: usize, count: usize) -> String {
    let prefix = if count > 0 { format!("[{}/{}] ", index + 1, count) } else { String::new() };
    match total {
        Some(t) if t > 0 => {
            let pct = (u128::from(done) * 100 / u128::from(t)).min(100);
            format!("{prefix}Checking {filename} {pct:>3}%")
        }
        _ => format!("{prefix}Checking {filename} {done} bytes"),
    }
}
