// Background position logger
// Polls the shared cursor on a fixed interval and appends every new position to a file

use chrono::Local;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Session identifier written in the log header
pub fn session_stamp() -> String {
    Local::now().to_rfc3339()
}

/// Write the header block: title, session line, blank line
pub fn write_header<W: Write>(out: &mut W, session: &str) -> io::Result<()> {
    writeln!(out, "Player coordinates log")?;
    writeln!(out, "Session: {}", session)?;
    writeln!(out)?;
    out.flush()
}

/// Last position written to the log; None until the first write
#[derive(Debug, Default)]
pub struct Tracker {
    last: Option<usize>,
}

impl Tracker {
    /// Append `Position: <n>` if `cursor` differs from the last logged value
    /// Returns whether a line was written
    pub fn record<W: Write>(&mut self, cursor: usize, out: &mut W) -> io::Result<bool> {
        if self.last == Some(cursor) {
            return Ok(false);
        }
        writeln!(out, "Position: {}", cursor)?;
        out.flush()?;
        self.last = Some(cursor);
        Ok(true)
    }
}

/// Handle to the logger thread
/// The thread owns the file; the game shares only the cursor and the stop flag
pub struct PositionLogger {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<io::Result<()>>,
}

impl PositionLogger {
    pub fn spawn(path: PathBuf, session: String, interval: Duration, cursor: Arc<AtomicUsize>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || -> io::Result<()> {
            let mut out = BufWriter::new(File::create(&path)?);
            write_header(&mut out, &session)?;
            let mut tracker = Tracker::default();
            while !flag.load(Ordering::Relaxed) {
                tracker.record(cursor.load(Ordering::Relaxed), &mut out)?;
                thread::sleep(interval);
            }
            Ok(())
        });
        PositionLogger { stop, handle }
    }

    /// Ask the thread to stop at its next poll; does not wait for it
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Cancel, then collect the thread's error if it has already ended with one
    /// (e.g. the file could not be opened)
    pub fn stop(self) -> Option<io::Error> {
        self.cancel();
        if !self.handle.is_finished() {
            return None;
        }
        match self.handle.join() {
            Ok(result) => result.err(),
            Err(_) => Some(io::Error::new(io::ErrorKind::Other, "position logger panicked")),
        }
    }

    /// Stop and wait for the thread to exit
    #[cfg(test)]
    fn join(self) -> io::Result<()> {
        self.cancel();
        self.handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "position logger panicked")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_log(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("zerordead-{}-{}.log", name, std::process::id()));
        path
    }

    #[test]
    fn header_has_title_session_and_blank_line() {
        let mut out = Vec::new();
        write_header(&mut out, "2026-10-19T10:00:00+00:00").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Player coordinates log\nSession: 2026-10-19T10:00:00+00:00\n\n"
        );
    }

    #[test]
    fn writes_only_when_the_cursor_changes() {
        let mut out = Vec::new();
        let mut tracker = Tracker::default();
        let polls = [0, 0, 0, 1, 1, 21, 21, 1, 1];
        let written: Vec<bool> = polls.iter().map(|&c| tracker.record(c, &mut out).unwrap()).collect();
        assert_eq!(written, [true, false, false, true, false, true, false, true, false]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Position: 0\nPosition: 1\nPosition: 21\nPosition: 1\n"
        );
    }

    #[test]
    fn thread_logs_positions_until_stopped() {
        let path = temp_log("thread");
        let cursor = Arc::new(AtomicUsize::new(0));
        let logger = PositionLogger::spawn(path.clone(), "s1".to_string(), Duration::from_millis(5), Arc::clone(&cursor));

        thread::sleep(Duration::from_millis(100));
        cursor.store(3, Ordering::Relaxed);
        thread::sleep(Duration::from_millis(100));
        logger.join().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(text, "Player coordinates log\nSession: s1\n\nPosition: 0\nPosition: 3\n");
    }

    #[test]
    fn stop_reports_open_failure() {
        let mut path = temp_log("missing-dir");
        path.push("nested");
        path.push("log.log");
        let logger = PositionLogger::spawn(path, "s2".to_string(), Duration::from_millis(5), Arc::new(AtomicUsize::new(0)));
        thread::sleep(Duration::from_millis(200));
        let err = logger.stop().expect("open failure is reported");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
