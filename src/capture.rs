//! Output interception.
//!
//! [`StandardStreams`] temporarily points the process-wide stdout and stderr
//! file descriptors at a single pipe and drains it into memory, so everything
//! a candidate prints during a run is captured with write interleaving
//! preserved. Redirection is process-global: only one switch may be active at
//! a time in a process, so concurrent gradings must be serialized by the
//! caller.
//!
//! The [`StreamInterceptor`] trait is the seam that lets tests inject
//! [`MemoryStreams`] instead of touching real descriptors.

use crate::types::{Result, VerifyError};
use log::debug;
use nix::unistd::{dup, dup2, pipe};
use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::thread::{self, JoinHandle};

const STDOUT_FD: RawFd = 1;
const STDERR_FD: RawFd = 2;

/// Acquire/release handle over the redirected-stream resource.
///
/// Contract: `switch` is idempotent while active; `restore` before a
/// successful `switch` is a state fault; `close` releases any retained
/// buffer and may be called any number of times.
pub trait StreamInterceptor {
    fn switch(&mut self) -> Result<()>;
    fn restore(&mut self) -> Result<String>;
    fn close(&mut self);
}

/// Live fd-level redirection state between `switch` and `restore`.
struct Redirection {
    saved_stdout: OwnedFd,
    saved_stderr: OwnedFd,
    write_end: OwnedFd,
    drain: JoinHandle<Vec<u8>>,
}

/// Real interceptor over the process stdout/stderr descriptors.
#[derive(Default)]
pub struct StandardStreams {
    active: Option<Redirection>,
    captured: Option<String>,
}

impl StandardStreams {
    pub fn new() -> Self {
        StandardStreams::default()
    }
}

impl StreamInterceptor for StandardStreams {
    fn switch(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Ok(());
        }
        // A buffer from a previous cycle is released before re-switching
        self.captured = None;

        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        let saved_stdout = unsafe { OwnedFd::from_raw_fd(dup(STDOUT_FD)?) };
        let saved_stderr = unsafe { OwnedFd::from_raw_fd(dup(STDERR_FD)?) };
        let (read_end, write_end) = pipe()?;
        dup2(write_end.as_raw_fd(), STDOUT_FD)?;
        dup2(write_end.as_raw_fd(), STDERR_FD)?;

        let drain = thread::spawn(move || drain_stream(read_end));

        self.active = Some(Redirection {
            saved_stdout,
            saved_stderr,
            write_end,
            drain,
        });
        debug!("standard streams switched to capture pipe");
        Ok(())
    }

    fn restore(&mut self) -> Result<String> {
        let redirection = self.active.take().ok_or(VerifyError::NotSwitched)?;

        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        dup2(redirection.saved_stdout.as_raw_fd(), STDOUT_FD)?;
        dup2(redirection.saved_stderr.as_raw_fd(), STDERR_FD)?;

        // Last writer closes; the drain thread sees EOF and finishes
        drop(redirection.write_end);
        let bytes = redirection
            .drain
            .join()
            .map_err(|_| VerifyError::Stream("capture thread panicked".to_string()))?;

        let text = String::from_utf8_lossy(&bytes).into_owned();
        debug!("standard streams restored, {} bytes captured", text.len());
        self.captured = Some(text.clone());
        Ok(text)
    }

    fn close(&mut self) {
        self.captured = None;
    }
}

impl Drop for StandardStreams {
    fn drop(&mut self) {
        // Streams must never stay redirected past the interceptor's lifetime
        if let Some(redirection) = self.active.take() {
            let _ = dup2(redirection.saved_stdout.as_raw_fd(), STDOUT_FD);
            let _ = dup2(redirection.saved_stderr.as_raw_fd(), STDERR_FD);
            drop(redirection.write_end);
            let _ = redirection.drain.join();
        }
    }
}

/// Accumulate the read half of the capture pipe until EOF.
fn drain_stream(read_end: OwnedFd) -> Vec<u8> {
    let mut reader = File::from(read_end);
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }
    buffer
}

/// In-memory interceptor for tests: same contract, no descriptor games.
#[derive(Debug, Default)]
pub struct MemoryStreams {
    active: bool,
    buffer: Option<String>,
}

impl MemoryStreams {
    pub fn new() -> Self {
        MemoryStreams::default()
    }

    /// Append text to the active buffer, as if it had been printed.
    pub fn write(&mut self, text: &str) {
        if self.active {
            if let Some(buffer) = self.buffer.as_mut() {
                buffer.push_str(text);
            }
        }
    }
}

impl StreamInterceptor for MemoryStreams {
    fn switch(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        self.buffer = Some(String::new());
        self.active = true;
        Ok(())
    }

    fn restore(&mut self) -> Result<String> {
        if !self.active {
            return Err(VerifyError::NotSwitched);
        }
        self.active = false;
        Ok(self.buffer.clone().unwrap_or_default())
    }

    fn close(&mut self) {
        self.buffer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Redirection is process-global; capture tests must not overlap.
    static CAPTURE_LOCK: Mutex<()> = Mutex::new(());

    fn raw_print(text: &str) {
        // Bypasses the test harness's output capture, hits fd 1 directly
        let mut stdout = std::io::stdout();
        stdout.write_all(text.as_bytes()).unwrap();
        stdout.flush().unwrap();
    }

    #[test]
    fn test_switch_and_restore_capture_stdout_and_stderr() {
        let _guard = CAPTURE_LOCK.lock().unwrap();
        let mut streams = StandardStreams::new();
        streams.switch().unwrap();
        raw_print("out");
        {
            let mut stderr = std::io::stderr();
            stderr.write_all(b"err").unwrap();
            stderr.flush().unwrap();
        }
        let captured = streams.restore().unwrap();
        streams.close();
        assert_eq!(captured, "outerr");
    }

    #[test]
    fn test_switch_is_idempotent() {
        let _guard = CAPTURE_LOCK.lock().unwrap();
        let mut streams = StandardStreams::new();
        streams.switch().unwrap();
        streams.switch().unwrap();
        raw_print("once");
        let captured = streams.restore().unwrap();
        streams.close();
        assert_eq!(captured, "once");
    }

    #[test]
    fn test_restore_before_switch_is_state_fault() {
        let mut streams = StandardStreams::new();
        match streams.restore() {
            Err(VerifyError::NotSwitched) => {}
            other => panic!("expected NotSwitched, got {other:?}"),
        }
    }

    #[test]
    fn test_cycles_have_independent_buffers() {
        let _guard = CAPTURE_LOCK.lock().unwrap();
        let mut streams = StandardStreams::new();

        streams.switch().unwrap();
        raw_print("first");
        assert_eq!(streams.restore().unwrap(), "first");

        streams.switch().unwrap();
        raw_print("second");
        assert_eq!(streams.restore().unwrap(), "second");
        streams.close();
    }

    #[test]
    fn test_close_is_repeatable() {
        let mut streams = StandardStreams::new();
        streams.close();
        streams.close();
    }

    #[test]
    fn test_writes_after_restore_reach_the_real_stream() {
        let _guard = CAPTURE_LOCK.lock().unwrap();
        let mut streams = StandardStreams::new();
        streams.switch().unwrap();
        raw_print("inside");
        let captured = streams.restore().unwrap();
        streams.close();
        assert_eq!(captured, "inside");

        // A second interceptor proves fd 1 is live again: what we write now
        // lands in the new buffer, not the old one.
        let mut check = StandardStreams::new();
        check.switch().unwrap();
        raw_print("after");
        assert_eq!(check.restore().unwrap(), "after");
    }

    #[test]
    fn test_memory_streams_contract() {
        let mut fake = MemoryStreams::new();
        assert!(matches!(fake.restore(), Err(VerifyError::NotSwitched)));

        fake.switch().unwrap();
        fake.write("hello");
        fake.switch().unwrap(); // no-op, buffer kept
        fake.write(" world");
        assert_eq!(fake.restore().unwrap(), "hello world");
        fake.close();
    }
}
