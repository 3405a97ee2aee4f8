// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// A thread polls stdin and forwards whatever bytes arrive over an mpsc
// channel, so the tick loop can wait on `recv_timeout` for "a key or the
// tick delay, whichever comes first".
//
// The thread wakes every 50 ms to check its stop flag, which keeps
// shutdown and teardown on resize prompt. It exits on EOF, on a read error,
// or when the receiver is gone; the channel then disconnects, which the
// surface treats as "no keyboard".

#[cfg(unix)]
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Keys are a few bytes each; a held key or a paste fits easily.
const READ_BUF_SIZE: usize = 1024;

/// How long one `poll()` waits before the stop flag is checked again.
const POLL_TIMEOUT_MS: i32 = 50;

/// Background stdin reader thread. Stops when dropped.
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the reader thread.
    ///
    /// Each received `Vec<u8>` is a non-empty chunk of raw stdin bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn() -> std::io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || Self::reader_loop(&tx, &stop_flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Signal the thread to stop and join it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    #[cfg(unix)]
    fn reader_loop(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
        use std::os::unix::io::AsRawFd;

        let stdin_fd = io::stdin().as_raw_fd();
        let mut buf = [0u8; READ_BUF_SIZE];

        while !stop.load(Ordering::Relaxed) {
            let mut pfd = libc::pollfd {
                fd: stdin_fd,
                events: libc::POLLIN,
                revents: 0,
            };
            let ready = unsafe { libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS) };
            if ready < 0 {
                if io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                break;
            }
            if ready == 0 {
                continue;
            }

            let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n <= 0 {
                break;
            }

            #[allow(clippy::cast_sign_loss)]
            let chunk = buf[..n as usize].to_vec();
            if tx.send(chunk).is_err() {
                break;
            }
        }
    }

    #[cfg(not(unix))]
    fn reader_loop(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
        use std::io::Read;

        let stdin = std::io::stdin();
        let mut buf = [0u8; READ_BUF_SIZE];

        while !stop.load(Ordering::Relaxed) {
            match stdin.lock().read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
