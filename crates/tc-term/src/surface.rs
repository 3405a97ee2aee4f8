// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Surface — everything a tick loop needs from a terminal.
//
// A loop that draws, presents and waits for a key talks to the terminal only
// through the `Surface` trait:
//
//   size / frame_mut  the screen dimensions and the persistent cell grid
//   present           diff the grid against the terminal and write changes
//   poll(timeout)     wait at most `timeout` for a key or a resize
//   reinit            tear the screen down and bring it back at the new size
//   stop_requested    SIGINT / SIGTERM arrived
//
// `Screen` is the real terminal. Signals only flip atomics; `poll` waits on
// the stdin channel in 50 ms slices and checks the flags between slices, so
// a resize or a termination request cuts the wait short without the signal
// handler touching any other state.
//
// `Headless` is an in-memory surface for tests: fixed size, scripted poll
// results, counters for what the loop asked it to do.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{KeyEvent, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

/// Longest single wait before the signal flags are checked again.
const POLL_SLICE: Duration = Duration::from_millis(50);

// ─── Poll ───────────────────────────────────────────────────────────────────

/// What a bounded wait produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Key(KeyEvent),
    /// The terminal changed size.
    Resize,
    /// The timeout elapsed with no key.
    Timeout,
}

// ─── Surface ────────────────────────────────────────────────────────────────

/// A drawable, pollable terminal.
pub trait Surface {
    /// Current screen size.
    fn size(&self) -> Size;

    /// The cell grid windows paint into. It persists between presents.
    fn frame_mut(&mut self) -> &mut FrameBuffer;

    /// Show the current frame.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    fn present(&mut self) -> io::Result<()>;

    /// Wait at most `timeout` for a key or a resize.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails.
    fn poll(&mut self, timeout: Duration) -> io::Result<Poll>;

    /// Tear the screen down and set it up again at the current terminal
    /// size. The frame comes back empty and the next present repaints
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be restored or re-entered.
    fn reinit(&mut self) -> io::Result<Size>;

    /// Whether an external termination request is pending.
    fn stop_requested(&self) -> bool;
}

// ─── Signals ────────────────────────────────────────────────────────────────

static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);
static STOP_PENDING: AtomicBool = AtomicBool::new(false);

/// Route SIGWINCH, SIGINT and SIGTERM to the flags above. Storing to an
/// atomic is async-signal-safe.
#[cfg(unix)]
fn install_signal_handlers() {
    unsafe {
        install_handler(libc::SIGWINCH, on_resize_signal as *const () as usize);
        install_handler(libc::SIGINT, on_stop_signal as *const () as usize);
        install_handler(libc::SIGTERM, on_stop_signal as *const () as usize);
    }
}

#[cfg(unix)]
unsafe fn install_handler(signal: libc::c_int, handler: usize) {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(signal, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn on_resize_signal(_sig: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
extern "C" fn on_stop_signal(_sig: libc::c_int) {
    STOP_PENDING.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_signal_handlers() {}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// The real terminal.
///
/// ```no_run
/// use std::time::Duration;
/// use tc_term::surface::{Poll, Screen, Surface};
///
/// let mut screen = Screen::open()?;
/// screen.present()?;
/// if let Poll::Key(key) = screen.poll(Duration::from_secs(1))? {
///     println!("{key:?}");
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Screen {
    reader: Option<StdinReader>,
    input: Option<Receiver<Vec<u8>>>,
    parser: Parser,
    pending: VecDeque<KeyEvent>,
    renderer: DiffRenderer,
    frame: FrameBuffer,
    terminal: Terminal,
}

impl Screen {
    /// Enter full-screen mode, install the signal handlers and start
    /// reading stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched into full-screen
    /// mode or the reader thread cannot be spawned.
    pub fn open() -> io::Result<Self> {
        let mut terminal = Terminal::new();
        terminal.enter()?;
        install_signal_handlers();

        let (reader, input) = StdinReader::spawn()?;
        let size = terminal.size();

        Ok(Self {
            reader: Some(reader),
            input: Some(input),
            parser: Parser::new(),
            pending: VecDeque::new(),
            renderer: DiffRenderer::new(),
            frame: FrameBuffer::new(size.cols, size.rows),
            terminal,
        })
    }

    /// Wait up to `slice` for stdin bytes and queue any keys they complete.
    fn wait_for_keys(&mut self, slice: Duration) {
        let Some(received) = self.input.as_ref().map(|rx| rx.recv_timeout(slice)) else {
            // No keyboard: the clock keeps ticking on the timeout alone.
            thread::sleep(slice);
            return;
        };

        match received {
            Ok(bytes) => self.pending.extend(self.parser.advance(&bytes)),
            Err(RecvTimeoutError::Timeout) => {
                if self.parser.has_pending() {
                    self.pending.extend(self.parser.flush());
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.input = None;
                self.reader = None;
                self.pending.extend(self.parser.flush());
            }
        }
    }
}

impl Surface for Screen {
    fn size(&self) -> Size {
        self.terminal.size()
    }

    fn frame_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    fn present(&mut self) -> io::Result<()> {
        self.renderer.render(&self.frame);
        self.renderer.flush_to(&mut io::stdout().lock())
    }

    fn poll(&mut self, timeout: Duration) -> io::Result<Poll> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(key) = self.pending.pop_front() {
                return Ok(Poll::Key(key));
            }
            if RESIZE_PENDING.swap(false, Ordering::Relaxed) {
                return Ok(Poll::Resize);
            }
            if STOP_PENDING.load(Ordering::Relaxed) {
                return Ok(Poll::Timeout);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            self.wait_for_keys(remaining.min(POLL_SLICE));

            if remaining.is_zero() && self.pending.is_empty() {
                return Ok(Poll::Timeout);
            }
        }
    }

    fn reinit(&mut self) -> io::Result<Size> {
        self.terminal.leave()?;
        self.terminal.enter()?;

        let size = self.terminal.refresh_size();
        self.frame.resize(size.cols, size.rows);
        self.renderer.force_redraw();
        self.parser = Parser::new();
        self.pending.clear();
        Ok(size)
    }

    fn stop_requested(&self) -> bool {
        STOP_PENDING.load(Ordering::Relaxed)
    }
}

// ─── Headless ───────────────────────────────────────────────────────────────

/// An in-memory surface with a scripted input queue.
///
/// Each `poll` pops the next scripted result. Once the script is used up,
/// `poll` returns `Timeout` and `stop_requested` turns true, so a loop
/// driven by a finite script always ends.
///
/// ```
/// use std::time::Duration;
/// use tc_term::input::{KeyCode, KeyEvent};
/// use tc_term::surface::{Headless, Poll, Surface};
///
/// let mut surface = Headless::new(80, 24).with_keys("q");
/// assert_eq!(
///     surface.poll(Duration::from_secs(1)).unwrap(),
///     Poll::Key(KeyEvent::plain(KeyCode::Char('q')))
/// );
/// assert!(!surface.stop_requested());
/// assert_eq!(surface.poll(Duration::from_secs(1)).unwrap(), Poll::Timeout);
/// assert!(surface.stop_requested());
/// ```
pub struct Headless {
    size: Size,
    frame: FrameBuffer,
    script: VecDeque<Poll>,
    next_size: Option<Size>,
    exhausted: bool,
    presents: usize,
    reinits: usize,
    waited: Duration,
}

impl Headless {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            size: Size::new(cols, rows),
            frame: FrameBuffer::new(cols, rows),
            script: VecDeque::new(),
            next_size: None,
            exhausted: false,
            presents: 0,
            reinits: 0,
            waited: Duration::ZERO,
        }
    }

    /// Append poll results to the script.
    #[must_use]
    pub fn with_script(mut self, script: impl IntoIterator<Item = Poll>) -> Self {
        self.script.extend(script);
        self
    }

    /// Append one plain key press per character.
    #[must_use]
    pub fn with_keys(self, keys: &str) -> Self {
        self.with_script(
            keys.chars()
                .map(|ch| Poll::Key(KeyEvent::plain(crate::input::KeyCode::Char(ch)))),
        )
    }

    /// Queue a resize: the next `reinit` adopts `size`, and a `Resize`
    /// result is appended to the script.
    pub fn resize_to(&mut self, size: Size) {
        self.next_size = Some(size);
        self.script.push_back(Poll::Resize);
    }

    /// The frame as it stands.
    #[must_use]
    pub const fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    #[must_use]
    pub const fn presents(&self) -> usize {
        self.presents
    }

    #[must_use]
    pub const fn reinits(&self) -> usize {
        self.reinits
    }

    /// Sum of every timeout the loop asked `poll` to honor.
    #[must_use]
    pub const fn waited(&self) -> Duration {
        self.waited
    }
}

impl Surface for Headless {
    fn size(&self) -> Size {
        self.size
    }

    fn frame_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    fn present(&mut self) -> io::Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> io::Result<Poll> {
        self.waited += timeout;
        Ok(self.script.pop_front().unwrap_or_else(|| {
            self.exhausted = true;
            Poll::Timeout
        }))
    }

    fn reinit(&mut self) -> io::Result<Size> {
        self.reinits += 1;
        if let Some(size) = self.next_size.take() {
            self.size = size;
        }
        self.frame.resize(self.size.cols, self.size.rows);
        Ok(self.size)
    }

    fn stop_requested(&self) -> bool {
        self.exhausted
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
