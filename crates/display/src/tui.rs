// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live TUI loop: fixed-cadence ticks, key input, resize, restore.

use crate::dashboard::Dashboard;
use crate::render::render;
use crate::term::TermCaps;
use crossterm::event::{Event, KeyCode, KeyModifiers};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wave_adapters::CancelToken;
use wave_core::{Clock, SystemClock};

/// ANSI sequence: move cursor to top-left (home position).
/// Used instead of \x1B[2J (clear screen) to avoid pushing old content
/// into terminal scrollback.
const CURSOR_HOME: &str = "\x1B[H";

/// ANSI sequence: clear from cursor position to end of screen.
const CLEAR_TO_END: &str = "\x1B[J";

/// ANSI sequence: clear from cursor position to end of line.
const CLEAR_TO_EOL: &str = "\x1B[K";

/// Render cadence: ~30 Hz.
const DEFAULT_TICK: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, Copy)]
pub struct TuiOptions {
    pub tick: Duration,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self { tick: DEFAULT_TICK }
    }
}

/// Wrap one frame for in-place redraw: cursor-home before, clear-to-end
/// after, and clear-to-EOL per line so shorter lines leave no remnants
/// of a previous wider frame. Raw mode needs explicit carriage returns.
fn frame_in_place(content: &str) -> String {
    let cleared = content.replace('\n', &format!("{CLEAR_TO_EOL}\r\n"));
    format!("{CURSOR_HOME}{cleared}{CLEAR_TO_END}")
}

/// Raw-mode/cursor guard: restores the terminal on every exit path.
struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    fn enter(active: bool) -> std::io::Result<Self> {
        if active {
            crossterm::terminal::enable_raw_mode()?;
            crossterm::execute!(std::io::stdout(), crossterm::cursor::Hide)?;
        }
        Ok(Self { active })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = crossterm::terminal::disable_raw_mode();
            let _ = crossterm::execute!(std::io::stdout(), crossterm::cursor::Show);
            let mut stdout = std::io::stdout();
            let _ = writeln!(stdout);
            let _ = stdout.flush();
        }
    }
}

/// The live dashboard loop.
///
/// Driven by a fixed-cadence tick; every tick takes a fresh snapshot
/// and renders it in place. `q`/Ctrl-C trigger `cancel`; the loop ends
/// when `done` fires. SIGWINCH refreshes the capability record's size.
pub struct Tui {
    options: TuiOptions,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    pub fn new() -> Self {
        Self {
            options: TuiOptions::default(),
        }
    }

    pub fn with_options(options: TuiOptions) -> Self {
        Self { options }
    }

    /// Run against real stdout with raw-mode key handling.
    pub async fn run<C: Clock>(
        &self,
        dashboard: Arc<Dashboard<C>>,
        caps: TermCaps,
        cancel: CancelToken,
        done: CancelToken,
    ) -> std::io::Result<()> {
        let guard = TerminalGuard::enter(caps.is_tty)?;
        let (keys, _stop_keys) = if caps.is_tty {
            let (rx, stop) = spawn_key_reader();
            (Some(rx), Some(stop))
        } else {
            (None, None)
        };
        let result = self
            .drive(dashboard, caps, cancel, done, keys, &mut std::io::stdout())
            .await;
        drop(guard);
        result
    }

    /// Loop body with an injected writer (tests drive this directly).
    pub(crate) async fn drive<C: Clock, W: Write + Send>(
        &self,
        dashboard: Arc<Dashboard<C>>,
        mut caps: TermCaps,
        cancel: CancelToken,
        done: CancelToken,
        mut keys: Option<mpsc::Receiver<KeyPress>>,
        out: &mut W,
    ) -> std::io::Result<()> {
        let mut interval = tokio::time::interval(self.options.tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        #[cfg(unix)]
        let mut winch =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::window_change())?;

        loop {
            let key = async {
                match keys.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            };
            #[cfg(unix)]
            let resize = winch.recv();
            #[cfg(not(unix))]
            let resize = std::future::pending::<Option<()>>();

            tokio::select! {
                _ = interval.tick() => {
                    let frame = render(&dashboard.snapshot(), &caps, SystemClock.epoch_ms());
                    write!(out, "{}", frame_in_place(&frame))?;
                    out.flush()?;
                }
                pressed = key => {
                    if matches!(pressed, Some(KeyPress::Quit)) {
                        tracing::debug!("quit key pressed, cancelling run");
                        cancel.cancel();
                    }
                }
                _ = resize => {
                    let (width, height) = crossterm::terminal::size().unwrap_or((caps.width, caps.height));
                    caps = caps.resized(width, height);
                }
                _ = done.cancelled() => break,
            }
        }

        // Final frame so the terminal shows the settled state
        let frame = render(&dashboard.snapshot(), &caps, SystemClock.epoch_ms());
        write!(out, "{}", frame_in_place(&frame))?;
        out.flush()?;
        Ok(())
    }
}

/// Key events the loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyPress {
    Quit,
}

/// Stops the key-reader thread when the loop ends.
struct KeyReaderStop {
    stop: Arc<AtomicBool>,
}

impl Drop for KeyReaderStop {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Blocking crossterm reads happen on their own thread; the loop only
/// sees a channel.
fn spawn_key_reader() -> (mpsc::Receiver<KeyPress>, KeyReaderStop) {
    let (tx, rx) = mpsc::channel(8);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    std::thread::spawn(move || {
        while !stop_flag.load(Ordering::Relaxed) {
            match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(Event::Key(key)) = crossterm::event::read() {
                        let quit = key.code == KeyCode::Char('q')
                            || (key.code == KeyCode::Char('c')
                                && key.modifiers.contains(KeyModifiers::CONTROL));
                        if quit && tx.blocking_send(KeyPress::Quit).is_err() {
                            break;
                        }
                    }
                }
                Ok(false) => {}
                Err(_) => break,
            }
        }
    });
    (rx, KeyReaderStop { stop })
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;
