//! Keyboard controls while playing.
//! Esc, `q` or Ctrl-C stop playback. The terminal is put in raw mode to read single key
//! presses, which also means Ctrl-C arrives as a key event instead of killing the process.
//! Without a terminal, Ctrl-C (SIGINT) is routed to the same stop signal by [`InterruptGuard`].

use std::{
    io, panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Once,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{Context, Result};
use crossbeam::channel::Sender;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
    tty::IsTty,
};
use parking_lot::{const_mutex, Mutex};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

static RAW_MODE: AtomicBool = AtomicBool::new(false);
static INTERRUPT: Mutex<Option<Sender<()>>> = const_mutex(None);
static INTERRUPT_HANDLER: Once = Once::new();

/// Sends on a stop channel when the process gets a SIGINT, for as long as it is alive.
pub struct InterruptGuard {
    _private: (),
}

impl InterruptGuard {
    pub fn install(stop: Sender<()>) -> Result<Self> {
        // ctrlc only allows one handler per process, it looks up the current sender on each signal
        let mut installed = Ok(());
        INTERRUPT_HANDLER.call_once(|| installed = ctrlc::set_handler(interrupt));
        installed.context("Failed to set Ctrl-C handler")?;

        *INTERRUPT.lock() = Some(stop);
        Ok(Self { _private: () })
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        *INTERRUPT.lock() = None;
    }
}

fn interrupt() {
    if let Some(stop) = INTERRUPT.lock().as_ref() {
        log::debug!("Interrupted");
        let _ = stop.try_send(());
    }
}

/// Watches for stop keys on a background thread.
/// Dropping it stops the thread and restores the terminal.
pub struct KeyWatcher {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyWatcher {
    /// Returns `None` when stdin isn't a terminal, there are no keys to watch then.
    pub fn spawn(stop: Sender<()>) -> Result<Option<Self>> {
        if !io::stdin().is_tty() {
            log::debug!("Stdin is not a terminal, keyboard controls disabled");
            return Ok(None);
        }

        enable_raw_mode()?;
        let running = Arc::new(AtomicBool::new(true));

        let thread_running = running.clone();
        let handle = thread::Builder::new()
            .name("key-watcher".to_owned())
            .spawn(move || watch(&thread_running, &stop));

        let handle = match handle {
            Ok(i) => i,
            Err(e) => {
                restore_terminal();
                return Err(e).context("Failed to spawn key watcher");
            }
        };

        Ok(Some(Self {
            running,
            handle: Some(handle),
        }))
    }
}

impl Drop for KeyWatcher {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        restore_terminal();
    }
}

fn watch(running: &AtomicBool, stop: &Sender<()>) {
    while running.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                log::warn!("Failed to poll terminal events: {e}");
                return;
            }
        }

        match event::read() {
            Ok(Event::Key(key)) if is_stop_key(&key) => {
                log::debug!("Stop key pressed");
                let _ = stop.try_send(());
                return;
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed to read terminal event: {e}");
                return;
            }
        }
    }
}

fn is_stop_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Whether the terminal is currently in raw mode, newlines need a carriage return then.
pub fn raw_mode() -> bool {
    RAW_MODE.load(Ordering::Relaxed)
}

fn enable_raw_mode() -> Result<()> {
    // The terminal is unusable if the program panics in raw mode, so put it back first
    let prev = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        prev(info);
    }));

    terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    RAW_MODE.store(true, Ordering::Relaxed);
    Ok(())
}

/// Disables raw mode if it is on.
pub fn restore_terminal() {
    if RAW_MODE.swap(false, Ordering::Relaxed) {
        let _ = terminal::disable_raw_mode();
    }
}
