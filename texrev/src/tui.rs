//! Terminal lifecycle management for texrev.
//!
//! The UI renders to stderr so that stdout stays free for `--print` output and
//! shell pipelines.

use std::io::{self, BufWriter, Stderr};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

/// Crossterm backend over a buffered stderr writer.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Switches stderr to raw mode on the alternate screen with mouse capture.
/// Pair every call with [`restore_tui`].
pub fn init_tui() -> io::Result<Tui> {
    terminal::enable_raw_mode()?;
    let mut writer = BufWriter::new(io::stderr());
    execute!(writer, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(writer))
}

/// Undoes [`init_tui`]. ratatui does not do this on `Drop`, so every exit
/// path calls it, the panic hook included.
pub fn restore_tui() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)
}

/// Restores the terminal, then hands the panic to the previous hook so the
/// message lands on a usable screen. Install before [`init_tui`].
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_tui();
        previous(info);
    }));
}

/// Flag set once SIGTERM arrives; the event loop polls it on its heartbeat.
///
/// # Errors
///
/// Returns `Err` if the OS refuses to register the handler.
pub fn register_sigterm() -> io::Result<Arc<AtomicBool>> {
    let terminated = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&terminated))?;
    Ok(terminated)
}
