//! Terminal logging with colored prefixes and batch progress display.
//!
//! This module provides:
//! - `log!` macro for formatted output with colored `[module]` prefixes
//! - `debug!` macro gated on the global verbose flag
//! - `ProgressLine` for the single-line `convert(3/10)` counter of batch runs
//!
//! Everything is written to stderr: stdout is reserved for SVG and JSON
//! output so `vecto convert img.png -o - | ...` stays pipeable.
//!
//! # Example
//!
//! ```ignore
//! log!("convert"; "{} -> {}", input.display(), output.display());
//! debug!("engine"; "args: {:?}", args);
//!
//! let progress = ProgressLine::new("convert", inputs.len());
//! progress.inc();
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{IsTerminal, Write, stderr},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Whether a progress line currently owns the last terminal row
static BAR_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut err = stderr().lock();

    // Clear the progress line; the next `inc` or `finish` draws it again
    let bar_active = BAR_ACTIVE.load(Ordering::SeqCst);
    if bar_active {
        execute!(err, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }

    writeln!(err, "{prefix} {message}").ok();
    err.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "convert" => prefix.bright_blue().bold().to_string(),
        "engine" => prefix.bright_magenta().bold().to_string(),
        "fallback" | "warning" => prefix.yellow().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_green().bold().to_string(),
    }
}

// ============================================================================
// Progress Line (single counter)
// ============================================================================

/// Single-line progress display for batch conversion
///
/// Displays: `[convert] 42/69`
///
/// Workers call [`ProgressLine::inc`] from rayon threads. Uses `try_lock`
/// so a busy display never blocks a worker; the skipped refresh is caught
/// up by the next increment or by `finish`.
pub struct ProgressLine {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
    lock: Mutex<()>,
    enabled: bool,
}

impl ProgressLine {
    /// Create a progress line. Drawing is disabled when stderr is not a terminal.
    pub fn new(name: &'static str, total: usize) -> Self {
        let enabled = total > 1 && stderr().is_terminal();
        if enabled {
            BAR_ACTIVE.store(true, Ordering::SeqCst);
        }

        let progress = Self {
            name,
            total,
            current: AtomicUsize::new(0),
            lock: Mutex::new(()),
            enabled,
        };
        progress.display();
        progress
    }

    /// Increment the counter and refresh the line if nobody else is drawing.
    #[inline]
    pub fn inc(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
        if self.lock.try_lock().is_some() {
            self.display();
        }
    }

    /// Number of completed items so far.
    pub fn current(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    fn line(&self) -> String {
        format!("{}/{}", self.current(), self.total)
    }

    fn display(&self) {
        if !self.enabled {
            return;
        }
        let prefix = colorize_prefix(self.name, &self.name.to_ascii_lowercase());
        let mut err = stderr().lock();
        execute!(err, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        write!(err, "{} {}", prefix, self.line()).ok();
        err.flush().ok();
    }

    /// Finish progress display, keep the final count and move to the next line.
    pub fn finish(self) {
        let _guard = self.lock.lock();
        if self.enabled {
            self.display();
            let mut err = stderr().lock();
            writeln!(err).ok();
            err.flush().ok();
            BAR_ACTIVE.store(false, Ordering::SeqCst);
        }
    }
}
