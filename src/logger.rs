//! Logging utilities with colored output and per-route status display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro gated on the `--verbose` flag
//! - `RouteStatus` for the one-line-per-route render progress display
//!
//! # Example
//!
//! ```ignore
//! log!("render"; "{} routes planned", count);
//!
//! route_begin("/documentation/v2/alerts");
//! route_success("/documentation/v2/alerts");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
#[allow(dead_code)] // Used by debug! macro
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

    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "deploy" => prefix.bright_blue().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Route Status (one line per route, resolved in place)
// ============================================================================

/// Per-route render status display.
///
/// A route line is first printed dimmed while its render is in flight,
/// then overwritten with a resolved ✓/✗ line. Resolved lines stay in the
/// terminal, so a finished run reads as a plain list of outcomes.
///
/// # Example
///
/// ```ignore
/// let mut status = RouteStatus::new();
/// status.begin("/news/1.0.0");
/// status.success("/news/1.0.0");
/// ```
pub struct RouteStatus {
    /// Lines of unresolved output to clear before the next write
    pending_lines: usize,
}

/// Global route status display shared by the render loop.
static ROUTE_STATUS: LazyLock<Mutex<RouteStatus>> =
    LazyLock::new(|| Mutex::new(RouteStatus::new()));

impl RouteStatus {
    /// Create a new route status display.
    pub const fn new() -> Self {
        Self { pending_lines: 0 }
    }

    /// Display a route as in flight (dimmed, no symbol).
    pub fn begin(&mut self, route: &str) {
        self.display(String::new(), &format!("{}", route.dimmed()), true);
    }

    /// Resolve the in-flight route as rendered (✓ prefix, green).
    pub fn success(&mut self, route: &str) {
        self.display(format!("{}", "✓".green()), route, false);
    }

    /// Resolve the in-flight route as failed (✗ prefix, red).
    pub fn fail(&mut self, route: &str) {
        self.display(format!("{}", "✗".red()), route, false);
    }

    /// Internal display logic with line overwriting.
    ///
    /// Pending lines are tracked and cleared by the next write; resolved
    /// lines reset the tracking so they are never overwritten.
    fn display(&mut self, symbol: String, message: &str, pending: bool) {
        let mut stdout = stdout().lock();

        if self.pending_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.pending_lines as u16;
            execute!(stdout, cursor::MoveUp(lines)).ok();
            execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
        }

        let line = if symbol.is_empty() {
            format!("  {message}")
        } else {
            format!("{symbol} {message}")
        };

        writeln!(stdout, "{line}").ok();
        stdout.flush().ok();

        self.pending_lines = if pending {
            message.matches('\n').count() + 1
        } else {
            0
        };
    }
}

/// Global route status: route render started
pub fn route_begin(route: &str) {
    ROUTE_STATUS.lock().begin(route);
}

/// Global route status: route rendered
pub fn route_success(route: &str) {
    ROUTE_STATUS.lock().success(route);
}

/// Global route status: route failed
pub fn route_fail(route: &str) {
    ROUTE_STATUS.lock().fail(route);
}
