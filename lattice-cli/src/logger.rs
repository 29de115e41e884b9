//! Operator-facing log rendering.
//!
//! Events the operator reads go to stdout in the `[LEVEL]:-message` form;
//! the CLI's own diagnostics travel through `tracing` instead.

use std::sync::atomic::{AtomicBool, Ordering};

use lattice_core::idl::LogLevel;

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

pub fn debug(message: &str) {
    if VERBOSE.load(Ordering::SeqCst) {
        println!("[DEBUG]:-{}", message);
    }
}

pub fn info(message: &str) {
    println!("[INFO]:-{}", message);
}

pub fn warn(message: &str) {
    println!("[WARNING]:-{}", message);
}

pub fn error(message: &str) {
    eprintln!("[ERROR]:-{}", message);
}

pub fn fatal(message: &str) {
    eprintln!("[FATAL]:-{}", message);
}

/// Render a streamed hub log message at its level.
pub fn log_level(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => debug(message),
        LogLevel::Info => info(message),
        LogLevel::Warning => warn(message),
        LogLevel::Error => error(message),
        LogLevel::Fatal => fatal(message),
    }
}
