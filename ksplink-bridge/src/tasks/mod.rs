//! Bridge tasks
//!
//! The link task owns the serial port and runs on the main thread; the
//! console task only raises the shutdown signal.

pub mod console;
pub mod link;

pub use console::spawn_console_watcher;
pub use link::run_link;
