//! Console watcher
//!
//! Reads lines from stdin on its own thread and raises the shutdown signal
//! on `q`, `quit`, `exit` or end of input.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use log::{debug, info};

use ksplink_core::CancelSignal;

/// Start watching stdin
pub fn spawn_console_watcher(signal: &'static CancelSignal) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || watch(io::stdin().lock(), signal))
}

/// Block on `input` until a quit command or end of input, then signal
pub fn watch<R: BufRead>(input: R, signal: &CancelSignal) {
    for line in input.lines() {
        match line {
            Ok(line) if is_quit(&line) => break,
            Ok(line) => debug!("Ignoring console input {:?}", line.trim()),
            Err(e) => {
                debug!("Console read failed: {}", e);
                break;
            }
        }
    }

    info!("Shutdown requested");
    signal.signal(());
}

fn is_quit(line: &str) -> bool {
    matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "q" | "quit" | "exit"
    )
}
