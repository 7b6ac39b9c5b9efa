//! Non-fatal warning channel (stderr, colored on terminals).

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Print a recoverable warning to stderr without interrupting the caller.
pub(crate) fn warn(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{} {}", "[warning]".yellow().bold(), message);
    } else {
        eprintln!("[warning] {}", message);
    }
}
