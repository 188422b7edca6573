//! Terminal output: colored status notes, plain when color is unavailable.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

fn note(color: &str, symbol: &str, plain: &str, msg: &str) -> String {
    if supports_color() {
        format!("{color}{BOLD}{symbol}{RESET} {msg}")
    } else {
        format!("{plain}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", note(CYAN, "ℹ", "INFO", msg));
}

pub fn note_warn(msg: &str) {
    println!("{}", note(YELLOW, "⚠", "WARN", msg));
}

pub fn note_error(msg: &str) {
    println!("{}", note(RED, "✗", "ERROR", msg));
}

pub fn note_success(msg: &str) {
    println!("{}", note(GREEN, "✓", "OK", msg));
}
