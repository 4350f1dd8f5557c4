//! Coloured, cart-prefixed terminal messages.

use colored::{ColoredString, Colorize};

const PREFIX: &str = "🛒   ";

/// Single-line messages get the cart prefix; multi-line ones are printed as is.
fn decorate(message: &str) -> String {
    if message.lines().count() > 1 {
        message.to_string()
    } else {
        format!("{PREFIX}{message}")
    }
}

fn styled(message: &str, style: fn(&str) -> ColoredString) -> ColoredString {
    style(&decorate(message))
}

pub fn succeed(message: &str) {
    println!("{}", styled(message, |s| s.green().bold()));
}

pub fn info(message: &str) {
    println!("{}", styled(message, |s| s.blue()));
}

pub fn warn(message: &str) {
    eprintln!("{}", styled(message, |s| s.yellow()));
}

pub fn error(message: &str) {
    eprintln!("{}", styled(message, |s| s.red().bold()));
}
