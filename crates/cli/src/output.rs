//! Colored terminal output.
//!
//! Colors are only emitted when the stream is a terminal and `NO_COLOR` is
//! unset, so piped output stays plain text.

use std::io::IsTerminal;

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn color_enabled(stream: Stream) -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    match stream {
        Stream::Stdout => std::io::stdout().is_terminal(),
        Stream::Stderr => std::io::stderr().is_terminal(),
    }
}

fn paint(stream: Stream, color: &str, text: &str) -> String {
    if color_enabled(stream) {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn info(msg: &str) {
    println!("{}", paint(Stream::Stdout, BLUE, msg));
}

pub fn success(msg: &str) {
    println!("{}", paint(Stream::Stdout, GREEN, msg));
}

pub fn warn(msg: &str) {
    println!("{}", paint(Stream::Stdout, YELLOW, msg));
}

/// A failed line item (e.g. an invalid skill); not a command failure.
pub fn failure(msg: &str) {
    println!("{}", paint(Stream::Stdout, RED, msg));
}

pub fn bold(text: &str) -> String {
    paint(Stream::Stdout, BOLD, text)
}

/// Command failure, printed to stderr.
pub fn error(msg: &str) {
    eprintln!("{}", paint(Stream::Stderr, RED, msg));
}
