// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible signals: connectivity badge, toast lines, drain progress.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use sq_core::Connectivity;

/// ANSI 256-color codes for the status surface.
pub mod codes {
    /// Online badge / success toasts: soft green
    pub const SUCCESS: u8 = 114;
    /// Pending counts / retry warnings: amber
    pub const WARNING: u8 = 179;
    /// Offline badge: red
    pub const DANGER: u8 = 167;
    /// Informational toasts and progress: pastel cyan/steel blue
    pub const INFO: u8 = 74;
    /// Section headers in help output
    pub const HEADER: u8 = 74;
    /// Commands/literals in help output: light grey
    pub const LITERAL: u8 = 250;
    /// Default values/context in help output: medium grey
    pub const CONTEXT: u8 = 245;
}

/// Generate clap Styles for help output matching the badge/toast palette.
pub fn styles() -> clap::builder::styling::Styles {
    use clap::builder::styling::Styles;

    if !should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let header = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER))));
    let literal = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL))));
    let placeholder = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT))));

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(literal)
        .placeholder(placeholder)
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    // NO_COLOR=1 disables colors
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }

    // COLOR=1 forces colors even without TTY
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }

    // Default: enable colors only if stdout is a TTY
    std::io::stdout().is_terminal()
}

/// Format a 256-color ANSI escape sequence for foreground color.
fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

/// ANSI reset sequence.
const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(code), text, RESET)
    } else {
        text.to_string()
    }
}

/// Kinds of transient toast notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toast {
    Success,
    Warning,
    Info,
}

impl Toast {
    fn code(&self) -> u8 {
        match self {
            Toast::Success => codes::SUCCESS,
            Toast::Warning => codes::WARNING,
            Toast::Info => codes::INFO,
        }
    }
}

/// Print a transient notification line.
pub fn toast(kind: Toast, message: &str) {
    println!("{}", paint(kind.code(), message));
}

/// Render the connectivity badge with the pending count, mirroring the
/// always-visible status element.
pub fn badge(connectivity: Connectivity, pending: usize) -> String {
    let state = match connectivity {
        Connectivity::Online => paint(codes::SUCCESS, "● online"),
        Connectivity::Offline => paint(codes::DANGER, "● offline"),
    };
    if pending == 0 {
        return state;
    }
    let count = match connectivity {
        Connectivity::Online => format!("{} pending sync", pending),
        Connectivity::Offline => format!("{} saved locally", pending),
    };
    format!("{}  {}", state, paint(codes::WARNING, &count))
}

/// Print the drain progress line.
pub fn progress(pending: usize) {
    println!("{}", paint(codes::INFO, &format!("syncing {} offline submission(s)...", pending)));
}

/// Colorize an examples help block.
///
/// Section headers (lines ending with `:`) get the header color; the command
/// part of example lines gets the literal color.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + 256);

    for line in text.lines() {
        if !result.is_empty() {
            result.push('\n');
        }

        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        if trimmed.ends_with(':') && !trimmed.contains("  ") {
            result.push_str(indent);
            result.push_str(&paint(codes::HEADER, trimmed));
            continue;
        }

        if let Some(split) = trimmed.find("  ") {
            result.push_str(indent);
            result.push_str(&paint(codes::LITERAL, &trimmed[..split]));
            result.push_str(&trimmed[split..]);
        } else {
            result.push_str(line);
        }
    }

    result
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
