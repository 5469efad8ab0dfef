//! Line protocol spoken by the emulator on its stdout and stderr.
//!
//! Stdout is free text except for two announcement prefixes. Stderr lines may
//! carry a severity prefix.

use std::borrow::Cow;

pub const GUI_XID_MARKER: &str = "Zynthian GUI XID:";
pub const PARENT_XID_MARKER: &str = "Parent XID:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementKind {
    /// Top-level window of the emulator GUI; this is what gets captured.
    GuiWindow,
    ParentWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildLine {
    Announcement(AnnouncementKind, String),
    Log(Severity, String),
}

/// Classify one stdout line.
pub fn parse_stdout_line(line: &str) -> ChildLine {
    if let Some(rest) = line.strip_prefix(GUI_XID_MARKER) {
        return ChildLine::Announcement(AnnouncementKind::GuiWindow, rest.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix(PARENT_XID_MARKER) {
        return ChildLine::Announcement(AnnouncementKind::ParentWindow, rest.trim().to_string());
    }
    ChildLine::Log(Severity::Info, line.to_string())
}

/// Classify one stderr line by its severity prefix. Unprefixed lines are errors.
pub fn parse_stderr_line(line: &str) -> ChildLine {
    const PREFIXES: [(&str, Severity); 3] = [
        ("INFO:", Severity::Info),
        ("ERROR:", Severity::Error),
        ("DEBUG:", Severity::Debug),
    ];
    for (prefix, severity) in PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            let message = rest.strip_prefix(' ').unwrap_or(rest);
            return ChildLine::Log(severity, message.to_string());
        }
    }
    ChildLine::Log(Severity::Error, line.to_string())
}

/// Result of decoding one drained batch of pipe output.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DecodedBatch {
    pub lines: Vec<String>,
    /// Set when the batch held invalid UTF-8 and was decoded lossily.
    pub lossy: bool,
}

/// Join queued chunks, decode, and split into non-empty lines.
pub fn decode_chunks<I>(chunks: I) -> DecodedBatch
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut buffer = Vec::new();
    for chunk in chunks {
        buffer.extend_from_slice(&chunk);
    }
    if buffer.is_empty() {
        return DecodedBatch::default();
    }
    let text = String::from_utf8_lossy(&buffer);
    let lossy = matches!(text, Cow::Owned(_));
    let lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    DecodedBatch { lines, lossy }
}

/// Drop terminal escape sequences before a child line reaches the log.
pub fn sanitize_for_log(line: &str) -> String {
    strip_ansi_escapes::strip_str(line)
}
