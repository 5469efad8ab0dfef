use crossbeam_channel::Sender;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::thread;

/// Marker the child writes to force a pipe flush; it carries no content.
pub const FLUSH_SENTINEL: &[u8] = b"FLUSH";
const FLUSH_SENTINEL_LINE: &[u8] = b"FLUSH\n";

pub(super) fn should_retry_read_error(err: &io::Error) -> bool {
    err.kind() == ErrorKind::Interrupted
}

/// Remove every flush sentinel from a raw line. Returns `None` when nothing is left.
pub fn strip_sentinel(line: &[u8]) -> Option<Vec<u8>> {
    let without_lines = remove_all(line, FLUSH_SENTINEL_LINE);
    let cleaned = remove_all(&without_lines, FLUSH_SENTINEL);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn remove_all(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while !rest.is_empty() {
        if rest.starts_with(needle) {
            rest = &rest[needle.len()..];
        } else {
            out.push(rest[0]);
            rest = &rest[1..];
        }
    }
    out
}

/// Read `stream` line by line and forward sentinel-free lines to `tx`.
///
/// Ends at end-of-stream, on a hard read error, or once the receiver is gone.
/// The stream is dropped (closed) when the thread exits.
pub fn spawn_line_reader<R>(name: &'static str, stream: R, tx: Sender<Vec<u8>>) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut line = Vec::with_capacity(256);
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => {
                    tracing::debug!(stream = name, "child stream closed");
                    break;
                }
                Ok(_) => {
                    let Some(cleaned) = strip_sentinel(&line) else {
                        continue;
                    };
                    if tx.send(cleaned).is_err() {
                        break;
                    }
                }
                Err(err) if should_retry_read_error(&err) => continue,
                Err(err) => {
                    tracing::warn!(stream = name, "child stream read error: {err}");
                    break;
                }
            }
        }
    })
}
