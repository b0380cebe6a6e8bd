//! Incremental line reader for child output.

use std::io::{self, BufRead, BufReader, Read};

/// Calls `on_line` for every line of `reader` as it arrives.
///
/// Memory use is bounded by the longest single line. Invalid UTF-8 is replaced,
/// and the trailing `\n` / `\r\n` is stripped. A final line without a newline
/// is still delivered.
pub(super) fn stream_lines<R: Read>(reader: R, mut on_line: impl FnMut(String)) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        on_line(decode_line(&buf));
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
