//! Operator console: unbuffered output and line input

use std::io::{self, BufRead, Read, Write};

/// Longest line `input` returns, in bytes
pub const INPUT_LIMIT: u64 = 255;

/// Write `text` to stdout as is and flush, so prompts without a trailing
/// newline show up immediately
pub fn print(text: &str) {
    let mut out = io::stdout().lock();
    // A closed stdout is not worth failing the script over
    let _ = write_text(&mut out, text);
}

pub fn write_text<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Block until the operator enters a line
pub fn input() -> String {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    read_line_from(&mut reader)
}

/// Read one line, at most [`INPUT_LIMIT`] bytes, keeping the trailing newline.
/// Longer lines are returned in pieces by successive calls.
pub fn read_line_from<R: BufRead>(reader: &mut R) -> String {
    let mut line = Vec::new();
    if reader.by_ref().take(INPUT_LIMIT).read_until(b'\n', &mut line).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&line).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_one_line_with_newline() {
        let mut reader = Cursor::new("first\nsecond\n");
        assert_eq!(read_line_from(&mut reader), "first\n");
        assert_eq!(read_line_from(&mut reader), "second\n");
        assert_eq!(read_line_from(&mut reader), "");
    }

    #[test]
    fn test_long_lines_are_split() {
        let long = "x".repeat(300) + "\n";
        let mut reader = Cursor::new(long);
        assert_eq!(read_line_from(&mut reader).len(), 255);
        assert_eq!(read_line_from(&mut reader), format!("{}\n", "x".repeat(45)));
    }

    #[test]
    fn test_write_text_is_verbatim() {
        let mut out = Vec::new();
        write_text(&mut out, "[Waiting] no newline").unwrap();
        assert_eq!(out, b"[Waiting] no newline");
    }
}
