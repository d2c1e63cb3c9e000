//! RFC 5545 text escaping and content-line folding.

/// Longest first physical line, in bytes, excluding the CRLF.
const FIRST_LINE_OCTETS: usize = 75;
/// Longest continuation payload; the leading space makes it 75 again.
const CONTINUATION_OCTETS: usize = 74;

const CRLF: &str = "\r\n";

/// Escape a TEXT value: backslash, comma and semicolon are backslashed,
/// newlines become the two-character `\n`, CR is dropped, tab becomes space.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            '\t' => escaped.push(' '),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Fold one content line and terminate it with CRLF.
///
/// Cuts happen at byte limits, moved back to the previous UTF-8 boundary
/// when a limit would split a character.
pub fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + (line.len() / CONTINUATION_OCTETS + 1) * 3);
    let mut rest = line;
    let mut limit = FIRST_LINE_OCTETS;

    while rest.len() > limit {
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        folded.push_str(&rest[..cut]);
        folded.push_str(CRLF);
        folded.push(' ');
        rest = &rest[cut..];
        limit = CONTINUATION_OCTETS;
    }

    folded.push_str(rest);
    folded.push_str(CRLF);
    folded
}

/// Accumulates folded, CRLF-terminated content lines.
#[derive(Debug, Default)]
pub struct ContentLines {
    buf: String,
}

impl ContentLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `NAME:value` with the value taken verbatim.
    pub fn raw(&mut self, name: &str, value: &str) {
        self.buf.push_str(&fold_line(&format!("{name}:{value}")));
    }

    /// Write `NAME:value` with the value escaped as TEXT.
    pub fn text(&mut self, name: &str, value: &str) {
        self.raw(name, &escape_text(value));
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
