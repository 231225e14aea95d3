//! Character-level token primitives.
//!
//! The scanner is a single byte cursor over the full source buffer. There is
//! no token stream: the parser asks for exact literals, identifier runs, and
//! typed numeric literals directly at the cursor. Line and column information
//! is derived only when an error is constructed.

use crate::error::{Error, Result};

/// Whitespace accepted between tokens. `#` starts a comment running to the
/// end of the line.
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_ident_continue(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

pub struct Scanner<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Scanner<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn source(&self) -> &'s str {
        self.src
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Rewinds or fast-forwards the cursor. Callers only pass positions
    /// previously obtained from [`pos`](Self::pos).
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Builds a syntax error anchored at the current cursor.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(message, self.src, self.pos)
    }

    fn error_at(&self, message: impl Into<String>, pos: usize) -> Error {
        Error::syntax(message, self.src, pos)
    }

    /// Skips whitespace and `#` line comments.
    pub fn advance_whitespace(&mut self) {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'#' => match self.src[self.pos..].find('\n') {
                    Some(i) => self.pos += i + 1,
                    None => self.pos = bytes.len(),
                },
                b if is_whitespace(b) => self.pos += 1,
                _ => break,
            }
        }
    }

    fn matches(&self, token: &str) -> bool {
        self.src.as_bytes()[self.pos..].starts_with(token.as_bytes())
    }

    /// Requires `token` at the cursor without consuming it.
    pub fn expect(&self, token: &str) -> Result<()> {
        if self.matches(token) {
            Ok(())
        } else {
            Err(self.error(format!("Expected '{token}'.")))
        }
    }

    /// Consumes `token` and trailing whitespace.
    pub fn advance(&mut self, token: &str) -> Result<()> {
        self.expect(token)?;
        self.pos += token.len();
        self.advance_whitespace();
        Ok(())
    }

    /// Consumes `token` without skipping trailing whitespace.
    pub fn advance_no_ws(&mut self, token: &str) -> Result<()> {
        self.expect(token)?;
        self.pos += token.len();
        Ok(())
    }

    /// Probes for `token`; consumes it and trailing whitespace when present.
    pub fn opt_advance(&mut self, token: &str) -> bool {
        if self.matches(token) {
            self.pos += token.len();
            self.advance_whitespace();
            true
        } else {
            false
        }
    }

    /// Probes for `token` without whitespace skipping.
    pub fn opt_advance_no_ws(&mut self, token: &str) -> bool {
        if self.matches(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Probes for `token` followed by at least one whitespace character or
    /// comment. Disambiguates keyword-like prefixes (`import` the keyword
    /// versus `importantThing` the identifier); rolls back when the boundary
    /// is absent.
    pub fn opt_advance_keyword(&mut self, token: &str) -> bool {
        if !self.matches(token) {
            return false;
        }
        let start = self.pos;
        self.pos += token.len();
        let before_ws = self.pos;
        self.advance_whitespace();
        if self.pos == before_ws {
            self.pos = start;
            return false;
        }
        true
    }

    /// Non-consuming literal lookahead.
    pub fn peek(&self, token: &str) -> bool {
        self.matches(token)
    }

    pub fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Consumes one character.
    pub fn advance_char(&mut self) -> Result<char> {
        match self.peek_char() {
            Some(c) => {
                self.pos += c.len_utf8();
                Ok(c)
            }
            None => Err(self.error("Unexpected end of input.")),
        }
    }

    /// Probes for an identifier (`[_a-zA-Z][_a-zA-Z0-9]*`); consumes it and
    /// trailing whitespace when present.
    pub fn opt_advance_ident(&mut self) -> Option<&'s str> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        match bytes.get(start) {
            Some(&b) if is_ident_start(b) => {}
            _ => return None,
        }
        let mut end = start + 1;
        while matches!(bytes.get(end), Some(&b) if is_ident_continue(b)) {
            end += 1;
        }
        self.pos = end;
        self.advance_whitespace();
        Some(&self.src[start..end])
    }

    pub fn advance_ident(&mut self) -> Result<&'s str> {
        match self.opt_advance_ident() {
            Some(name) => Ok(name),
            None => Err(self.error("Expected valid identifier.")),
        }
    }

    /// True when the cursor sits on the start of a numeric literal.
    pub fn peek_number_start(&self) -> bool {
        matches!(self.src.as_bytes().get(self.pos), Some(b) if b.is_ascii_digit() || *b == b'-')
    }

    /// Consumes a non-empty run of bytes matching `pred`, then whitespace.
    fn advance_run(
        &mut self,
        pred: impl Fn(u8) -> bool,
        expected: &'static str,
    ) -> Result<&'s str> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut end = start;
        while matches!(bytes.get(end), Some(&b) if pred(b)) {
            end += 1;
        }
        if end == start {
            return Err(self.error(expected));
        }
        self.pos = end;
        self.advance_whitespace();
        Ok(&self.src[start..end])
    }

    /// Consumes a possibly empty run of bytes matching `pred`, no whitespace.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'s str {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut end = start;
        while matches!(bytes.get(end), Some(&b) if pred(b)) {
            end += 1;
        }
        self.pos = end;
        &self.src[start..end]
    }

    // ----- string and blob literals -----

    /// Parses a `"`-delimited text literal with escape decoding.
    pub fn parse_text(&mut self) -> Result<String> {
        self.advance_no_ws("\"")?;
        let mut buffer = String::new();
        loop {
            match self.advance_char()? {
                '\n' => return Err(self.error("Text may not contain linefeeds")),
                '"' => {
                    self.advance_whitespace();
                    return Ok(buffer);
                }
                '\\' => buffer.push(self.unescape()?),
                c => buffer.push(c),
            }
        }
    }

    /// Decodes one escape sequence, cursor positioned after the backslash.
    fn unescape(&mut self) -> Result<char> {
        let c = self.advance_char()?;
        Ok(match c {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            'x' => {
                let hi = self.hex_escape_digit()?;
                let lo = self.hex_escape_digit()?;
                ((hi << 4) | lo) as u8 as char
            }
            '0'..='7' => {
                // One or two octal digits.
                let mut value = c as u32 - '0' as u32;
                if let Some(d @ '0'..='7') = self.peek_char() {
                    self.pos += 1;
                    value = (value << 3) | (d as u32 - '0' as u32);
                }
                value as u8 as char
            }
            other => other,
        })
    }

    fn hex_escape_digit(&mut self) -> Result<u32> {
        let pos = self.pos;
        self.advance_char()?
            .to_digit(16)
            .ok_or_else(|| self.error_at("Expected hex escape sequence.", pos))
    }

    /// Parses a `0x"…"` blob literal: hex-digit pairs, one byte each.
    pub fn parse_blob(&mut self) -> Result<Vec<u8>> {
        self.advance("0x\"")?;
        let mut blob = Vec::new();
        loop {
            let bytes = self.src.as_bytes();
            let pair = match (bytes.get(self.pos), bytes.get(self.pos + 1)) {
                (Some(&h), Some(&l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => {
                    (h as char, l as char)
                }
                _ => break,
            };
            let hi = pair.0.to_digit(16).unwrap_or(0);
            let lo = pair.1.to_digit(16).unwrap_or(0);
            blob.push(((hi << 4) | lo) as u8);
            self.pos += 2;
            self.advance_whitespace();
        }
        self.advance("\"")?;
        Ok(blob)
    }

    // ----- numeric literals -----

    /// Scans the textual shape of an integer literal: optional sign, then
    /// decimal digits, `0x` + hex digits (lowercase `x` only), or `0` + octal
    /// digits (a bare `0` is zero).
    fn scan_integer(&mut self) -> Result<(bool, &'s str, u32)> {
        let negative = self.opt_advance("-");
        if self.opt_advance_no_ws("0x") {
            let digits = self.advance_run(|b| b.is_ascii_hexdigit(), "Expected hex digits.")?;
            return Ok((negative, digits, 16));
        }
        if self.opt_advance_no_ws("0") {
            let digits = self.take_while(|b| (b'0'..=b'7').contains(&b));
            self.advance_whitespace();
            let digits = if digits.is_empty() { "0" } else { digits };
            return Ok((negative, digits, 8));
        }
        let digits = self.advance_run(|b| b.is_ascii_digit(), "Expected valid number.")?;
        Ok((negative, digits, 10))
    }

    /// Consumes the loose number shape used when capturing a literal raw for
    /// later typed re-parsing: digits, hex letters, `x`, `.`, `e`, `-`.
    pub fn advance_raw_number(&mut self) -> Result<&'s str> {
        self.advance_run(
            |b| b.is_ascii_hexdigit() || matches!(b, b'x' | b'.' | b'e' | b'-'),
            "Expected valid number.",
        )
    }

    fn parse_float_run(&mut self, expected: &'static str) -> Result<&'s str> {
        self.advance_run(
            |b| b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'-',
            expected,
        )
    }
}

macro_rules! signed_parsers {
    ($(($name:ident, $ty:ty)),* $(,)?) => {$(
        impl Scanner<'_> {
            pub fn $name(&mut self) -> Result<$ty> {
                let start = self.pos;
                let (negative, digits, radix) = self.scan_integer()?;
                let magnitude = u128::from_str_radix(digits, radix)
                    .map_err(|_| self.error_at("Expected valid number.", start))?;
                let value = if negative {
                    magnitude
                        .try_into()
                        .ok()
                        .map(|m: i128| -m)
                        .filter(|v| *v >= <$ty>::MIN as i128)
                } else {
                    i128::try_from(magnitude)
                        .ok()
                        .filter(|v| *v <= <$ty>::MAX as i128)
                };
                match value {
                    Some(v) => Ok(v as $ty),
                    None => Err(self.error_at(
                        concat!("Integer literal out of range for ", stringify!($ty), "."),
                        start,
                    )),
                }
            }
        }
    )*};
}

macro_rules! unsigned_parsers {
    ($(($name:ident, $ty:ty)),* $(,)?) => {$(
        impl Scanner<'_> {
            pub fn $name(&mut self) -> Result<$ty> {
                let start = self.pos;
                let (negative, digits, radix) = self.scan_integer()?;
                let magnitude = u128::from_str_radix(digits, radix)
                    .map_err(|_| self.error_at("Expected valid number.", start))?;
                if negative || magnitude > <$ty>::MAX as u128 {
                    return Err(self.error_at(
                        concat!("Integer literal out of range for ", stringify!($ty), "."),
                        start,
                    ));
                }
                Ok(magnitude as $ty)
            }
        }
    )*};
}

macro_rules! float_parsers {
    ($(($name:ident, $ty:ty, $expected:literal)),* $(,)?) => {$(
        impl Scanner<'_> {
            pub fn $name(&mut self) -> Result<$ty> {
                let negative = self.opt_advance("-");
                let value: $ty = if self.opt_advance("inf") {
                    <$ty>::INFINITY
                } else if self.opt_advance("nan") {
                    if negative {
                        return Err(self.error("cannot negate nan"));
                    }
                    <$ty>::NAN
                } else {
                    let start = self.pos;
                    let run = self.parse_float_run($expected)?;
                    run.parse()
                        .map_err(|_| self.error_at($expected, start))?
                };
                Ok(if negative { -value } else { value })
            }
        }
    )*};
}

signed_parsers!(
    (parse_i8, i8),
    (parse_i16, i16),
    (parse_i32, i32),
    (parse_i64, i64),
);
unsigned_parsers!(
    (parse_u8, u8),
    (parse_u16, u16),
    (parse_u32, u32),
    (parse_u64, u64),
);
float_parsers!(
    (parse_f32, f32, "Expected valid float32 literal."),
    (parse_f64, f64, "Expected valid float64 literal."),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_whitespace_and_comments() {
        let mut sc = Scanner::new("  # comment to end of line\n\t struct");
        sc.advance_whitespace();
        assert!(sc.peek("struct"));
    }

    #[test]
    fn keyword_probe_requires_boundary() {
        let mut sc = Scanner::new("imports");
        assert!(!sc.opt_advance_keyword("import"));
        assert_eq!(sc.pos(), 0);

        let mut sc = Scanner::new("import \"x\"");
        assert!(sc.opt_advance_keyword("import"));
        assert!(sc.peek("\""));
    }

    #[test]
    fn text_literal_escapes() {
        let mut sc = Scanner::new(r#""a\tb\x41\n\7\42""#);
        assert_eq!(sc.parse_text().unwrap(), "a\tbA\n\x07\x22");
    }

    #[test]
    fn text_literal_rejects_raw_newline() {
        let mut sc = Scanner::new("\"broken\nliteral\"");
        let err = sc.parse_text().unwrap_err();
        assert!(err.message.contains("may not contain linefeeds"));
    }

    #[test]
    fn blob_literal() {
        let mut sc = Scanner::new("0x\"ab 01 ff\"");
        assert_eq!(sc.parse_blob().unwrap(), vec![0xab, 0x01, 0xff]);
    }

    #[test]
    fn integer_radixes() {
        assert_eq!(Scanner::new("42").parse_i32().unwrap(), 42);
        assert_eq!(Scanner::new("-42").parse_i32().unwrap(), -42);
        assert_eq!(Scanner::new("0x2a").parse_i32().unwrap(), 42);
        assert_eq!(Scanner::new("-0x2a").parse_i32().unwrap(), -42);
        assert_eq!(Scanner::new("052").parse_i32().unwrap(), 42);
        // A bare zero is zero, not a malformed octal literal.
        assert_eq!(Scanner::new("0").parse_i32().unwrap(), 0);
    }

    #[test]
    fn integer_range_checks() {
        assert!(Scanner::new("128").parse_i8().is_err());
        assert_eq!(Scanner::new("-128").parse_i8().unwrap(), -128);
        assert!(Scanner::new("-129").parse_i8().is_err());
        assert!(Scanner::new("-1").parse_u16().is_err());
        assert_eq!(
            Scanner::new("0xffffffffffffffff").parse_u64().unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn uppercase_hex_prefix_not_supported() {
        // 0X is not a hex prefix; the literal is octal "0" followed by junk.
        let mut sc = Scanner::new("0X2a");
        assert_eq!(sc.parse_i32().unwrap(), 0);
        assert!(sc.peek("X2a"));
    }

    #[test]
    fn float_literals() {
        assert_eq!(Scanner::new("1.5").parse_f64().unwrap(), 1.5);
        assert_eq!(Scanner::new("-2.5e3").parse_f64().unwrap(), -2500.0);
        assert_eq!(Scanner::new("inf").parse_f32().unwrap(), f32::INFINITY);
        assert_eq!(Scanner::new("-inf").parse_f64().unwrap(), f64::NEG_INFINITY);
        assert!(Scanner::new("nan").parse_f64().unwrap().is_nan());
        assert!(Scanner::new("-nan").parse_f64().is_err());
        assert!(Scanner::new("..").parse_f64().is_err());
    }

    #[test]
    fn unexpected_end_of_input() {
        let mut sc = Scanner::new("");
        let err = sc.advance_char().unwrap_err();
        assert_eq!(err.message, "Unexpected end of input.");
    }
}
