//! Code-point scanner for selector text.
//!
//! Follows the ident, escape and string rules of
//! [CSS Syntax Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization),
//! but hands raw pieces to the selector parser instead of producing a full
//! CSS token stream: pseudo-class arguments such as `:text("a  b")` must reach
//! the compiler exactly as written.

use cssxpath_common::{Result, SyntaxError};

/// Character cursor over a selector string.
pub struct Scanner {
    /// The input being scanned
    input: Vec<char>,
    /// Current position in the input
    position: usize,
}

impl Scanner {
    /// Create a scanner positioned at the start of `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Offset (in characters) of the next code point.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns true once every code point has been consumed.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consume and return the next character.
    pub fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    /// Put back the last consumed character.
    pub const fn reconsume(&mut self) {
        if self.position > 0 {
            self.position -= 1;
        }
    }

    /// Peek at the next character without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Peek at a character at an offset from current position.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Consume whitespace characters, returning whether any were present.
    pub fn consume_whitespace(&mut self) -> bool {
        let start = self.position;
        while self.peek().is_some_and(is_whitespace) {
            self.position += 1;
        }
        self.position > start
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    #[must_use]
    pub fn would_start_ident_sequence(&self) -> bool {
        match self.peek() {
            // "If the second code point is an ident-start code point or a U+002D HYPHEN-MINUS,
            // or the second and third code points are a valid escape, return true."
            Some('-') => {
                let second = self.peek_at(1);
                second.is_some_and(is_ident_start_code_point)
                    || second == Some('-')
                    || is_valid_escape(second, self.peek_at(2))
            }
            Some(c) if is_ident_start_code_point(c) => true,
            Some('\\') => is_valid_escape(Some('\\'), self.peek_at(1)),
            _ => false,
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Returns an empty string when the next code point is not an ident code point.
    pub fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();

        loop {
            match self.consume() {
                Some(c) if is_ident_code_point(c) => result.push(c),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    result.push(self.consume_escaped_code_point());
                }
                Some(_) => {
                    self.reconsume();
                    return result;
                }
                None => return result,
            }
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// The opening quote must already be consumed. Unlike a stylesheet tokenizer
    /// this treats EOF and raw newlines as hard errors: a selector is one line.
    ///
    /// # Errors
    ///
    /// Returns a parse error for unterminated strings or raw newlines.
    pub fn consume_string(&mut self, ending_code_point: char) -> Result<String> {
        let start = self.position.saturating_sub(1);
        let mut value = String::new();

        loop {
            match self.consume() {
                Some(c) if c == ending_code_point => return Ok(value),
                None => return Err(SyntaxError::parse(start, "unterminated string")),
                Some('\n') => return Err(SyntaxError::parse(start, "newline in string")),
                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => {
                        let _ = self.consume();
                    }
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// Consume a parenthesized argument verbatim.
    ///
    /// The opening `(` must already be consumed. Nested parentheses are balanced,
    /// quoted strings and escapes are skipped over but kept in the returned text,
    /// and the closing `)` is consumed but not returned.
    ///
    /// # Errors
    ///
    /// Returns a parse error when the parentheses or a string are never closed.
    pub fn consume_argument(&mut self) -> Result<String> {
        let start = self.position.saturating_sub(1);
        let mut raw = String::new();
        let mut depth = 1u32;
        let mut quote: Option<char> = None;

        while let Some(c) = self.consume() {
            match (quote, c) {
                (_, '\\') => {
                    raw.push(c);
                    if let Some(escaped) = self.consume() {
                        raw.push(escaped);
                    }
                    continue;
                }
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(raw);
                    }
                }
                (None, _) => {}
            }
            raw.push(c);
        }

        let message = if quote.is_some() {
            "unterminated string in argument"
        } else {
            "unbalanced parentheses"
        };
        Err(SyntaxError::parse(start, message))
    }

    /// [§ 4.3.13 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                for _ in 0..5 {
                    match self.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(h);
                            self.position += 1;
                        }
                        _ => break,
                    }
                }
                // "If the next input code point is whitespace, consume it."
                if self.peek().is_some_and(is_whitespace) {
                    self.position += 1;
                }
                let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                if code_point == 0 || (0xD800..=0xDFFF).contains(&code_point) {
                    '\u{FFFD}'
                } else {
                    char::from_u32(code_point).unwrap_or('\u{FFFD}')
                }
            }
            // "EOF": "This is a parse error. Return U+FFFD REPLACEMENT CHARACTER."
            None => '\u{FFFD}',
            Some(c) => c,
        }
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second.is_some() && second != Some('\n')
}

/// "A newline, U+0009 CHARACTER TABULATION, or U+0020 SPACE."
#[must_use]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
#[must_use]
pub const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
#[must_use]
pub const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_sequence_stops_at_delimiters() {
        let mut scanner = Scanner::new("first-child[id]");
        assert_eq!(scanner.consume_ident_sequence(), "first-child");
        assert_eq!(scanner.peek(), Some('['));
    }

    #[test]
    fn ident_sequence_decodes_escapes() {
        let mut scanner = Scanner::new(r"a\:b\31 x");
        assert_eq!(scanner.consume_ident_sequence(), "a:b1x");
        assert!(scanner.is_eof());
    }

    #[test]
    fn argument_keeps_quotes_and_nesting() {
        let mut scanner = Scanner::new(r#""a ) b", (c))tail"#);
        assert_eq!(scanner.consume_argument().unwrap(), r#""a ) b", (c)"#);
        assert_eq!(scanner.consume_ident_sequence(), "tail");
    }

    #[test]
    fn unbalanced_argument_is_an_error() {
        let mut scanner = Scanner::new("(a");
        assert!(scanner.consume_argument().is_err());
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut scanner = Scanner::new("abc");
        assert!(matches!(
            scanner.consume_string('"'),
            Err(SyntaxError::Parse { .. })
        ));
    }
}
