//! Selector list parser.
//!
//! Parses a [selector list](https://www.w3.org/TR/selectors-4/#grouping) into
//! one flat [`TokenStream`] per alternative. Functional pseudo-classes that take
//! a selector (`:not()`, `:is()`, `:where()`, `:matches()`, `:has()`) are parsed
//! recursively; every other pseudo-class argument is kept as raw text because
//! its meaning (an nth-expression, a quoted string, a comma list for `:any()`)
//! is decided by the compiler.

use cssxpath_common::warning::warn_once;
use cssxpath_common::{Result, SyntaxError};

use crate::scanner::{Scanner, is_whitespace};
use crate::token::{AttributeAction, PseudoData, Token, TokenKind, TokenStream};

/// Pseudo-classes whose argument is itself a selector list.
const SELECTOR_PSEUDOS: [&str; 5] = ["not", "is", "where", "matches", "has"];

/// Parse a selector list into token streams.
///
/// # Errors
///
/// Returns [`SyntaxError::Parse`] for empty selectors, dangling combinators,
/// unterminated strings, brackets or parentheses, and unexpected characters.
pub fn parse(selector: &str) -> Result<Vec<TokenStream>> {
    SelectorParser::new(selector).parse_selector_list()
}

struct SelectorParser {
    scanner: Scanner,
}

impl SelectorParser {
    fn new(selector: &str) -> Self {
        Self {
            scanner: Scanner::new(selector),
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::parse(self.scanner.position(), message)
    }

    fn parse_selector_list(&mut self) -> Result<Vec<TokenStream>> {
        let mut streams = Vec::new();
        let mut stream = TokenStream::new();

        let _ = self.scanner.consume_whitespace();

        while let Some(c) = self.scanner.peek() {
            match c {
                // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
                // Whitespace only counts as a combinator when it separates two
                // compound selectors.
                c if is_whitespace(c) => {
                    let _ = self.scanner.consume_whitespace();
                    if !matches!(self.scanner.peek(), None | Some(',' | '>' | '+' | '~')) {
                        self.push_combinator(&mut stream, TokenKind::Descendant)?;
                    }
                }
                '>' | '+' | '~' => {
                    let kind = match c {
                        '>' => TokenKind::Child,
                        '+' => TokenKind::Adjacent,
                        _ => TokenKind::Sibling,
                    };
                    self.push_combinator(&mut stream, kind)?;
                    let _ = self.scanner.consume();
                    let _ = self.scanner.consume_whitespace();
                }
                ',' => {
                    self.finish_stream(&mut streams, &mut stream)?;
                    let _ = self.scanner.consume();
                    let _ = self.scanner.consume_whitespace();
                }
                '*' => {
                    let _ = self.scanner.consume();
                    stream.push(Token::bare(TokenKind::Universal));
                }
                // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
                '#' => {
                    let _ = self.scanner.consume();
                    let id = self.scanner.consume_ident_sequence();
                    if id.is_empty() {
                        return Err(self.error("expected an id after '#'"));
                    }
                    stream.push(Token::attribute("id", AttributeAction::Equals, Some(id)));
                }
                // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
                '.' => {
                    let _ = self.scanner.consume();
                    if !self.scanner.would_start_ident_sequence() {
                        return Err(self.error("expected a class name after '.'"));
                    }
                    let class = self.scanner.consume_ident_sequence();
                    stream.push(Token::attribute(
                        "class",
                        AttributeAction::Element,
                        Some(class),
                    ));
                }
                '[' => {
                    let _ = self.scanner.consume();
                    stream.push(self.parse_attribute()?);
                }
                ':' => {
                    let _ = self.scanner.consume();
                    stream.push(self.parse_pseudo()?);
                }
                _ if self.scanner.would_start_ident_sequence() => {
                    let name = self.scanner.consume_ident_sequence();
                    stream.push(Token::tag(name));
                }
                other => return Err(self.error(format!("unexpected character '{other}'"))),
            }
        }

        self.finish_stream(&mut streams, &mut stream)?;
        Ok(streams)
    }

    fn push_combinator(&self, stream: &mut TokenStream, kind: TokenKind) -> Result<()> {
        match stream.last() {
            None => Err(self.error(format!("selector cannot start with a {kind} combinator"))),
            Some(last) if last.kind.is_combinator() => Err(self.error(format!(
                "{kind} combinator cannot follow a {} combinator",
                last.kind
            ))),
            Some(_) => {
                stream.push(Token::bare(kind));
                Ok(())
            }
        }
    }

    fn finish_stream(
        &self,
        streams: &mut Vec<TokenStream>,
        stream: &mut TokenStream,
    ) -> Result<()> {
        match stream.last() {
            None => Err(self.error("empty selector")),
            Some(last) if last.kind.is_combinator() => Err(self.error(format!(
                "selector cannot end with a {} combinator",
                last.kind
            ))),
            Some(_) => {
                streams.push(std::mem::take(stream));
                Ok(())
            }
        }
    }

    /// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
    ///
    /// The opening `[` has been consumed.
    fn parse_attribute(&mut self) -> Result<Token> {
        let _ = self.scanner.consume_whitespace();
        let name = self.scanner.consume_ident_sequence();
        if name.is_empty() {
            return Err(self.error("expected an attribute name"));
        }
        let _ = self.scanner.consume_whitespace();

        let action = match self.scanner.consume() {
            Some(']') => return Ok(Token::attribute(name, AttributeAction::Exists, None)),
            Some('=') => AttributeAction::Equals,
            Some(c @ ('~' | '|' | '^' | '$' | '*' | '!')) => {
                if self.scanner.consume() != Some('=') {
                    return Err(self.error(format!("expected '=' after '{c}'")));
                }
                match c {
                    '~' => AttributeAction::Element,
                    '|' => AttributeAction::Hyphen,
                    '^' => AttributeAction::Start,
                    '$' => AttributeAction::End,
                    '*' => AttributeAction::Any,
                    _ => AttributeAction::Not,
                }
            }
            Some(c) => return Err(self.error(format!("unexpected '{c}' in attribute selector"))),
            None => return Err(self.error("unterminated attribute selector")),
        };

        let _ = self.scanner.consume_whitespace();
        let value = match self.scanner.peek() {
            Some(quote @ ('"' | '\'')) => {
                let _ = self.scanner.consume();
                self.scanner.consume_string(quote)?
            }
            _ => {
                let mut value = String::new();
                while let Some(c) = self.scanner.peek() {
                    if is_whitespace(c) || c == ']' {
                        break;
                    }
                    value.push(c);
                    let _ = self.scanner.consume();
                }
                if value.is_empty() {
                    return Err(self.error(format!("expected a value for attribute '{name}'")));
                }
                value
            }
        };

        let _ = self.scanner.consume_whitespace();
        // [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.scanner.peek() {
            let _ = self.scanner.consume();
            let _ = warn_once(
                "Selector",
                &format!("attribute flag '{}' is ignored", flag.to_ascii_lowercase()),
            );
            let _ = self.scanner.consume_whitespace();
        }

        match self.scanner.consume() {
            Some(']') => Ok(Token::attribute(name, action, Some(value))),
            Some(c) => Err(self.error(format!("expected ']' but found '{c}'"))),
            None => Err(self.error("unterminated attribute selector")),
        }
    }

    /// [§ 3.6 Pseudo-classes and pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    ///
    /// The first `:` has been consumed.
    fn parse_pseudo(&mut self) -> Result<Token> {
        let is_element = self.scanner.peek() == Some(':');
        if is_element {
            let _ = self.scanner.consume();
        }

        if !self.scanner.would_start_ident_sequence() {
            return Err(self.error("expected a pseudo-class name"));
        }
        let name = self.scanner.consume_ident_sequence().to_ascii_lowercase();

        let data = if self.scanner.peek() == Some('(') {
            let _ = self.scanner.consume();
            let start = self.scanner.position();
            let raw = self.scanner.consume_argument()?;
            let leading = raw.chars().take_while(|c| is_whitespace(*c)).count();
            let text = raw.trim_matches(is_whitespace);

            if !is_element && SELECTOR_PSEUDOS.contains(&name.as_str()) {
                let nested = parse(text).map_err(|err| shift_position(err, start + leading))?;
                Some(PseudoData::Selector(nested))
            } else {
                Some(PseudoData::Text(text.to_string()))
            }
        } else {
            None
        };

        Ok(if is_element {
            Token::pseudo_element(name, data)
        } else {
            Token::pseudo(name, data)
        })
    }
}

/// Rebase a nested parse error onto the enclosing selector's offsets.
fn shift_position(error: SyntaxError, base: usize) -> SyntaxError {
    match error {
        SyntaxError::Parse { position, message } => SyntaxError::Parse {
            position: position + base,
            message,
        },
        other => other,
    }
}
