//! XPath generation.
//!
//! Each token stream becomes one XPath location path. The walk keeps the
//! path fragments emitted so far and the predicate fragments of the step
//! under construction; predicates are committed as one `[...]` whenever a new
//! step begins.

use cssxpath_common::Result;
use cssxpath_selector::{Token, TokenKind, TokenStream, parse};
use tracing::debug;

use crate::CompileOptions;
use crate::context::resolve_tag_context;
use crate::decorate::{DecoratedToken, PseudoClass, alias_pseudos, decorate};
use crate::filters::{Operator, flatten_filters, resolve_filters, streams_expression};
use crate::pseudos::{PseudoRegistry, apply_custom_pseudos};

/// Expand custom pseudos, parse, and canonicalize pseudo aliases.
///
/// # Errors
///
/// Returns any preprocessing or parse error.
pub fn token_streams(selector: &str, pseudos: &PseudoRegistry) -> Result<Vec<TokenStream>> {
    let expanded = apply_custom_pseudos(selector, pseudos)?;
    if expanded != selector {
        debug!(selector, %expanded, "custom pseudos expanded");
    }
    let mut streams = parse(&expanded)?;
    alias_pseudos(&mut streams);
    Ok(streams)
}

/// Compile a selector list to an XPath 1.0 expression.
///
/// A single selector yields a single location path; several are wrapped as
/// a union, `(p1|p2|...)`.
///
/// # Errors
///
/// Returns the first error met in any alternative; no partial output is
/// produced.
pub fn compile(selector: &str, options: &CompileOptions) -> Result<String> {
    let streams = token_streams(selector, &options.pseudos)?;
    debug!(selector, alternatives = streams.len(), "compiling selector");

    let mut expressions = Vec::with_capacity(streams.len());
    for stream in streams {
        let mut tokens = normalize(stream);
        resolve_tag_context(&mut tokens)?;
        expressions.push(xpath_expression(&tokens)?);
    }

    let xpath = if expressions.len() > 1 {
        format!("({})", expressions.join("|"))
    } else {
        expressions.concat()
    };
    debug!(selector, %xpath, "compiled selector");
    Ok(xpath)
}

/// Compile a selector list to a bare predicate (no location steps), suitable
/// for embedding in another expression's `[...]`.
///
/// Combinators and `*` are ignored; each alternative's filters are joined
/// with `and` and the alternatives with `or`.
///
/// # Errors
///
/// Returns any preprocessing, parse or translation error.
pub fn sub_expression(selector: &str, options: &CompileOptions) -> Result<String> {
    let streams: Vec<TokenStream> = token_streams(selector, &options.pseudos)?
        .into_iter()
        .map(|stream| {
            stream
                .into_iter()
                .filter(|token| {
                    matches!(
                        token.kind,
                        TokenKind::Tag | TokenKind::Attribute | TokenKind::Pseudo
                    )
                })
                .collect()
        })
        .collect();
    streams_expression(&streams, Operator::Or)
}

/// Decorate a stream and anchor it: a leading `:root` becomes the document
/// root, anything else gets a leading descendant axis.
fn normalize(stream: TokenStream) -> Vec<DecoratedToken> {
    let mut tokens: Vec<DecoratedToken> = stream.into_iter().map(decorate).collect();
    match tokens.first_mut() {
        Some(first) if first.pseudo() == Some(PseudoClass::Root) => {
            *first = decorate(Token::bare(TokenKind::Root));
        }
        _ => tokens.insert(0, decorate(Token::bare(TokenKind::Descendant))),
    }
    tokens
}

/// Path fragments plus the predicates of the step being built.
#[derive(Default)]
struct PathBuilder {
    xpath: Vec<String>,
    filters: Vec<String>,
}

impl PathBuilder {
    fn push(&mut self, fragment: impl Into<String>) {
        self.xpath.push(fragment.into());
    }

    fn commit(&mut self) -> Result<()> {
        let flattened = flatten_filters(&self.filters, Operator::And)?;
        if !flattened.is_empty() {
            self.xpath.push(format!("[{flattened}]"));
        }
        self.filters.clear();
        Ok(())
    }

    /// Turn the step that named `tag` into a wildcard so positional tests
    /// count every element sibling.
    ///
    /// Returns whether the current step now selects any element, in which
    /// case the tag has to be checked with a `name()` filter instead.
    fn widen_tag_step(&mut self, tag: &str) -> bool {
        let sibling_step = format!("/following-sibling::{tag}");
        let Some(last) = self.xpath.last_mut() else {
            return false;
        };
        if last.as_str() == tag {
            "*".clone_into(last);
        } else if *last == sibling_step {
            "/following-sibling::*".clone_into(last);
        }
        last.as_str() == "*" || last.ends_with("::*")
    }

    fn finish(mut self) -> Result<String> {
        self.commit()?;
        Ok(self.xpath.concat())
    }
}

fn xpath_expression(tokens: &[DecoratedToken]) -> Result<String> {
    let mut path = PathBuilder::default();

    for (i, item) in tokens.iter().enumerate() {
        let flags = &item.flags;
        let previous = i.checked_sub(1).map(|p| &tokens[p].flags);
        let previous_kind = previous.map(|p| p.kind);
        let pseudo = item.pseudo();

        if previous.is_some_and(|p| p.is_non_sibling_axis)
            && !flags.is_tag_or_universal
            && pseudo != Some(PseudoClass::Comment)
        {
            path.push("*");
        }

        if flags.is_sibling_axis {
            path.commit()?;
            continue;
        }
        match previous_kind {
            Some(TokenKind::Adjacent) => {
                path.push("/following-sibling::*");
                if item.token.kind == TokenKind::Tag {
                    path.filters.extend(resolve_filters(item)?);
                }
                path.filters.push("position() = 1".to_string());
                if flags.is_tag_or_universal {
                    continue;
                }
            }
            Some(TokenKind::Sibling) => {
                let node = if item.token.kind == TokenKind::Tag {
                    item.name()
                } else {
                    "*"
                };
                path.push(format!("/following-sibling::{node}"));
                if flags.is_tag_or_universal {
                    continue;
                }
            }
            _ => {}
        }

        match item.token.kind {
            TokenKind::Root => path.xpath = vec!["/*".to_string()],
            TokenKind::Descendant => {
                path.commit()?;
                path.push("//");
            }
            TokenKind::Child => {
                path.commit()?;
                path.push("/");
            }
            TokenKind::Universal => {
                path.commit()?;
                path.push("*");
            }
            TokenKind::Tag => {
                path.commit()?;
                path.push(item.name());
            }
            _ => match pseudo {
                Some(PseudoClass::Comment) => {
                    if !previous.is_some_and(|p| p.is_axis) {
                        path.commit()?;
                        path.push("/");
                    }
                    match item.token.data_text() {
                        Some(data) if !data.is_empty() => path.push(format!("comment()[{data}]")),
                        _ => path.push("comment()"),
                    }
                }
                Some(p) if p.is_child_position() => {
                    let mut filters = resolve_filters(item)?;
                    if let Some(tag) = &item.tag_context
                        && path.widen_tag_step(tag)
                    {
                        filters.insert(0, format!("name() = '{tag}'"));
                    }
                    path.filters.extend(filters);
                }
                _ => path.filters.extend(resolve_filters(item)?),
            },
        }
    }

    path.finish()
}
