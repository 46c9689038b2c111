//! Integration tests for the selector parser.

use cssxpath_common::SyntaxError;
use cssxpath_selector::{AttributeAction, PseudoData, Token, TokenKind, parse};

fn single(selector: &str) -> Vec<Token> {
    let mut streams = parse(selector).unwrap();
    assert_eq!(streams.len(), 1, "expected one stream for {selector:?}");
    streams.remove(0)
}

#[test]
fn test_type_and_universal() {
    assert_eq!(single("div"), vec![Token::tag("div")]);
    assert_eq!(single("*"), vec![Token::bare(TokenKind::Universal)]);
}

#[test]
fn test_tag_case_is_preserved() {
    assert_eq!(single("myElement"), vec![Token::tag("myElement")]);
}

#[test]
fn test_id_and_class_shorthands() {
    assert_eq!(
        single("#main.a.b"),
        vec![
            Token::attribute("id", AttributeAction::Equals, Some("main".to_string())),
            Token::attribute("class", AttributeAction::Element, Some("a".to_string())),
            Token::attribute("class", AttributeAction::Element, Some("b".to_string())),
        ]
    );
}

#[test]
fn test_attribute_operators() {
    let cases = [
        ("[b]", AttributeAction::Exists, None),
        ("[b=c]", AttributeAction::Equals, Some("c")),
        ("[b~=c]", AttributeAction::Element, Some("c")),
        ("[b|=c]", AttributeAction::Hyphen, Some("c")),
        ("[b^=c]", AttributeAction::Start, Some("c")),
        ("[b$=c]", AttributeAction::End, Some("c")),
        ("[b*=c]", AttributeAction::Any, Some("c")),
        ("[b!=c]", AttributeAction::Not, Some("c")),
    ];
    for (selector, action, value) in cases {
        assert_eq!(
            single(selector),
            vec![Token::attribute("b", action, value.map(str::to_string))],
            "{selector}"
        );
    }
}

#[test]
fn test_attribute_values_quoted_and_spaced() {
    assert_eq!(
        single(r#"a[ href = "https://x.com/?q=a b" ]"#)[1],
        Token::attribute(
            "href",
            AttributeAction::Equals,
            Some("https://x.com/?q=a b".to_string())
        )
    );
    assert_eq!(
        single(r"[title='it\'s']")[0].value.as_deref(),
        Some("it's")
    );
}

#[test]
fn test_attribute_flag_is_ignored() {
    assert_eq!(
        single("[type=radio i]"),
        vec![Token::attribute(
            "type",
            AttributeAction::Equals,
            Some("radio".to_string())
        )]
    );
}

#[test]
fn test_combinators() {
    let kinds: Vec<TokenKind> = single("a b > c + d ~ e").iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            TokenKind::Tag,
            TokenKind::Descendant,
            TokenKind::Tag,
            TokenKind::Child,
            TokenKind::Tag,
            TokenKind::Adjacent,
            TokenKind::Tag,
            TokenKind::Sibling,
            TokenKind::Tag,
        ]
    );
}

#[test]
fn test_selector_list() {
    let streams = parse(" a ,b , c ").unwrap();
    assert_eq!(
        streams,
        vec![
            vec![Token::tag("a")],
            vec![Token::tag("b")],
            vec![Token::tag("c")],
        ]
    );
}

#[test]
fn test_pseudo_names_are_lowercased() {
    assert_eq!(single(":First-Child"), vec![Token::pseudo("first-child", None)]);
}

#[test]
fn test_pseudo_text_argument_is_raw() {
    let tokens = single(r#"a:text( "Foo  (bar)" )"#);
    assert_eq!(
        tokens[1],
        Token::pseudo(
            "text",
            Some(PseudoData::Text(r#""Foo  (bar)""#.to_string()))
        )
    );

    let tokens = single(":any(first-child[id], c)");
    assert_eq!(tokens[0].data_text(), Some("first-child[id], c"));
}

#[test]
fn test_not_argument_is_parsed() {
    let tokens = single(":not(a.b, :last-child)");
    let nested = tokens[0].data.as_ref().and_then(PseudoData::as_selector).unwrap();
    assert_eq!(nested.len(), 2);
    assert_eq!(nested[0][0], Token::tag("a"));
    assert_eq!(nested[1], vec![Token::pseudo("last-child", None)]);
}

#[test]
fn test_pseudo_element() {
    assert_eq!(
        single("p::before"),
        vec![Token::tag("p"), Token::pseudo_element("before", None)]
    );
}

#[test]
fn test_invalid_selectors() {
    for selector in [
        "", "   ", "a,", ",a", "> a", "a >", "a > > b", "[", "[b", "[b=]", "[b=\"c]",
        ":", "a:not(b", ".", "#", "a{", "a)",
    ] {
        assert!(
            matches!(parse(selector), Err(SyntaxError::Parse { .. })),
            "{selector:?} should fail to parse"
        );
    }
}

#[test]
fn test_tokens_serialize_without_empty_fields() {
    let json = serde_json::to_string(&single("a[b]")).unwrap();
    assert_eq!(
        json,
        r#"[{"type":"tag","name":"a"},{"type":"attribute","name":"b","action":"exists"}]"#
    );
}
