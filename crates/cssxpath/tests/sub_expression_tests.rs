//! Integration tests for bare predicate compilation.

use cssxpath::{CompileOptions, PseudoRegistry, SyntaxError, sub_expression};

fn predicate(selector: &str) -> String {
    sub_expression(selector, &CompileOptions::default())
        .unwrap_or_else(|err| panic!("{selector:?} failed: {err}"))
}

#[test]
fn test_single_tag() {
    assert_eq!(predicate("a"), "translate(name(), 'a', 'A') = 'A'");
}

#[test]
fn test_class() {
    assert_eq!(
        predicate(".b"),
        "@class and contains(concat(' ', normalize-space(@class), ' '), ' b ')"
    );
}

#[test]
fn test_compound() {
    assert_eq!(
        predicate("a.b"),
        "(translate(name(), 'a', 'A') = 'A') and @class and contains(concat(' ', normalize-space(@class), ' '), ' b ')"
    );
}

#[test]
fn test_alternatives_are_or_combined() {
    assert_eq!(
        predicate("a, b"),
        "(translate(name(), 'a', 'A') = 'A') or (translate(name(), 'b', 'B') = 'B')"
    );
}

#[test]
fn test_text() {
    assert_eq!(
        predicate(":text(\"foo\")"),
        "translate(normalize-space(), 'FO', 'fo') = \"foo\""
    );
}

#[test]
fn test_combinators_and_universal_are_ignored() {
    assert_eq!(predicate("* > [b] [c]"), "@b and @c");
}

#[test]
fn test_custom_pseudos_apply() {
    let options =
        CompileOptions::with_pseudos(PseudoRegistry::new().literal("button", "[role=button]"));
    assert_eq!(
        sub_expression(":button", &options).unwrap(),
        "@role = 'button'"
    );
}

#[test]
fn test_errors() {
    assert_eq!(
        sub_expression(":hover", &CompileOptions::default()),
        Err(SyntaxError::UnsupportedPseudo("hover".to_string()))
    );
}
