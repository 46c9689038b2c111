//! Property tests for compiler invariants.

#![allow(clippy::needless_pass_by_value)]

use cssxpath::decorate::decorate;
use cssxpath::filters::{Operator, flatten_filters};
use cssxpath::nth::nth_expression;
use cssxpath::text::LiteralTable;
use cssxpath::{Token, css_to_xpath, quoted_string};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

/// Map arbitrary bytes onto a lowercase ASCII element name.
fn element_name(seed: &[u8]) -> Option<String> {
    let name: String = seed
        .iter()
        .take(12)
        .map(|byte| char::from(b'a' + byte % 26))
        .collect();
    (!name.is_empty()).then_some(name)
}

#[quickcheck]
fn tag_is_a_descendant_step(seed: Vec<u8>) -> TestResult {
    let Some(name) = element_name(&seed) else {
        return TestResult::discard();
    };
    TestResult::from_bool(css_to_xpath(&name).unwrap() == format!("//{name}"))
}

#[quickcheck]
fn union_joins_alternatives(first: Vec<u8>, second: Vec<u8>) -> TestResult {
    let (Some(a), Some(b)) = (element_name(&first), element_name(&second)) else {
        return TestResult::discard();
    };
    let a = format!("{a}:first-child");
    let b = format!(".{b} > *");
    let joined = format!(
        "({}|{})",
        css_to_xpath(&a).unwrap(),
        css_to_xpath(&b).unwrap()
    );
    TestResult::from_bool(css_to_xpath(&format!("{a}, {b}")).unwrap() == joined)
}

#[quickcheck]
fn single_filter_is_unchanged(filter: String) -> TestResult {
    if filter.is_empty() {
        return TestResult::discard();
    }
    TestResult::from_bool(
        flatten_filters(std::slice::from_ref(&filter), Operator::And).unwrap() == filter,
    )
}

#[quickcheck]
fn repeated_filters_collapse(filter: String) -> TestResult {
    if filter.is_empty() {
        return TestResult::discard();
    }
    let twice = flatten_filters(&[filter.clone(), filter.clone()], Operator::Or).unwrap();
    let thrice = flatten_filters(&[filter.clone(), filter.clone(), filter.clone()], Operator::Or).unwrap();
    TestResult::from_bool(twice == thrice && (twice == filter || twice == format!("({filter})")))
}

#[quickcheck]
fn decoration_is_idempotent(seed: Vec<u8>) -> TestResult {
    let Some(name) = element_name(&seed) else {
        return TestResult::discard();
    };
    let once = decorate(Token::tag(name));
    TestResult::from_bool(decorate(once.token.clone()) == once)
}

#[quickcheck]
fn integer_nth_is_exact_position(position: u16) -> bool {
    nth_expression(&position.to_string()).unwrap() == format!("position() = {position}")
}

#[quickcheck]
fn quoted_string_is_one_xpath_literal(value: String) -> bool {
    let quoted = quoted_string(&value);
    let inner = &quoted[1..quoted.len() - 1];
    quoted.starts_with('"') && quoted.ends_with('"') && !inner.contains('"')
}

#[quickcheck]
fn masked_literals_restore_exactly(text: String) -> TestResult {
    if text.contains("__S") {
        return TestResult::discard();
    }
    let (masked, table) = LiteralTable::capture(&text).unwrap();
    TestResult::from_bool(table.restore(&masked).unwrap() == text)
}
