//! `an+b` arithmetic for `:nth-child()` and `:nth-of-type()`.

use std::sync::LazyLock;

use cssxpath_common::{Result, SyntaxError};
use fancy_regex::Regex;

static NTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([-+])?(\d+)?n(?:\+(\d+))?$").expect("nth regex"));

/// Translate an nth-expression into a `position()` test.
///
/// `odd` and `even` are shorthands for `2n+1` and `2n`; a bare integer is an
/// exact position. For `an+b` the step is checked with `mod` only when `a`
/// (after applying the sign) is neither 0 nor 1.
///
/// ```
/// use cssxpath::nth::nth_expression;
///
/// assert_eq!(nth_expression("4").unwrap(), "position() = 4");
/// assert_eq!(
///     nth_expression("odd").unwrap(),
///     "position() - 1 >= 0 and (position() - 1) mod 2 = 0"
/// );
/// ```
///
/// # Errors
///
/// Returns [`SyntaxError::BadNthExpression`] for anything else.
pub fn nth_expression(data: &str) -> Result<String> {
    let expression = match data.trim() {
        "odd" => "2n+1",
        "even" => "2n",
        other => other,
    };

    if !expression.is_empty() && expression.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(format!("position() = {expression}"));
    }

    let captures = NTH
        .captures(expression)
        .map_err(|err| SyntaxError::regex(NTH.as_str(), &err))?
        .ok_or_else(|| SyntaxError::BadNthExpression(data.to_string()))?;

    let reverse = captures.get(1).is_some_and(|sign| sign.as_str() == "-");
    // Kept as digit text so arbitrarily large coefficients pass through.
    let step = captures
        .get(2)
        .map_or("", |digits| digits.as_str().trim_start_matches('0'));

    let position = captures.get(3).map_or_else(
        || "position()".to_string(),
        |offset| format!("position() - {}", offset.as_str()),
    );
    let comparison = if reverse { "<=" } else { ">=" };

    let mut result = format!("{position} {comparison} 0");
    if !step.is_empty() && (reverse || step != "1") {
        let sign = if reverse { "-" } else { "" };
        result.push_str(&format!(" and ({position}) mod {sign}{step} = 0"));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_matches_2n() {
        let expected = "position() >= 0 and (position()) mod 2 = 0";
        assert_eq!(nth_expression("even").unwrap(), expected);
        assert_eq!(nth_expression("2n").unwrap(), expected);
    }

    #[test]
    fn unit_step_has_no_mod() {
        assert_eq!(nth_expression("n").unwrap(), "position() >= 0");
        assert_eq!(nth_expression("1n+2").unwrap(), "position() - 2 >= 0");
        assert_eq!(nth_expression("-n+3").unwrap(), "position() - 3 <= 0");
    }

    #[test]
    fn negative_step() {
        assert_eq!(
            nth_expression("-2n+3").unwrap(),
            "position() - 3 <= 0 and (position() - 3) mod -2 = 0"
        );
    }

    #[test]
    fn large_coefficients_are_kept_verbatim() {
        assert_eq!(
            nth_expression("99999999999999999999n").unwrap(),
            "position() >= 0 and (position()) mod 99999999999999999999 = 0"
        );
        assert_eq!(
            nth_expression("99999999999999999999").unwrap(),
            "position() = 99999999999999999999"
        );
        assert_eq!(nth_expression("0n+2").unwrap(), "position() - 2 >= 0");
    }

    #[test]
    fn authored_zero_offset_is_kept() {
        assert_eq!(
            nth_expression("3n+0").unwrap(),
            "position() - 0 >= 0 and (position() - 0) mod 3 = 0"
        );
    }

    #[test]
    fn rejects_other_forms() {
        for data in ["", "2n-1", "n+", "first", "2 n"] {
            assert_eq!(
                nth_expression(data),
                Err(SyntaxError::BadNthExpression(data.to_string())),
                "{data:?}"
            );
        }
    }
}
