//! Multi-strategy parsing of repaired candidate JSON.
//!
//! Strategies run in order of increasing aggressiveness and stop at the
//! first success:
//!
//! 1. **Direct** — parse the repaired string as-is.
//! 2. **Aggressive** — additionally quote bare string values and strip any
//!    remaining invalid escape sequences, then parse.
//! 3. **Brace balance** — walk the string counting `{`/`}` depth, truncate
//!    at the position where depth first returns to zero, and parse that
//!    prefix. Recovers objects followed by trailing garbage the greedy
//!    locator swallowed.
//!
//! Exhaustion of all three is the designed trigger for the fallback
//! synthesizer, not an error to propagate.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use crate::repair::rewrite_outside_strings;

/// Which strategy produced a parse, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Direct,
    Aggressive,
    BraceBalance,
}

/// Try each strategy in order; `None` signals exhaustion.
pub fn parse_candidate(repaired: &str) -> Option<(Value, ParseStrategy)> {
    if let Ok(value) = serde_json::from_str::<Value>(repaired) {
        return Some((value, ParseStrategy::Direct));
    }
    debug!("direct parse failed, trying aggressive pass");

    let aggressive = strip_invalid_escapes(&quote_bare_values(repaired));
    if let Ok(value) = serde_json::from_str::<Value>(&aggressive) {
        return Some((value, ParseStrategy::Aggressive));
    }
    debug!("aggressive parse failed, trying brace-balance truncation");

    if let Some(prefix) = balanced_prefix(repaired) {
        if let Ok(value) = serde_json::from_str::<Value>(prefix) {
            return Some((value, ParseStrategy::BraceBalance));
        }
        // The aggressive rewrites may be what the prefix needed.
        let prefix = strip_invalid_escapes(&quote_bare_values(prefix));
        if let Ok(value) = serde_json::from_str::<Value>(&prefix) {
            return Some((value, ParseStrategy::BraceBalance));
        }
    }

    debug!("all parse strategies exhausted");
    None
}

fn bare_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(:\s*)([A-Za-z_][A-Za-z0-9_ .\-/]*?)\s*([,}\]])").unwrap())
}

/// Quote unquoted string values (`"status": past due` → `"status": "past
/// due"`), leaving `true`/`false`/`null` and numbers alone. Runs only
/// outside existing string literals.
fn quote_bare_values(input: &str) -> String {
    rewrite_outside_strings(input, |seg| {
        bare_value_re()
            .replace_all(seg, |caps: &regex::Captures| {
                let token = caps[2].trim();
                if matches!(token, "true" | "false" | "null") || token.parse::<f64>().is_ok() {
                    format!("{}{}{}", &caps[1], token, &caps[3])
                } else {
                    format!("{}\"{}\"{}", &caps[1], token, &caps[3])
                }
            })
            .into_owned()
    })
}

/// Drop backslashes that start an escape sequence JSON does not define
/// (`\x`, `\'`, a lone trailing backslash). Valid escapes survive.
fn strip_invalid_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if c == '\\' {
            match chars.peek() {
                Some(&next) if matches!(next, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u') =>
                {
                    out.push(c);
                    out.push(next);
                    chars.next();
                }
                // Invalid escape: keep the character, lose the backslash.
                Some(&next) => {
                    out.push(next);
                    chars.next();
                }
                None => {}
            }
        } else {
            if c == '"' {
                in_string = false;
            }
            out.push(c);
        }
    }

    out
}

/// Return the prefix of `input` up to the point where `{`/`}` depth first
/// returns to zero, ignoring braces inside string literals. `None` when the
/// depth never balances.
fn balanced_prefix(input: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut opened = false;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => {
                depth += 1;
                opened = true;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if opened && depth == 0 {
                    return Some(&input[..i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_parse_wins_on_clean_json() {
        let (value, strategy) = parse_candidate(r#"{"a": 1}"#).unwrap();
        assert_eq!(strategy, ParseStrategy::Direct);
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn aggressive_quotes_bare_values() {
        let (value, strategy) = parse_candidate(r#"{"status": past_due, "ok": true}"#).unwrap();
        assert_eq!(strategy, ParseStrategy::Aggressive);
        assert_eq!(value["status"], "past_due");
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn aggressive_preserves_literals_and_numbers() {
        let quoted = quote_bare_values(r#"{"a": null, "b": false, "c": 1.5, "d": Main St}"#);
        let v: Value = serde_json::from_str(&quoted).unwrap();
        assert_eq!(v["a"], Value::Null);
        assert_eq!(v["b"], false);
        assert_eq!(v["c"], 1.5);
        assert_eq!(v["d"], "Main St");
    }

    #[test]
    fn aggressive_strips_invalid_escapes() {
        let (value, _) = parse_candidate(r#"{"name": "A\cme"}"#).unwrap();
        assert_eq!(value["name"], "Acme");
    }

    #[test]
    fn valid_escapes_survive() {
        let out = strip_invalid_escapes(r#"{"a": "line\nbreak \"quoted\""}"#);
        assert_eq!(out, r#"{"a": "line\nbreak \"quoted\""}"#);
    }

    #[test]
    fn brace_balance_recovers_from_trailing_garbage() {
        let input = r#"{"a": 1} and then the model rambled {on and on"#;
        let (value, strategy) = parse_candidate(input).unwrap();
        assert_eq!(strategy, ParseStrategy::BraceBalance);
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_balance() {
        let input = r#"{"note": "a { b } c", "n": 2} trailing junk {"#;
        let (value, strategy) = parse_candidate(input).unwrap();
        assert_eq!(strategy, ParseStrategy::BraceBalance);
        assert_eq!(value["n"], 2);
    }

    #[test]
    fn exhaustion_returns_none() {
        assert!(parse_candidate("{{{{ nothing balances").is_none());
        assert!(parse_candidate("not json at all").is_none());
    }

    #[test]
    fn balanced_prefix_none_when_never_balanced() {
        assert!(balanced_prefix(r#"{"a": {"b": 1}"#).is_none());
    }
}
