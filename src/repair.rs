//! Staged textual repair of near-JSON model output.
//!
//! Applies an ordered sequence of syntactic fixes to turn near-JSON text
//! into something parseable. Best effort only — the output is not guaranteed
//! to parse; the multi-strategy parser decides what to do next.
//!
//! Transforms, in order:
//! 1. Trim anything before the first `{` / after the last `}`.
//! 2. Strip trailing commas before `}`/`]`.
//! 3. Quote bare object keys matching identifier syntax.
//! 4. Convert single-quoted string values to double-quoted.
//! 5. Strip control characters (0x00–0x1F, 0x7F–0x9F).
//! 6. Collapse runs of commas and normalize whitespace.
//!
//! Order matters: key-quoting runs after comma-stripping so already-valid
//! structure is not corrupted. Every transform is idempotent, so repairing
//! repaired output is a no-op. Transforms 2, 3, 4, and 6 are applied only
//! outside double-quoted string literals; string *content* is never altered
//! except by the quote-style conversion, which is restricted to
//! single-quoted spans containing no double quote.

use regex::Regex;
use std::sync::OnceLock;

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches comma runs too, so one pass fully cleans ",,}".
    RE.get_or_init(|| Regex::new(r"(?:,\s*)+([}\]])").unwrap())
}

fn bare_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").unwrap())
}

fn single_quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // No double quote allowed inside the span, so apostrophes inside
    // legitimate double-quoted content are never rewritten.
    RE.get_or_init(|| Regex::new(r#"'([^'"]*)'"#).unwrap())
}

fn comma_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",(?:\s*,)+").unwrap())
}

fn whitespace_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Run the full repair sequence over a candidate JSON substring.
pub fn repair_json(candidate: &str) -> String {
    let s = trim_to_braces(candidate);
    let s = rewrite_outside_strings(&s, |seg| {
        trailing_comma_re().replace_all(seg, "$1").into_owned()
    });
    let s = rewrite_outside_strings(&s, |seg| {
        bare_key_re().replace_all(seg, "$1\"$2\":").into_owned()
    });
    let s = rewrite_outside_strings(&s, |seg| {
        single_quoted_re().replace_all(seg, "\"$1\"").into_owned()
    });
    let s = strip_control_chars(&s);
    rewrite_outside_strings(&s, |seg| {
        let seg = comma_run_re().replace_all(seg, ",");
        whitespace_run_re().replace_all(&seg, " ").into_owned()
    })
}

/// Drop anything before the first `{` and after the last `}`. Leaves input
/// untouched when no such span exists.
fn trim_to_braces(s: &str) -> String {
    match (s.find('{'), s.rfind('}')) {
        (Some(start), Some(end)) if start <= end => s[start..=end].to_string(),
        _ => s.to_string(),
    }
}

/// Remove C0 and C1 control characters (raw newlines inside string literals
/// are invalid JSON anyway; escaped `\n` sequences are two printable chars
/// and survive).
fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            let cp = c as u32;
            !(cp <= 0x1F || (0x7F..=0x9F).contains(&cp))
        })
        .collect()
}

/// Apply `rewrite` to the spans of `input` that lie outside double-quoted
/// string literals, passing string literals through untouched. Tracks
/// backslash escapes; an unterminated literal swallows the rest of the
/// input, which is the safe direction for garbage.
///
/// Shared with the parser's aggressive pass.
pub(crate) fn rewrite_outside_strings<F: Fn(&str) -> String>(input: &str, rewrite: F) -> String {
    let mut out = String::with_capacity(input.len());
    let mut segment = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in input.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            out.push_str(&rewrite(&segment));
            segment.clear();
            out.push(c);
            in_string = true;
        } else {
            segment.push(c);
        }
    }

    out.push_str(&rewrite(&segment));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_json_passes_through_parseable() {
        let input = r#"{"a": 1, "b": [2, 3], "c": "x, y: z"}"#;
        let repaired = repair_json(input);
        let v: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(v["c"], "x, y: z");
    }

    #[test]
    fn strips_trailing_commas() {
        let repaired = repair_json(r#"{"property": {"purchasePrice": 500000,},}"#);
        let v: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(v["property"]["purchasePrice"], 500000);
    }

    #[test]
    fn quotes_bare_keys() {
        let repaired = repair_json(r#"{address: "123 Main St", price: 5}"#);
        let v: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(v["address"], "123 Main St");
        assert_eq!(v["price"], 5);
    }

    #[test]
    fn converts_single_quoted_values() {
        let repaired = repair_json(r#"{"name": 'Acme LLC'}"#);
        let v: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(v["name"], "Acme LLC");
    }

    #[test]
    fn apostrophe_inside_double_quotes_survives() {
        let input = r#"{"name": "O'Brien Trust"}"#;
        let repaired = repair_json(input);
        let v: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(v["name"], "O'Brien Trust");
    }

    #[test]
    fn strips_control_characters() {
        let input = "{\"a\": \"x\u{0001}y\"}\u{0000}";
        let repaired = repair_json(input);
        let v: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(v["a"], "xy");
    }

    #[test]
    fn collapses_comma_runs() {
        let repaired = repair_json(r#"{"a": 1,,, "b": 2}"#);
        let v: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(v["b"], 2);
    }

    #[test]
    fn trims_surrounding_prose() {
        let repaired = repair_json("Sure! Here you go: {\"a\": 1} Hope that helps.");
        assert!(repaired.starts_with('{'));
        assert!(repaired.ends_with('}'));
    }

    #[test]
    fn repair_is_idempotent() {
        let inputs = [
            r#"{"property": {"purchasePrice": 500000,},}"#,
            r#"{address: '123 Main St', size: 5,,}"#,
            "prose {\"a\":\t1,\n} prose",
            r#"{"name": "O'Brien Trust", "note": "a, b: c"}"#,
            "no braces at all",
        ];
        for input in inputs {
            let once = repair_json(input);
            let twice = repair_json(&once);
            assert_eq!(once, twice, "repair not idempotent for {:?}", input);
        }
    }

    #[test]
    fn comma_and_colon_inside_strings_untouched() {
        let input = r#"{"timing": "30 days, then: closing"}"#;
        let repaired = repair_json(input);
        let v: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(v["timing"], "30 days, then: closing");
    }
}
