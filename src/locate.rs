//! Best-guess JSON object location inside arbitrary response text.
//!
//! Model responses are expected to contain at most one top-level JSON
//! object, possibly surrounded by prose. Greedy first-`{`-to-last-`}`
//! matching is cheap and correct for that common case; this is a heuristic,
//! not a brace-balance parser. When the model embeds stray braces in
//! explanatory text the span can be mis-delimited — the repairer and the
//! multi-strategy parser exist to tolerate the resulting garbage.

/// Return the substring from the first `{` through the last `}`, or `None`
/// when no such span exists.
pub fn locate_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object_is_returned_whole() {
        assert_eq!(locate_json(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn prose_around_object_is_stripped() {
        let response = "Here is the analysis:\n{\"a\": 1}\nLet me know if you need anything else.";
        assert_eq!(locate_json(response), Some("{\"a\": 1}"));
    }

    #[test]
    fn no_braces_reports_not_found() {
        assert_eq!(locate_json("I cannot analyze this document."), None);
        assert_eq!(locate_json(""), None);
    }

    #[test]
    fn close_before_open_reports_not_found() {
        assert_eq!(locate_json("} nothing here {"), None);
    }

    #[test]
    fn stray_braces_widen_the_span() {
        // Greedy matching grabs from the first { to the last }; the parser
        // strategies downstream deal with the overrun.
        let response = "{\"a\": 1} and for example {not json}";
        assert_eq!(locate_json(response), Some("{\"a\": 1} and for example {not json}"));
    }

    #[test]
    fn multibyte_text_around_object() {
        let response = "résumé → {\"a\": \"é\"} ← voilà";
        assert_eq!(locate_json(response), Some("{\"a\": \"é\"}"));
    }
}
