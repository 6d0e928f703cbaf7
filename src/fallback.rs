//! Terminal safety net: synthesize a minimal document from raw contract text.
//!
//! When the model response yields nothing parseable, a lightweight pattern
//! scan of the *original contract text* (not the model response) recovers
//! what it can: the first dollar amount becomes the purchase price, the
//! first address-introducing line becomes the property address. Everything
//! else keeps its canonical default.
//!
//! This function never fails; the pipeline's public entry point always
//! returns a structurally valid document because this one always does.

use regex::Regex;
use std::sync::OnceLock;

use crate::document::AnalysisDocument;

fn money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)").unwrap())
}

fn labeled_address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^.*?(?:property|address|premises)\s*[:\-]\s*(\S[^\r\n]*)").unwrap())
}

fn located_at_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)located\s+at\s+([^.,;\r\n]+)").unwrap())
}

/// Longest address line worth keeping; beyond this it is prose, not an
/// address.
const MAX_ADDRESS_CHARS: usize = 160;

/// Build a canonical-shaped document from whatever the raw text yields.
pub fn synthesize_fallback(contract_text: &str) -> AnalysisDocument {
    let mut doc = AnalysisDocument::canonical();

    if let Some(price) = find_purchase_price(contract_text) {
        doc.property.purchase_price = price;
    }
    if let Some(address) = find_address(contract_text) {
        doc.property.address = address;
    }

    doc
}

/// First dollar-amount-looking token anywhere in the text.
fn find_purchase_price(text: &str) -> Option<f64> {
    let caps = money_re().captures(text)?;
    let cleaned: String = caps[1].chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|p| *p > 0.0)
}

/// First line introduced by "property"/"address"/"premises" with a colon or
/// dash, or a "located at …" run.
fn find_address(text: &str) -> Option<String> {
    let candidate = labeled_address_re()
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .or_else(|| {
            located_at_re()
                .captures(text)
                .map(|c| c[1].trim().to_string())
        })?;

    if candidate.is_empty() || candidate.len() > MAX_ADDRESS_CHARS {
        return None;
    }
    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TBD;

    #[test]
    fn recovers_price_and_labeled_address() {
        let text = "PURCHASE AGREEMENT\nProperty: 123 Main St, Springfield\nPurchase price of $500,000 payable at closing.";
        let doc = synthesize_fallback(text);
        assert_eq!(doc.property.purchase_price, 500_000.0);
        assert_eq!(doc.property.address, "123 Main St, Springfield");
    }

    #[test]
    fn recovers_located_at_address() {
        let text = "The real property located at 42 Elm Avenue, together with improvements.";
        let doc = synthesize_fallback(text);
        assert_eq!(doc.property.address, "42 Elm Avenue");
    }

    #[test]
    fn first_dollar_amount_wins() {
        let text = "Deposit of $25,000.50 toward the price of $900,000.";
        let doc = synthesize_fallback(text);
        assert_eq!(doc.property.purchase_price, 25_000.50);
    }

    #[test]
    fn empty_text_yields_canonical_defaults() {
        let doc = synthesize_fallback("");
        assert_eq!(doc, AnalysisDocument::canonical());
        assert_eq!(doc.property.address, TBD);
        assert_eq!(doc.property.purchase_price, 0.0);
    }

    #[test]
    fn prose_without_patterns_yields_defaults() {
        let doc = synthesize_fallback("This document contains no relevant financial details.");
        assert_eq!(doc, AnalysisDocument::canonical());
    }

    #[test]
    fn overlong_address_lines_are_ignored() {
        let text = format!("Property: {}", "x".repeat(500));
        let doc = synthesize_fallback(&text);
        assert_eq!(doc.property.address, TBD);
    }

    #[test]
    fn never_panics_on_hostile_input() {
        let garbage = "\u{0000}\u{FFFF}$$$$ property::::\n\n$,,,";
        let _ = synthesize_fallback(garbage);
        let _ = synthesize_fallback(&"$9".repeat(10_000));
    }
}
