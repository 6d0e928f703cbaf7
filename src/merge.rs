//! Deep merge of the parsed model output into the canonical document shape.
//!
//! Models reliably emit *some* but rarely *all* of the expected nested
//! shape. The merger walks the canonical default tree and, for each key,
//! accepts the parsed value only when it is present, non-null, and
//! type-compatible with the default at that position; everything else keeps
//! its default. The result always has the full canonical structure, so
//! downstream consumers can dereference any path without existence checks.
//!
//! The untyped `serde_json::Value` tree is handled only inside this module;
//! everything downstream sees the typed [`AnalysisDocument`].
//!
//! Leaf handling beyond plain type matching:
//! - closed enum positions (`triggerKey`, `entityType`, …) accept only their
//!   allowed tags, case-insensitively, and fall back to the default rather
//!   than inventing a value;
//! - date positions are normalized to `YYYY-MM-DD`, re-parsing a few common
//!   natural formats, and become `"TBD"` when unrecognizable;
//! - numeric positions accept money-formatted strings (`"$500,000"`);
//! - arrays are replaced wholesale, with each entry sanitized against the
//!   entry default shape.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::document::{AnalysisDocument, Contingency, DiligenceTask, TBD};

const PRICING_STRUCTURES: &[&str] = &[
    "per-acre",
    "per-unit",
    "per-lot",
    "per-square-foot",
    "lump-sum",
    "unknown",
];
const PROPERTY_TYPES: &[&str] = &["residential", "commercial", "land", "development"];
const ENTITY_TYPES: &[&str] = &["Individual", "LLC", "Corporation", "Partnership", "Trust"];
const DEPOSIT_STATUSES: &[&str] = &["not_yet_due", "due_soon", "past_due", "made"];
const TRIGGER_KEYS: &[&str] = &[
    "Opening of Escrow",
    "Title Commitment",
    "Loan Application",
    "Environmental Report",
    "Survey Completion",
];
const SILENCE_RULES: &[&str] = &["Approval", "Termination", "N/A"];
const RESPONSIBLE_PARTIES: &[&str] = &["buyer", "seller", "both"];

/// Keys whose values are dates: either `YYYY-MM-DD` or the `"TBD"` sentinel.
/// `refundableUntil` is excluded — it legitimately holds condition text.
const DATE_KEYS: &[&str] = &[
    "openingDate",
    "actualDate",
    "startDate",
    "endDate",
    "computedDate",
    "outsideDate",
    "loanContingencyDate",
];

/// Merge a parsed (possibly partial) tree into the canonical default shape
/// and project it into the typed document.
pub fn merge_document(parsed: &Value) -> AnalysisDocument {
    let default = AnalysisDocument::canonical_value();
    let merged = merge_value(&default, parsed, "");

    let mut doc: AnalysisDocument = match serde_json::from_value(merged) {
        Ok(doc) => doc,
        Err(e) => {
            // Should be unreachable: the merged tree mirrors the default
            // structure with type-checked leaves.
            warn!(error = %e, "merged tree failed typed projection, using canonical defaults");
            AnalysisDocument::canonical()
        }
    };

    let sum = doc.deposits.first_deposit.amount + doc.deposits.second_deposit.amount;
    if sum > 0.0 {
        doc.deposits.total_deposits = sum;
    }

    doc
}

/// Recursive key-wise merge. Structure always comes from `default`; keys the
/// model invented are dropped, keys it omitted keep their defaults.
fn merge_value(default: &Value, parsed: &Value, key: &str) -> Value {
    match default {
        Value::Object(default_map) => {
            let parsed_map = match parsed {
                Value::Object(map) => Some(map),
                _ => None,
            };
            let mut out = Map::with_capacity(default_map.len());
            for (k, dv) in default_map {
                match parsed_map.and_then(|m| m.get(k)) {
                    Some(pv) if !pv.is_null() => {
                        out.insert(k.clone(), merge_value(dv, pv, k));
                    }
                    _ => {
                        out.insert(k.clone(), dv.clone());
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(_) => match parsed {
            Value::Array(entries) => merge_list(entries, key),
            _ => default.clone(),
        },
        _ => merge_scalar(default, parsed, key),
    }
}

/// Arrays are replaced wholesale, never concatenated. Entries are sanitized
/// against the entry default for the known list positions; string lists
/// keep only string-coercible entries.
fn merge_list(entries: &[Value], key: &str) -> Value {
    match key {
        "tasks" => {
            let template = serde_json::to_value(DiligenceTask::default()).unwrap_or(Value::Null);
            Value::Array(
                entries
                    .iter()
                    .filter(|e| e.is_object())
                    .map(|e| merge_value(&template, e, key))
                    .collect(),
            )
        }
        "contingencies" => {
            let template = serde_json::to_value(Contingency::default()).unwrap_or(Value::Null);
            Value::Array(
                entries
                    .iter()
                    .filter(|e| e.is_object())
                    .map(|e| merge_value(&template, e, key))
                    .collect(),
            )
        }
        // items, alternates: plain string lists
        _ => Value::Array(
            entries
                .iter()
                .filter_map(|e| match e {
                    Value::String(s) if !s.trim().is_empty() => Some(json!(s)),
                    Value::Number(n) => Some(json!(n.to_string())),
                    _ => None,
                })
                .collect(),
        ),
    }
}

fn merge_scalar(default: &Value, parsed: &Value, key: &str) -> Value {
    if let Some(allowed) = enum_tags(key) {
        return match parsed.as_str().and_then(|s| canonical_tag(s, key, allowed)) {
            Some(tag) => json!(tag),
            None => {
                if parsed.as_str().is_some() {
                    warn!(key, value = %parsed, "unrecognized enum tag, keeping default");
                }
                default.clone()
            }
        };
    }

    if DATE_KEYS.contains(&key) {
        return match parsed.as_str() {
            Some(raw) => json!(normalize_date(raw).unwrap_or_else(|| TBD.to_string())),
            None => default.clone(),
        };
    }

    match default {
        Value::Null => merge_untyped(parsed, key),
        Value::String(_) => match parsed {
            Value::String(s) => json!(s),
            Value::Number(n) => json!(n.to_string()),
            _ => default.clone(),
        },
        Value::Number(_) => match parse_number(parsed) {
            Some(n) => {
                if key == "daysFromTrigger" {
                    json!(n as i64)
                } else {
                    json!(n)
                }
            }
            None => default.clone(),
        },
        Value::Bool(_) => match parse_bool(parsed) {
            Some(b) => json!(b),
            None => default.clone(),
        },
        _ => default.clone(),
    }
}

/// Leaves whose canonical default is `null` carry their expected type in the
/// key, not in the default value.
fn merge_untyped(parsed: &Value, key: &str) -> Value {
    match key {
        "refundable" => parse_bool(parsed).map(|b| json!(b)).unwrap_or(Value::Null),
        "daysFromTrigger" => parse_number(parsed)
            .map(|n| json!(n as i64))
            .unwrap_or(Value::Null),
        _ => match parsed {
            Value::String(s) if !s.trim().is_empty() => json!(s),
            Value::Number(n) => json!(n.to_string()),
            _ => Value::Null,
        },
    }
}

fn enum_tags(key: &str) -> Option<&'static [&'static str]> {
    match key {
        "pricingStructure" => Some(PRICING_STRUCTURES),
        "propertyType" => Some(PROPERTY_TYPES),
        "entityType" => Some(ENTITY_TYPES),
        "status" => Some(DEPOSIT_STATUSES),
        "triggerKey" => Some(TRIGGER_KEYS),
        "silenceRule" => Some(SILENCE_RULES),
        "responsibleParty" => Some(RESPONSIBLE_PARTIES),
        _ => None,
    }
}

/// Match a model-emitted tag against the closed set, case-insensitively,
/// returning the canonical casing. Deposit statuses additionally tolerate
/// spaces for underscores ("Past Due" → "past_due").
fn canonical_tag(s: &str, key: &str, allowed: &'static [&'static str]) -> Option<&'static str> {
    let mut candidate = s.trim().to_string();
    if key == "status" {
        candidate = candidate.replace(' ', "_");
    }
    allowed
        .iter()
        .find(|tag| tag.eq_ignore_ascii_case(&candidate))
        .copied()
}

/// Normalize a raw date string to `YYYY-MM-DD`. `None` means unrecognizable
/// (the caller substitutes `"TBD"`). Free-text timing phrases land here and
/// correctly degrade to the sentinel.
fn normalize_date(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    if t.eq_ignore_ascii_case(TBD) {
        return Some(TBD.to_string());
    }
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    for fmt in ["%m/%d/%Y", "%m-%d-%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn parse_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        // Tolerate money formatting: "$500,000.00"
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' '))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}

fn parse_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
