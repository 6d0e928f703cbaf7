//! Advisory validation of merged analysis documents.
//!
//! Collects human-readable warnings about missing critical fields, malformed
//! dates, and logically inconsistent flags. Warnings never block or mutate
//! the document — a partially-correct extraction is strictly more useful to
//! a human reviewer than no extraction at all. Callers surface the warning
//! list for logging or UI hints.

use regex::Regex;
use std::sync::OnceLock;

use crate::document::{AnalysisDocument, Deposit, TBD};

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

/// Outcome of validating a merged document.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
    pub fully_valid: bool,
}

/// Check a merged document for completeness and internal consistency.
pub fn validate_document(doc: &AnalysisDocument) -> ValidationReport {
    let mut warnings = Vec::new();

    if doc.property.purchase_price == 0.0 {
        warnings.push("property.purchasePrice is missing or zero".to_string());
    }
    if doc.property.address == TBD || doc.property.address.trim().is_empty() {
        warnings.push("property.address is missing".to_string());
    }

    if doc.parties.buyer.name == TBD || doc.parties.buyer.name.trim().is_empty() {
        warnings.push("parties.buyer.name is missing".to_string());
    }
    if doc.parties.seller.name == TBD || doc.parties.seller.name.trim().is_empty() {
        warnings.push("parties.seller.name is missing".to_string());
    }

    if doc.escrow.opening_date == TBD {
        warnings.push("escrow.openingDate is not set".to_string());
    }

    check_date(&mut warnings, "escrow.openingDate", &doc.escrow.opening_date);
    check_date(
        &mut warnings,
        "deposits.firstDeposit.actualDate",
        &doc.deposits.first_deposit.actual_date,
    );
    check_date(
        &mut warnings,
        "deposits.secondDeposit.actualDate",
        &doc.deposits.second_deposit.actual_date,
    );
    check_date(
        &mut warnings,
        "dueDiligence.startDate",
        &doc.due_diligence.start_date,
    );
    check_date(
        &mut warnings,
        "dueDiligence.endDate",
        &doc.due_diligence.end_date,
    );
    for (i, task) in doc.due_diligence.tasks.iter().enumerate() {
        check_date(
            &mut warnings,
            &format!("dueDiligence.tasks[{}].computedDate", i),
            &task.computed_date,
        );
    }
    for (i, c) in doc.contingencies.iter().enumerate() {
        check_date(
            &mut warnings,
            &format!("contingencies[{}].computedDate", i),
            &c.computed_date,
        );
    }
    check_date(
        &mut warnings,
        "closingInfo.outsideDate",
        &doc.closing_info.outside_date,
    );
    check_date(
        &mut warnings,
        "financing.loanContingencyDate",
        &doc.financing.loan_contingency_date,
    );

    check_deposit(
        &mut warnings,
        "deposits.firstDeposit",
        &doc.deposits.first_deposit,
    );
    check_deposit(
        &mut warnings,
        "deposits.secondDeposit",
        &doc.deposits.second_deposit,
    );

    let fully_valid = warnings.is_empty();
    ValidationReport {
        warnings,
        fully_valid,
    }
}

/// Date fields hold `YYYY-MM-DD` or the `"TBD"` sentinel; anything else is
/// worth a warning.
fn check_date(warnings: &mut Vec<String>, field: &str, value: &str) {
    if value != TBD && !date_re().is_match(value) {
        warnings.push(format!("{} is not YYYY-MM-DD or TBD: '{}'", field, value));
    }
}

/// A refundable deposit must say until when; a non-refundable one must not.
fn check_deposit(warnings: &mut Vec<String>, field: &str, deposit: &Deposit) {
    match deposit.refundable {
        Some(true) if deposit.refundable_until.is_none() => {
            warnings.push(format!(
                "{} is marked refundable but has no refundableUntil",
                field
            ));
        }
        Some(false) if deposit.refundable_until.is_some() => {
            warnings.push(format!(
                "{} is marked non-refundable but carries refundableUntil",
                field
            ));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Parties;

    fn populated_doc() -> AnalysisDocument {
        let mut doc = AnalysisDocument::canonical();
        doc.property.address = "123 Main St".to_string();
        doc.property.purchase_price = 500_000.0;
        doc.parties = Parties::default();
        doc.parties.buyer.name = "Acme LLC".to_string();
        doc.parties.seller.name = "Jane Doe".to_string();
        doc.escrow.opening_date = "2025-06-01".to_string();
        doc
    }

    #[test]
    fn populated_document_is_fully_valid() {
        let report = validate_document(&populated_doc());
        assert!(report.fully_valid, "warnings: {:?}", report.warnings);
    }

    #[test]
    fn canonical_defaults_warn_but_do_not_block() {
        let report = validate_document(&AnalysisDocument::canonical());
        assert!(!report.fully_valid);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("purchasePrice")));
        assert!(report.warnings.iter().any(|w| w.contains("buyer.name")));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("escrow.openingDate")));
    }

    #[test]
    fn malformed_date_is_flagged() {
        let mut doc = populated_doc();
        doc.closing_info.outside_date = "sometime in June".to_string();
        let report = validate_document(&doc);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("closingInfo.outsideDate")));
    }

    #[test]
    fn tbd_dates_are_accepted_by_the_format_check() {
        let mut doc = populated_doc();
        doc.financing.loan_contingency_date = TBD.to_string();
        let report = validate_document(&doc);
        assert!(!report
            .warnings
            .iter()
            .any(|w| w.contains("loanContingencyDate")));
    }

    #[test]
    fn refundable_without_until_warns() {
        let mut doc = populated_doc();
        doc.deposits.first_deposit.amount = 25_000.0;
        doc.deposits.first_deposit.refundable = Some(true);
        let report = validate_document(&doc);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("refundable but has no refundableUntil")));
    }

    #[test]
    fn non_refundable_with_until_warns() {
        let mut doc = populated_doc();
        doc.deposits.second_deposit.refundable = Some(false);
        doc.deposits.second_deposit.refundable_until =
            Some("close of due diligence".to_string());
        let report = validate_document(&doc);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("non-refundable but carries refundableUntil")));
    }

    #[test]
    fn unknown_refundability_is_not_flagged() {
        let doc = populated_doc();
        assert!(doc.deposits.first_deposit.refundable.is_none());
        let report = validate_document(&doc);
        assert!(!report.warnings.iter().any(|w| w.contains("refundable")));
    }

    #[test]
    fn validation_never_mutates() {
        let doc = populated_doc();
        let before = doc.clone();
        let _ = validate_document(&doc);
        assert_eq!(doc, before);
    }
}
