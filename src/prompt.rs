//! Prompt construction for the structured-extraction request.
//!
//! Renders a fixed, versioned instruction template plus the contract text
//! into a single request payload. The template's field-by-field instructions
//! (dates in `YYYY-MM-DD`, `"TBD"` for missing data, no trailing commas) are
//! a contract with the model, not something we enforce at parse time — the
//! repair/merge/validate pipeline is the real defense.
//!
//! There is exactly one canonical template. It evolves through source
//! control, not through parallel copies.

/// Marker appended when contract text exceeds the configured cap.
pub const TRUNCATION_MARKER: &str = "\n\n[CONTRACT TEXT TRUNCATED]";

/// Template version, logged alongside each analysis run.
pub const PROMPT_VERSION: &str = "v3";

const INSTRUCTION_TEMPLATE: &str = r#"You are a commercial real-estate contract analyst. Read the purchase contract below and extract its terms as a single JSON object.

Rules:
- Respond with ONE JSON object and nothing else. No markdown fences, no commentary.
- Use double quotes for all keys and string values. No trailing commas.
- All dates must be in YYYY-MM-DD format. If a date is unknown, use the string "TBD".
- Put free-text timing language (e.g. "30 days after opening of escrow") in the adjacent "timing" or "period" field, never in a date field.
- Use "TBD" for expected-but-missing strings, null for fields that do not apply, and 0 for unknown amounts.
- "triggerKey" must be one of exactly: "Opening of Escrow", "Title Commitment", "Loan Application", "Environmental Report", "Survey Completion". If none applies, use null.
- "pricingStructure" must be one of: "per-acre", "per-unit", "per-lot", "per-square-foot", "lump-sum", "unknown".
- "propertyType" must be one of: "residential", "commercial", "land", "development".
- "entityType" must be one of: "Individual", "LLC", "Corporation", "Partnership", "Trust".
- Deposit "status" must be one of: "not_yet_due", "due_soon", "past_due", "made".
- "silenceRule" must be one of: "Approval", "Termination", "N/A".
- "totalDeposits" is the sum of all deposit amounts.
- A refundable deposit must state "refundableUntil"; a non-refundable one must leave it null.

Expected shape:
{
  "property": {"address": "", "apn": null, "size": null, "purchasePrice": 0, "pricingStructure": "unknown", "unitPrice": 0, "unitType": "TBD", "propertyType": null},
  "parties": {
    "buyer": {"name": "TBD", "entityType": null, "signatoryName": null, "signatoryTitle": null,
              "noticeAddress": {"street": null, "city": null, "state": null, "zip": null, "full": null},
              "contactInfo": {"phone": null, "fax": null, "email": null, "alternates": []},
              "attorney": {"name": null, "firm": null, "address": null, "phone": null, "fax": null, "email": null}},
    "seller": { ...same shape as buyer... }
  },
  "titleCompany": {"name": null, "officer": null, "address": null, "phone": null, "fax": null, "email": null},
  "escrowCompany": {"name": null, "officer": null, "address": null, "phone": null, "fax": null, "email": null},
  "escrow": {"openingDate": "TBD", "company": null, "officer": null},
  "deposits": {
    "firstDeposit": {"amount": 0, "timing": null, "actualDate": "TBD", "refundable": null, "refundableUntil": null, "status": "not_yet_due"},
    "secondDeposit": { ...same shape... },
    "totalDeposits": 0
  },
  "dueDiligence": {"period": null, "startDate": "TBD", "endDate": "TBD",
    "tasks": [{"name": "", "timing": null, "triggerKey": null, "daysFromTrigger": null, "businessDays": false, "computedDate": "TBD", "critical": false, "description": null}]},
  "contingencies": [{"name": "", "timing": null, "triggerKey": null, "daysFromTrigger": null, "businessDays": false, "computedDate": "TBD", "critical": false, "description": null, "silenceRule": null, "responsibleParty": null}],
  "closingInfo": {"outsideDate": "TBD", "closingDescription": null,
    "extension": {"automatic": false, "buyerOption": null, "sellerOption": null},
    "possession": null, "prorations": null},
  "specialConditions": {"items": [], "sellerObligations": null, "buyerObligations": null},
  "financing": {"financingType": null, "loanAmount": 0, "lender": null, "loanContingencyDate": "TBD", "terms": null}
}

CONTRACT TEXT:
"#;

/// Build the full request payload: template + (possibly truncated) contract
/// text. Pure function of its inputs.
pub fn build_prompt(contract_text: &str, max_contract_chars: usize) -> String {
    let mut prompt = String::with_capacity(
        INSTRUCTION_TEMPLATE.len() + contract_text.len().min(max_contract_chars) + 64,
    );
    prompt.push_str(INSTRUCTION_TEMPLATE);

    if contract_text.len() > max_contract_chars {
        // Cut on a char boundary at or below the cap.
        let mut cut = max_contract_chars;
        while cut > 0 && !contract_text.is_char_boundary(cut) {
            cut -= 1;
        }
        prompt.push_str(&contract_text[..cut]);
        prompt.push_str(TRUNCATION_MARKER);
    } else {
        prompt.push_str(contract_text);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_appended_verbatim() {
        let prompt = build_prompt("PURCHASE AGREEMENT between A and B.", 50_000);
        assert!(prompt.ends_with("PURCHASE AGREEMENT between A and B."));
        assert!(!prompt.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn long_text_is_truncated_with_marker() {
        let text = "x".repeat(1_000);
        let prompt = build_prompt(&text, 100);
        assert!(prompt.ends_with(TRUNCATION_MARKER));
        // Only the first 100 chars of the contract survive.
        let body = prompt
            .strip_suffix(TRUNCATION_MARKER)
            .unwrap()
            .strip_prefix(INSTRUCTION_TEMPLATE)
            .unwrap();
        assert_eq!(body.len(), 100);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(100); // 2 bytes per char
        let prompt = build_prompt(&text, 151);
        assert!(prompt.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn template_carries_the_field_contract() {
        let prompt = build_prompt("", 50_000);
        assert!(prompt.contains("YYYY-MM-DD"));
        assert!(prompt.contains("\"TBD\""));
        assert!(prompt.contains("Opening of Escrow"));
        assert!(prompt.contains("No trailing commas"));
    }

    #[test]
    fn deterministic_for_same_input() {
        let a = build_prompt("some contract", 50_000);
        let b = build_prompt("some contract", 50_000);
        assert_eq!(a, b);
    }
}
