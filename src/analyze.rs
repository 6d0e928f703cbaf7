//! Pipeline orchestration: one contract in, one document out.
//!
//! Control flow: prompt builder → model client → JSON locator → repairer →
//! multi-strategy parser → schema merger → validator. Any irrecoverable
//! failure between the model call and the parser routes to the fallback
//! synthesizer instead of raising — model unreliability is a routine
//! condition, not an error. Given a constructed client, [`analyze`] always
//! returns a structurally complete report; the only failure that crosses
//! the core's boundary is missing credentials, and that is raised by
//! [`crate::model::OpenAiClient::new`] before any call is attempted.
//!
//! The computation is request-scoped and stateless: no caches, no locks, no
//! retries (transport retry policy lives inside the client). Concurrent
//! analyses are independent.

use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::document::AnalysisDocument;
use crate::fallback::synthesize_fallback;
use crate::locate::locate_json;
use crate::merge::merge_document;
use crate::model::ModelClient;
use crate::parse::parse_candidate;
use crate::prompt::{build_prompt, PROMPT_VERSION};
use crate::validate::validate_document;

/// How the document was produced — the caller's low-confidence signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Parsed and merged from the model's response.
    Extracted,
    /// Pattern-scanned from the raw contract text after the model path
    /// failed.
    Fallback,
}

/// Result of one analysis invocation.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub document: AnalysisDocument,
    pub warnings: Vec<String>,
    pub fully_valid: bool,
    pub outcome: AnalysisOutcome,
}

/// Analyze one contract. Never fails: either a merged-and-validated model
/// extraction or a fallback document comes back.
pub async fn analyze(
    client: &dyn ModelClient,
    config: &AnalysisConfig,
    contract_text: &str,
) -> AnalysisReport {
    let prompt = build_prompt(contract_text, config.max_contract_chars);
    info!(
        prompt_version = PROMPT_VERSION,
        contract_chars = contract_text.len(),
        "requesting contract analysis"
    );

    let response = match client.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "model call failed, synthesizing fallback document");
            return fallback_report(contract_text);
        }
    };

    let candidate = match locate_json(&response) {
        Some(span) => span,
        None => {
            warn!("no JSON object found in model response, synthesizing fallback document");
            return fallback_report(contract_text);
        }
    };

    let repaired = crate::repair::repair_json(candidate);

    let parsed = match parse_candidate(&repaired) {
        Some((value, strategy)) => {
            info!(?strategy, "model response parsed");
            value
        }
        None => {
            warn!("all parse strategies exhausted, synthesizing fallback document");
            return fallback_report(contract_text);
        }
    };

    let document = merge_document(&parsed);
    let validation = validate_document(&document);
    if !validation.fully_valid {
        info!(
            warning_count = validation.warnings.len(),
            "extraction completed with validation warnings"
        );
    }

    AnalysisReport {
        document,
        fully_valid: validation.fully_valid,
        warnings: validation.warnings,
        outcome: AnalysisOutcome::Extracted,
    }
}

/// Run the pattern-scan synthesizer and validate what it produced.
fn fallback_report(contract_text: &str) -> AnalysisReport {
    let document = synthesize_fallback(contract_text);
    let validation = validate_document(&document);
    AnalysisReport {
        document,
        fully_valid: validation.fully_valid,
        warnings: validation.warnings,
        outcome: AnalysisOutcome::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use async_trait::async_trait;

    struct ScriptedClient(Result<String, fn() -> ModelError>);

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn ok_client(response: &str) -> ScriptedClient {
        ScriptedClient(Ok(response.to_string()))
    }

    #[tokio::test]
    async fn clean_response_extracts() {
        let client = ok_client(r#"{"property": {"address": "1 Oak", "purchasePrice": 75000}}"#);
        let report = analyze(&client, &AnalysisConfig::default(), "contract text").await;
        assert_eq!(report.outcome, AnalysisOutcome::Extracted);
        assert_eq!(report.document.property.address, "1 Oak");
        assert_eq!(report.document.property.purchase_price, 75_000.0);
    }

    #[tokio::test]
    async fn transport_error_routes_to_fallback() {
        let client = ScriptedClient(Err(|| ModelError::Timeout("deadline exceeded".into())));
        let text = "Property: 9 Pine Rd\nPrice: $10,000";
        let report = analyze(&client, &AnalysisConfig::default(), text).await;
        assert_eq!(report.outcome, AnalysisOutcome::Fallback);
        assert_eq!(report.document.property.address, "9 Pine Rd");
        assert_eq!(report.document.property.purchase_price, 10_000.0);
    }

    #[tokio::test]
    async fn braceless_refusal_routes_to_fallback() {
        let client = ok_client("I am sorry, I cannot analyze this document.");
        let report = analyze(&client, &AnalysisConfig::default(), "no patterns here").await;
        assert_eq!(report.outcome, AnalysisOutcome::Fallback);
        assert_eq!(report.document, crate::document::AnalysisDocument::canonical());
    }

    #[tokio::test]
    async fn parse_exhaustion_routes_to_fallback() {
        let client = ok_client("here it is: {: : : \"unfixable\"} done");
        let report = analyze(&client, &AnalysisConfig::default(), "Price is $7,500 total").await;
        assert_eq!(report.outcome, AnalysisOutcome::Fallback);
        assert_eq!(report.document.property.purchase_price, 7_500.0);
    }
}
