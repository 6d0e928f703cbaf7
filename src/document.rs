//! Canonical structured-extraction output shape.
//!
//! These types define the `AnalysisDocument` that flows out of the analysis
//! pipeline. Every field exists after merging, even when the model omitted
//! it, so downstream consumers can dereference deep paths like
//! `document.parties.buyer.contact_info.email` without existence checks.
//!
//! Missing-but-expected values carry the `"TBD"` sentinel; fields that may
//! legitimately never apply are `Option`s. Date-valued fields hold either a
//! `YYYY-MM-DD` string or `"TBD"`, never free text — free-text timing lives
//! in the adjacent `timing`/`period` fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for expected-but-unknown values, distinct from `None`.
pub const TBD: &str = "TBD";

/// Top-level analysis result for a single contract.
///
/// Constructed once per analysis request, either from the model's response
/// (merged against the canonical defaults) or from the fallback synthesizer.
/// Immutable after validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisDocument {
    pub property: Property,
    pub parties: Parties,
    pub title_company: CompanyContact,
    pub escrow_company: CompanyContact,
    pub escrow: Escrow,
    pub deposits: Deposits,
    pub due_diligence: DueDiligence,
    pub contingencies: Vec<Contingency>,
    pub closing_info: ClosingInfo,
    pub special_conditions: SpecialConditions,
    pub financing: Financing,
}

impl AnalysisDocument {
    /// The canonical default shape: every field present at its safe default
    /// (zero / `"TBD"` / `None` / empty list).
    pub fn canonical() -> Self {
        Self::default()
    }

    /// The canonical default shape as an untyped JSON tree.
    ///
    /// The schema merger walks this tree to decide which keys and value
    /// types the model's output is allowed to fill in.
    pub fn canonical_value() -> Value {
        serde_json::to_value(Self::canonical()).unwrap_or(Value::Null)
    }
}

/// Property identification and pricing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Property {
    pub address: String,
    pub apn: Option<String>,
    pub size: Option<String>,
    pub purchase_price: f64,
    pub pricing_structure: PricingStructure,
    pub unit_price: f64,
    pub unit_type: String,
    pub property_type: Option<PropertyType>,
}

impl Default for Property {
    fn default() -> Self {
        Self {
            address: TBD.to_string(),
            apn: None,
            size: None,
            purchase_price: 0.0,
            pricing_structure: PricingStructure::Unknown,
            unit_price: 0.0,
            unit_type: TBD.to_string(),
            property_type: None,
        }
    }
}

/// How the purchase price is structured.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PricingStructure {
    PerAcre,
    PerUnit,
    PerLot,
    PerSquareFoot,
    LumpSum,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Residential,
    Commercial,
    Land,
    Development,
}

/// Buyer and seller records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Parties {
    pub buyer: Party,
    pub seller: Party,
}

/// One side of the transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub entity_type: Option<EntityType>,
    pub signatory_name: Option<String>,
    pub signatory_title: Option<String>,
    pub notice_address: Address,
    pub contact_info: ContactInfo,
    pub attorney: Attorney,
}

impl Default for Party {
    fn default() -> Self {
        Self {
            name: TBD.to_string(),
            entity_type: None,
            signatory_name: None,
            signatory_title: None,
            notice_address: Address::default(),
            contact_info: ContactInfo::default(),
            attorney: Attorney::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntityType {
    Individual,
    #[serde(rename = "LLC")]
    Llc,
    Corporation,
    Partnership,
    Trust,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub full: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub alternates: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Attorney {
    pub name: Option<String>,
    pub firm: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
}

/// Title or escrow company contact block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CompanyContact {
    pub name: Option<String>,
    pub officer: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Escrow {
    pub opening_date: String,
    pub company: Option<String>,
    pub officer: Option<String>,
}

impl Default for Escrow {
    fn default() -> Self {
        Self {
            opening_date: TBD.to_string(),
            company: None,
            officer: None,
        }
    }
}

/// Deposit schedule. `total_deposits` is the sum of the individual deposit
/// amounts when computable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Deposits {
    pub first_deposit: Deposit,
    pub second_deposit: Deposit,
    pub total_deposits: f64,
}

/// A single deposit. A refundable deposit carries `refundable_until`; a
/// non-refundable one must not (the validator warns on violations).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Deposit {
    pub amount: f64,
    pub timing: Option<String>,
    pub actual_date: String,
    pub refundable: Option<bool>,
    pub refundable_until: Option<String>,
    pub status: DepositStatus,
}

impl Default for Deposit {
    fn default() -> Self {
        Self {
            amount: 0.0,
            timing: None,
            actual_date: TBD.to_string(),
            refundable: None,
            refundable_until: None,
            status: DepositStatus::NotYetDue,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    #[default]
    NotYetDue,
    DueSoon,
    PastDue,
    Made,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DueDiligence {
    pub period: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub tasks: Vec<DiligenceTask>,
}

impl Default for DueDiligence {
    fn default() -> Self {
        Self {
            period: None,
            start_date: TBD.to_string(),
            end_date: TBD.to_string(),
            tasks: Vec::new(),
        }
    }
}

/// A dated due-diligence obligation, usually computed relative to a trigger
/// milestone ("30 days from Opening of Escrow").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DiligenceTask {
    pub name: String,
    pub timing: Option<String>,
    pub trigger_key: Option<TriggerKey>,
    pub days_from_trigger: Option<i64>,
    pub business_days: bool,
    pub computed_date: String,
    pub critical: bool,
    pub description: Option<String>,
}

impl Default for DiligenceTask {
    fn default() -> Self {
        Self {
            name: TBD.to_string(),
            timing: None,
            trigger_key: None,
            days_from_trigger: None,
            business_days: false,
            computed_date: TBD.to_string(),
            critical: false,
            description: None,
        }
    }
}

/// Named contractual milestones that other dates are computed relative to.
///
/// This is a closed set. Unrecognized trigger phrases from the model map to
/// `None` during merging, never to an invented key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TriggerKey {
    #[serde(rename = "Opening of Escrow")]
    OpeningOfEscrow,
    #[serde(rename = "Title Commitment")]
    TitleCommitment,
    #[serde(rename = "Loan Application")]
    LoanApplication,
    #[serde(rename = "Environmental Report")]
    EnvironmentalReport,
    #[serde(rename = "Survey Completion")]
    SurveyCompletion,
}

/// A contingency: structurally a due-diligence task plus a silence rule and
/// a responsible party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Contingency {
    pub name: String,
    pub timing: Option<String>,
    pub trigger_key: Option<TriggerKey>,
    pub days_from_trigger: Option<i64>,
    pub business_days: bool,
    pub computed_date: String,
    pub critical: bool,
    pub description: Option<String>,
    pub silence_rule: Option<SilenceRule>,
    pub responsible_party: Option<ResponsibleParty>,
}

impl Default for Contingency {
    fn default() -> Self {
        Self {
            name: TBD.to_string(),
            timing: None,
            trigger_key: None,
            days_from_trigger: None,
            business_days: false,
            computed_date: TBD.to_string(),
            critical: false,
            description: None,
            silence_rule: None,
            responsible_party: None,
        }
    }
}

/// What happens if a contingency deadline passes without notice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SilenceRule {
    Approval,
    Termination,
    #[serde(rename = "N/A")]
    NotApplicable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponsibleParty {
    Buyer,
    Seller,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClosingInfo {
    pub outside_date: String,
    pub closing_description: Option<String>,
    pub extension: ExtensionTerms,
    pub possession: Option<String>,
    pub prorations: Option<String>,
}

impl Default for ClosingInfo {
    fn default() -> Self {
        Self {
            outside_date: TBD.to_string(),
            closing_description: None,
            extension: ExtensionTerms::default(),
            possession: None,
            prorations: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionTerms {
    pub automatic: bool,
    pub buyer_option: Option<String>,
    pub seller_option: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecialConditions {
    pub items: Vec<String>,
    pub seller_obligations: Option<String>,
    pub buyer_obligations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Financing {
    pub financing_type: Option<String>,
    pub loan_amount: f64,
    pub lender: Option<String>,
    pub loan_contingency_date: String,
    pub terms: Option<String>,
}

impl Default for Financing {
    fn default() -> Self {
        Self {
            financing_type: None,
            loan_amount: 0.0,
            lender: None,
            loan_contingency_date: TBD.to_string(),
            terms: None,
        }
    }
}
